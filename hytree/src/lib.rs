//! Hytree: generic ordered trees, their textual notations, and pattern based rewriting.
//!
//! Every tree representation implements one read-only contract, [`tree::Tree`], from
//! which ancestry, sibling, leaf and traversal queries are derived. Two
//! representations are provided:
//!  - [`node::TreeNode`], a mutable tree stored in a slot arena and addressed by
//!    [`node::NodeId`]s;
//!  - [`flat::FlatTreeNode`], an immutable tree flattened into breadth-first arrays and
//!    shared between threads.
//!
//! On top of the contract:
//!  - the parentheses notation `mul(add(x,1),y)`, parsed and printed by
//!    [`parentheses`], with reserved characters escaped by [`escape`];
//!  - outline, Lisp and Graphviz renderings in [`format`];
//!  - patterns with `<var>` leaves ([`pattern`]), their matcher ([`matcher`]) and
//!    rewrite rules such as `add(<x>,0) -> <x>` ([`rewrite`]);
//!  - binary persistence with borsh ([`serial`], behind the `borsh` feature).
//!
//! Example
//! ```
//! use hytree::prelude::*;
//!
//! let mut tree = TreeNode::parse("add(mul(x,1),0)").unwrap();
//! let rules = RuleTreeRewriter::parse_strings(["add(<x>,0) -> <x>", "mul(<x>,1) -> <x>"]).unwrap();
//!
//! assert!(rules.rewrite(&mut tree).unwrap());
//! assert_eq!(tree.to_string(), "x");
//! ```

/// Error types of every module.
pub mod error;
/// Escaping of the characters reserved by the parentheses notation.
pub mod escape;
pub mod flat;
pub mod format;
/// Iterators over children and subtrees.
pub mod iter;
pub mod matcher;
pub mod node;
pub mod parentheses;
/// Child index paths from a root to a node.
pub mod path;
pub mod pattern;
pub mod rewrite;
#[cfg(feature = "borsh")]
pub mod serial;
pub mod tree;

pub mod prelude {
    pub use crate::error::{ParseError, PatternError, RuleError, TreeError};
    pub use crate::flat::FlatTreeNode;
    pub use crate::format::TreeFormatter;
    pub use crate::matcher::{ConsistentMatcher, TreeMatchResult, TreeMatcher};
    pub use crate::node::{NodeId, NodeRef, TreeNode};
    pub use crate::path::Path;
    pub use crate::pattern::{PatternNode, TreePattern};
    pub use crate::rewrite::{RuleTreeRewriter, TreeRewriteRule, TreeRewriter};
    pub use crate::tree::Tree;
}
