//! Tree patterns: parentheses trees whose `<name>` leaves are variables.
//!
//! Role
//! - [`TreePattern::compile`] parses a pattern such as `add(<x>,0)` with the regular
//!   parentheses grammar and turns every literal into a [`PatternNode`]: `<x>` becomes
//!   the variable `x`, anything else a literal value.
//! - A compiled pattern is matched against concrete trees through
//!   [`TreeMatcher`](crate::matcher::TreeMatcher) and instantiated back into a tree
//!   with [`TreePattern::expand`].
//!
//! Semantics
//! - A variable stands for a whole subtree, so variable nodes must be leaves.
//! - Variable names are non-empty and made of alphanumeric characters or `_`.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use std::str::FromStr;

use log::debug;
use strum::EnumIs;

use crate::error::{PatternError, TreeResult};
use crate::matcher::{TreeMatchResult, TreeMatcher, display_equals};
use crate::node::{NodeId, NodeRef, TreeNode};
use crate::parentheses;
use crate::tree::Tree;

/// Node of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIs)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PatternNode {
    /// Literal matched against node values.
    Val(String),
    /// Variable bound to a whole subtree.
    Var(String),
}

impl PatternNode {
    /// `<name>` is a variable, every other literal is a value.
    pub fn of(literal: &str) -> Self {
        match literal.strip_prefix('<').and_then(|rest| rest.strip_suffix('>')) {
            Some(name) => PatternNode::Var(name.to_string()),
            None => PatternNode::Val(literal.to_string()),
        }
    }

    /// Literal of a value, name of a variable.
    pub fn name(&self) -> &str {
        match self {
            PatternNode::Val(name) | PatternNode::Var(name) => name,
        }
    }
}

impl fmt::Display for PatternNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternNode::Val(value) => write!(f, "{value}"),
            PatternNode::Var(name) => write!(f, "<{name}>"),
        }
    }
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// A compiled tree pattern.
///
/// ```
/// use hytree::pattern::TreePattern;
/// use hytree::node::TreeNode;
///
/// let pattern = TreePattern::compile("add(<x>,0)").unwrap();
/// let tree = TreeNode::parse("add(z,0)").unwrap();
///
/// let result = pattern.match_tree(&tree.root()).unwrap();
/// assert_eq!(result.get("x").unwrap().to_string(), "z");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TreePattern {
    pattern: TreeNode<PatternNode>,
    variables: BTreeSet<String>,
}

impl TreePattern {
    /// Compiles a pattern written in the parentheses notation.
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        let tree = parentheses::parse_with(pattern, PatternNode::of)?;
        Self::new(tree)
    }

    /// Wraps an already built pattern tree, checking its variables.
    pub fn new(pattern: TreeNode<PatternNode>) -> Result<Self, PatternError> {
        let mut variables = BTreeSet::new();
        for node in pattern.root().breadth_first() {
            let PatternNode::Var(name) = node.value() else {
                continue;
            };
            if !node.is_leaf() {
                return Err(PatternError::VariableNotLeaf {
                    name: name.clone(),
                    subtree: node.to_parentheses_string(),
                });
            }
            if !is_valid_name(name) {
                return Err(PatternError::InvalidVariableName(name.clone()));
            }
            variables.insert(name.clone());
        }

        debug!("compiled tree pattern `{pattern}` with variables {variables:?}");
        Ok(TreePattern { pattern, variables })
    }

    /// The pattern tree.
    #[inline]
    pub fn tree(&self) -> &TreeNode<PatternNode> {
        &self.pattern
    }

    /// Root of the pattern tree.
    #[inline]
    pub fn root(&self) -> NodeRef<'_, PatternNode> {
        self.pattern.root()
    }

    /// Variable names used by the pattern, without angle brackets.
    #[inline]
    pub fn variables(&self) -> &BTreeSet<String> {
        &self.variables
    }

    /// Matcher of `tree` against this pattern, comparing node values through their
    /// `Display` output.
    pub fn matcher<T>(&self, tree: T) -> TreeMatcher<'_, T, fn(&T::Value, &str) -> bool>
    where
        T: Tree,
        T::Value: fmt::Display,
    {
        TreeMatcher::new(self, tree)
    }

    /// Matcher of `tree` against this pattern, comparing node values with `predicate`.
    pub fn matcher_with<T, P>(&self, tree: T, predicate: P) -> TreeMatcher<'_, T, P>
    where
        T: Tree,
        P: Fn(&T::Value, &str) -> bool,
    {
        TreeMatcher::with_predicate(self, tree, predicate)
    }

    /// Whether `tree` as a whole matches this pattern.
    pub fn matches<T>(&self, tree: &T) -> bool
    where
        T: Tree,
        T::Value: fmt::Display,
    {
        self.match_tree(tree).is_some()
    }

    /// Matches `tree` as a whole against this pattern and returns the bindings.
    pub fn match_tree<T>(&self, tree: &T) -> Option<TreeMatchResult<T>>
    where
        T: Tree,
        T::Value: fmt::Display,
    {
        TreeMatcher::with_predicate(self, tree.clone(), display_equals::<T::Value>).match_at(tree)
    }

    /// Instantiates the pattern: literals go through `mapper` and variables are
    /// replaced by copies of their bound subtree.
    ///
    /// A variable missing from `bindings` removes its node; at the root it is kept
    /// as `mapper(name)`.
    pub fn expand<T, F>(&self, bindings: &BTreeMap<String, T>, mut mapper: F) -> TreeNode<T::Value>
    where
        T: Tree,
        T::Value: Clone,
        F: FnMut(&str) -> T::Value,
    {
        let root = self.pattern.root();
        let mut out = match root.value() {
            PatternNode::Var(name) => {
                return match bindings.get(name) {
                    Some(bound) => TreeNode::of_tree(bound),
                    None => TreeNode::new(mapper(name)),
                };
            }
            PatternNode::Val(value) => TreeNode::new(mapper(value)),
        };

        let mut queue = VecDeque::from([(root, out.root_id())]);
        while let Some((template, parent)) = queue.pop_front() {
            for child in template.children() {
                let id = match child.value() {
                    PatternNode::Val(value) => {
                        let id = out.create(mapper(value));
                        queue.push_back((child, id));
                        id
                    }
                    PatternNode::Var(name) => match bindings.get(name) {
                        Some(bound) => out.graft(bound),
                        None => continue,
                    },
                };
                out.push_child(parent, id);
            }
        }
        out
    }

    /// Instantiates the pattern inside the arena of `tree`, variables being bound to
    /// nodes of that same arena. The result is a detached subtree whose root id is
    /// returned; bound subtrees are copied, never moved.
    pub fn expand_in<V, F>(
        &self,
        tree: &mut TreeNode<V>,
        bindings: &BTreeMap<String, NodeId>,
        mut mapper: F,
    ) -> TreeResult<NodeId>
    where
        V: Clone,
        F: FnMut(&str) -> V,
    {
        let root = self.pattern.root();
        let top = match root.value() {
            PatternNode::Var(name) => {
                return match bindings.get(name) {
                    Some(&bound) => tree.copy_within(bound),
                    None => Ok(tree.create(mapper(name))),
                };
            }
            PatternNode::Val(value) => tree.create(mapper(value)),
        };

        let mut queue = VecDeque::from([(root, top)]);
        while let Some((template, parent)) = queue.pop_front() {
            for child in template.children() {
                let id = match child.value() {
                    PatternNode::Val(value) => {
                        let id = tree.create(mapper(value));
                        queue.push_back((child, id));
                        id
                    }
                    PatternNode::Var(name) => match bindings.get(name) {
                        Some(&bound) => tree.copy_within(bound)?,
                        None => continue,
                    },
                };
                tree.push_child(parent, id);
            }
        }
        Ok(top)
    }
}

impl fmt::Display for TreePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pattern)
    }
}

impl FromStr for TreePattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TreePattern::compile(s)
    }
}
