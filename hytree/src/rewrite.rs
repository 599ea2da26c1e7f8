//! Pattern based tree rewriting.
//!
//! Role
//! - [`TreeRewriteRule`] pairs a left pattern with a right pattern, written
//!   `add(<x>,0) -> <x>`. Applying it replaces a node matching the left side by the
//!   right side, instantiated with the subtrees bound by the match.
//! - [`TreeRewriter`] is the seam shared by single rules and rule systems;
//!   [`RuleTreeRewriter`] applies a list of rules round-robin until none applies.
//!
//! Semantics
//! - Every step rewrites the first match in breadth-first order, so outer nodes are
//!   rewritten before inner ones. `add(<x>,0) -> <x>` turns `add(add(y,0),0)` into
//!   `y` in two steps.
//! - Every right side variable must appear on the left side; a rule is rejected
//!   otherwise.
//! - A rewriter stops after `limit` steps. Rule systems that do not terminate are
//!   the caller's responsibility: use a limit.
//!
//! Complexity
//! - One step is a breadth-first match O(n·m) plus the instantiation of the right side
//!   and the copy of the bound subtrees.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use log::debug;

use crate::error::{RuleError, TreeResult};
use crate::matcher::{TreeMatcher, display_equals};
use crate::node::{NodeId, TreeNode};
use crate::path::Path;
use crate::pattern::TreePattern;
use crate::tree::Tree;

/// Separator between the two sides of a textual rule.
pub const RULE_SEPARATOR: &str = "->";

/// Rewrites a tree in place.
pub trait TreeRewriter<V> {
    /// Applies at most `limit` rewrite steps and returns how many were applied.
    fn rewrite_limited(&self, tree: &mut TreeNode<V>, limit: usize) -> TreeResult<usize>;

    /// Rewrites until no more step applies. Returns whether the tree changed.
    fn rewrite(&self, tree: &mut TreeNode<V>) -> TreeResult<bool> {
        Ok(self.rewrite_limited(tree, usize::MAX)? > 0)
    }
}

/// Runs `apply(index, remaining)` over `len` rewriters in turn until a full round
/// applies nothing or `limit` steps are spent.
fn round_robin<F>(len: usize, limit: usize, mut apply: F) -> TreeResult<usize>
where
    F: FnMut(usize, usize) -> TreeResult<usize>,
{
    let mut count = 0;
    loop {
        let before = count;
        for index in 0..len {
            if count >= limit {
                return Ok(count);
            }
            count += apply(index, limit - count)?;
        }
        if count == before {
            return Ok(count);
        }
    }
}

impl<V, R: TreeRewriter<V>> TreeRewriter<V> for [R] {
    fn rewrite_limited(&self, tree: &mut TreeNode<V>, limit: usize) -> TreeResult<usize> {
        round_robin(self.len(), limit, |index, remaining| {
            self[index].rewrite_limited(tree, remaining)
        })
    }
}

impl<V, R: TreeRewriter<V>> TreeRewriter<V> for Vec<R> {
    fn rewrite_limited(&self, tree: &mut TreeNode<V>, limit: usize) -> TreeResult<usize> {
        self.as_slice().rewrite_limited(tree, limit)
    }
}

impl<V, R: TreeRewriter<V> + ?Sized> TreeRewriter<V> for Box<R> {
    fn rewrite_limited(&self, tree: &mut TreeNode<V>, limit: usize) -> TreeResult<usize> {
        (**self).rewrite_limited(tree, limit)
    }
}

/// A rewrite rule `left -> right`.
///
/// ```
/// use hytree::node::TreeNode;
/// use hytree::rewrite::{TreeRewriteRule, TreeRewriter};
///
/// let rule = TreeRewriteRule::parse("add(<x>,0) -> <x>").unwrap();
/// let mut tree = TreeNode::parse("add(add(y,0),0)").unwrap();
///
/// assert_eq!(rule.rewrite_limited(&mut tree, usize::MAX).unwrap(), 2);
/// assert_eq!(tree.to_string(), "y");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TreeRewriteRule {
    left: TreePattern,
    right: TreePattern,
}

impl TreeRewriteRule {
    /// Rule from its two sides, rejecting right side variables absent from the left.
    pub fn new(left: TreePattern, right: TreePattern) -> Result<Self, RuleError> {
        let undefined: Vec<String> = right
            .variables()
            .difference(left.variables())
            .cloned()
            .collect();
        if !undefined.is_empty() {
            return Err(RuleError::UndefinedVariables {
                rule: format!("{left} {RULE_SEPARATOR} {right}"),
                variables: undefined,
            });
        }
        Ok(TreeRewriteRule { left, right })
    }

    /// Parses `left -> right`. Whitespace around the sides is ignored.
    pub fn parse(rule: &str) -> Result<Self, RuleError> {
        let sides: Vec<&str> = rule.split(RULE_SEPARATOR).collect();
        match sides.as_slice() {
            [left, right] => Self::new(TreePattern::compile(left)?, TreePattern::compile(right)?),
            [_] => Err(RuleError::MissingSeparator(rule.to_string())),
            _ => Err(RuleError::TooManySeparators {
                count: sides.len() - 1,
                rule: rule.to_string(),
            }),
        }
    }

    #[inline]
    pub fn left(&self) -> &TreePattern {
        &self.left
    }

    #[inline]
    pub fn right(&self) -> &TreePattern {
        &self.right
    }

    /// Path of the first breadth-first match of the left side in `tree`, with the
    /// ids of the bound nodes.
    fn find<V, P>(&self, tree: &TreeNode<V>, predicate: P) -> Option<(Path, BTreeMap<String, NodeId>)>
    where
        P: Fn(&V, &str) -> bool,
    {
        let result = TreeMatcher::with_predicate(&self.left, tree.root(), predicate).first()?;
        let bindings = result
            .bindings()
            .iter()
            .map(|(name, node)| (name.clone(), node.id()))
            .collect();
        Some((result.node().path(), bindings))
    }

    /// Applies the rule at most `limit` times. Values are compared to the left side
    /// literals with `predicate`; right side literals become values through `mapper`.
    pub fn rewrite_with<V, P, F>(
        &self,
        tree: &mut TreeNode<V>,
        limit: usize,
        predicate: P,
        mapper: F,
    ) -> TreeResult<usize>
    where
        V: Clone,
        P: Fn(&V, &str) -> bool,
        F: Fn(&str) -> V,
    {
        let mut count = 0;
        while count < limit {
            let Some((path, bindings)) = self.find(tree, &predicate) else {
                break;
            };
            let replacement = self.right.expand_in(tree, &bindings, &mapper)?;
            if !tree.replace_at_path(&path, replacement)? {
                tree.delete(replacement)?;
                break;
            }
            count += 1;
            debug!("applied `{self}` at {path} (step {count})");
        }
        Ok(count)
    }
}

impl TreeRewriter<String> for TreeRewriteRule {
    fn rewrite_limited(&self, tree: &mut TreeNode<String>, limit: usize) -> TreeResult<usize> {
        self.rewrite_with(tree, limit, |value: &String, literal: &str| value == literal, str::to_owned)
    }
}

impl fmt::Display for TreeRewriteRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {RULE_SEPARATOR} {}", self.left, self.right)
    }
}

impl FromStr for TreeRewriteRule {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TreeRewriteRule::parse(s)
    }
}

/// An ordered list of rules applied round-robin, with the value predicate and the
/// literal conversion they share.
pub struct RuleTreeRewriter<V, P = fn(&V, &str) -> bool, F = fn(&str) -> V> {
    rules: Vec<TreeRewriteRule>,
    predicate: P,
    mapper: F,
    _value: PhantomData<fn(&str) -> V>,
}

impl<V, P, F> RuleTreeRewriter<V, P, F>
where
    P: Fn(&V, &str) -> bool,
    F: Fn(&str) -> V,
{
    pub fn new(rules: impl IntoIterator<Item = TreeRewriteRule>, predicate: P, mapper: F) -> Self {
        RuleTreeRewriter {
            rules: rules.into_iter().collect(),
            predicate,
            mapper,
            _value: PhantomData,
        }
    }

    #[inline]
    pub fn rules(&self) -> &[TreeRewriteRule] {
        &self.rules
    }
}

impl<V: fmt::Display> RuleTreeRewriter<V> {
    /// Parses every rule. Values are compared through their `Display` output and
    /// right side literals are converted with `mapper`.
    pub fn parse<S: AsRef<str>>(
        rules: impl IntoIterator<Item = S>,
        mapper: fn(&str) -> V,
    ) -> Result<Self, RuleError> {
        let rules = rules
            .into_iter()
            .map(|rule| TreeRewriteRule::parse(rule.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules, display_equals::<V>, mapper))
    }
}

impl RuleTreeRewriter<String> {
    /// Parses rules over trees of strings.
    pub fn parse_strings<S: AsRef<str>>(rules: impl IntoIterator<Item = S>) -> Result<Self, RuleError> {
        Self::parse(rules, str::to_owned)
    }
}

impl<V, P, F> TreeRewriter<V> for RuleTreeRewriter<V, P, F>
where
    V: Clone,
    P: Fn(&V, &str) -> bool,
    F: Fn(&str) -> V,
{
    fn rewrite_limited(&self, tree: &mut TreeNode<V>, limit: usize) -> TreeResult<usize> {
        round_robin(self.rules.len(), limit, |index, remaining| {
            self.rules[index].rewrite_with(tree, remaining, &self.predicate, &self.mapper)
        })
    }
}

impl<V, P, F> fmt::Display for RuleTreeRewriter<V, P, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, rule) in self.rules.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{rule}")?;
        }
        Ok(())
    }
}
