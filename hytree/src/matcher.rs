//! Matching compiled [`TreePattern`]s against trees.
//!
//! Role
//! - [`TreeMatcher`] tests a pattern at a given node ([`TreeMatcher::match_at`]) and
//!   lists every node of a tree where the pattern matches ([`TreeMatcher::results`]).
//! - A successful match is a [`TreeMatchResult`]: the matched node plus the subtree
//!   bound to each pattern variable.
//!
//! Semantics
//! - A literal matches a node when the node has as many children as the literal and
//!   the value predicate accepts the node value; children are matched pairwise.
//! - A variable matches any subtree. Repeated occurrences of one variable are
//!   independent: `mul(<x>,<x>)` matches `mul(a,b)` and `x` is bound to the first
//!   occurrence in pre-order, here `a`. [`ConsistentMatcher`] additionally requires
//!   every occurrence to bind structurally equal subtrees.
//! - [`TreeMatcher::results`] visits candidate nodes breadth-first and is lazy.
//!
//! Complexity
//! - One match attempt is O(m) in the size of the pattern; `results` is O(n·m).

use std::collections::BTreeMap;
use std::fmt;

use log::trace;

use crate::pattern::{PatternNode, TreePattern};
use crate::tree::Tree;

/// Default value predicate: the `Display` output of the value equals the literal.
pub fn display_equals<V: fmt::Display + ?Sized>(value: &V, literal: &str) -> bool {
    value.to_string() == literal
}

/// Node where a pattern matched and the subtrees bound to its variables.
#[derive(Debug, Clone)]
pub struct TreeMatchResult<T> {
    node: T,
    bindings: BTreeMap<String, T>,
}

impl<T> TreeMatchResult<T> {
    /// The matched node.
    #[inline]
    pub fn node(&self) -> &T {
        &self.node
    }

    /// Subtree bound to each variable, by variable name.
    #[inline]
    pub fn bindings(&self) -> &BTreeMap<String, T> {
        &self.bindings
    }

    /// Subtree bound to `variable`.
    #[inline]
    pub fn get(&self, variable: &str) -> Option<&T> {
        self.bindings.get(variable)
    }

    pub fn into_parts(self) -> (T, BTreeMap<String, T>) {
        (self.node, self.bindings)
    }
}

impl<T> fmt::Display for TreeMatchResult<T>
where
    T: Tree,
    T::Value: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.node.to_parentheses_string())?;
        for (index, (name, bound)) in self.bindings.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {}", bound.to_parentheses_string())?;
        }
        write!(f, "}}")
    }
}

/// Walks `pattern` and `node` side by side in pre-order. `same` decides whether a
/// repeated variable occurrence is compatible with the first binding.
fn bind<T, P, S>(pattern: &TreePattern, node: &T, predicate: &P, same: S) -> Option<TreeMatchResult<T>>
where
    T: Tree,
    P: Fn(&T::Value, &str) -> bool,
    S: Fn(&T, &T) -> bool,
{
    let mut bindings: BTreeMap<String, T> = BTreeMap::new();
    let mut stack = vec![(pattern.root(), node.clone())];

    while let Some((template, candidate)) = stack.pop() {
        match template.value() {
            PatternNode::Var(name) => match bindings.get(name) {
                Some(bound) => {
                    if !same(bound, &candidate) {
                        return None;
                    }
                }
                None => {
                    bindings.insert(name.clone(), candidate);
                }
            },
            PatternNode::Val(literal) => {
                if template.child_count() != candidate.child_count()
                    || !predicate(candidate.value(), literal)
                {
                    return None;
                }
                stack.extend(template.children().zip(candidate.children()).rev());
            }
        }
    }

    trace!("pattern `{pattern}` bound {} variable(s)", bindings.len());
    Some(TreeMatchResult {
        node: node.clone(),
        bindings,
    })
}

/// Matches one pattern against the nodes of one tree.
///
/// ```
/// use hytree::node::TreeNode;
/// use hytree::pattern::TreePattern;
///
/// let pattern = TreePattern::compile("add(<x>,0)").unwrap();
/// let tree = TreeNode::parse("mul(add(a,0),add(b,0))").unwrap();
///
/// let bound: Vec<String> = pattern
///     .matcher(tree.root())
///     .results()
///     .map(|result| result.get("x").unwrap().to_string())
///     .collect();
/// assert_eq!(bound, ["a", "b"]);
/// ```
pub struct TreeMatcher<'p, T, P> {
    pattern: &'p TreePattern,
    tree: T,
    predicate: P,
}

impl<'p, T> TreeMatcher<'p, T, fn(&T::Value, &str) -> bool>
where
    T: Tree,
    T::Value: fmt::Display,
{
    /// Matcher comparing node values through their `Display` output.
    pub fn new(pattern: &'p TreePattern, tree: T) -> Self {
        TreeMatcher {
            pattern,
            tree,
            predicate: display_equals::<T::Value>,
        }
    }
}

impl<'p, T, P> TreeMatcher<'p, T, P>
where
    T: Tree,
    P: Fn(&T::Value, &str) -> bool,
{
    /// Matcher comparing node values with `predicate`.
    pub fn with_predicate(pattern: &'p TreePattern, tree: T, predicate: P) -> Self {
        TreeMatcher {
            pattern,
            tree,
            predicate,
        }
    }

    #[inline]
    pub fn pattern(&self) -> &'p TreePattern {
        self.pattern
    }

    #[inline]
    pub fn tree(&self) -> &T {
        &self.tree
    }

    /// Whether the whole tree matches the pattern.
    pub fn matches(&self) -> bool {
        self.match_at(&self.tree).is_some()
    }

    /// Matches the pattern at `node`.
    pub fn match_at(&self, node: &T) -> Option<TreeMatchResult<T>> {
        bind(self.pattern, node, &self.predicate, |_, _| true)
    }

    /// Every node of the tree where the pattern matches, breadth-first.
    pub fn results(&self) -> impl Iterator<Item = TreeMatchResult<T>> + '_ {
        self.tree
            .breadth_first()
            .filter_map(move |node| self.match_at(&node))
    }

    /// First result in breadth-first order.
    pub fn first(&self) -> Option<TreeMatchResult<T>> {
        self.results().next()
    }

    /// Same matcher, but repeated variables must bind equal subtrees.
    pub fn consistent(self) -> ConsistentMatcher<'p, T, P> {
        ConsistentMatcher(self)
    }
}

/// A [`TreeMatcher`] whose repeated variables must bind structurally equal subtrees:
/// `mul(<x>,<x>)` matches `mul(a,a)` but not `mul(a,b)`.
pub struct ConsistentMatcher<'p, T, P>(TreeMatcher<'p, T, P>);

impl<'p, T, P> ConsistentMatcher<'p, T, P>
where
    T: Tree,
    T::Value: PartialEq,
    P: Fn(&T::Value, &str) -> bool,
{
    pub fn new(matcher: TreeMatcher<'p, T, P>) -> Self {
        ConsistentMatcher(matcher)
    }

    pub fn matches(&self) -> bool {
        self.match_at(&self.0.tree).is_some()
    }

    pub fn match_at(&self, node: &T) -> Option<TreeMatchResult<T>> {
        bind(self.0.pattern, node, &self.0.predicate, |a, b| a.equals(b))
    }

    pub fn results(&self) -> impl Iterator<Item = TreeMatchResult<T>> + '_ {
        self.0
            .tree
            .breadth_first()
            .filter_map(move |node| self.match_at(&node))
    }

    pub fn first(&self) -> Option<TreeMatchResult<T>> {
        self.results().next()
    }
}
