//! Read-only tree contract shared by every tree representation.
//!
//! Role
//! - [`Tree`] declares a handful of primitives (value, parent, indexed children,
//!   identity) and derives every other query from them as provided methods, so the
//!   arena-backed [`NodeRef`](crate::node::NodeRef) and the flattened
//!   [`FlatTreeNode`](crate::flat::FlatTreeNode) share a single implementation of
//!   ancestry, sibling, leaf and traversal logic.
//!
//! Semantics
//! - Implementors are cheap handles (a reference plus an index, or a shared pointer plus
//!   an index); cloning a handle never copies the tree.
//! - `identical` is identity (same storage slot). Structural equality is [`Tree::equals`],
//!   which compares values and shapes recursively and works across representations.
//! - Ancestry and sibling queries rely on identity, never on structural equality.
//!
//! Complexity
//! - `level`, `is_ancestor` and `shared_ancestor` walk the parent chain: O(height)
//!   parent lookups. `depth`, `size` and `leaf_count` traverse the subtree: O(size).
//! - Every traversal is iterative; deep trees do not grow the call stack.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{TreeError, TreeResult};
use crate::iter::{BreadthFirst, Children, PathFromAncestor, Postorder, Preorder};
use crate::parentheses;
use crate::path::Path;

/// A rooted, ordered tree seen from one of its nodes.
pub trait Tree: Sized + Clone {
    /// Payload stored in every node.
    type Value;

    /// Value of this node.
    fn value(&self) -> &Self::Value;

    /// Parent of this node, `None` for a root.
    fn parent(&self) -> Option<Self>;

    /// Child at `index`, failing with [`TreeError::ChildIndexOutOfBounds`] when
    /// `index >= child_count()`.
    fn child(&self, index: usize) -> TreeResult<Self>;

    /// Number of children of this node.
    fn child_count(&self) -> usize;

    /// Whether `self` and `other` are the same storage slot.
    fn identical(&self, other: &Self) -> bool;

    // ======================== Shape ========================

    #[inline]
    fn is_root(&self) -> bool {
        self.parent().is_none()
    }

    #[inline]
    fn is_leaf(&self) -> bool {
        self.child_count() == 0
    }

    /// Root of the tree this node belongs to.
    fn root(&self) -> Self {
        let mut node = self.clone();
        while let Some(parent) = node.parent() {
            node = parent;
        }
        node
    }

    /// Number of edges between this node and its root.
    fn level(&self) -> usize {
        let mut level = 0;
        let mut node = self.parent();
        while let Some(parent) = node {
            level += 1;
            node = parent.parent();
        }
        level
    }

    /// Length of the longest path from this node down to a leaf. A leaf has depth 0.
    fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self.clone(), 0usize)];
        while let Some((node, depth)) = stack.pop() {
            max = max.max(depth);
            stack.extend(node.children().map(|child| (child, depth + 1)));
        }
        max
    }

    /// Number of nodes of the subtree rooted at this node, including itself.
    fn size(&self) -> usize {
        self.breadth_first().count()
    }

    /// Number of leaves of the subtree rooted at this node.
    fn leaf_count(&self) -> usize {
        self.breadth_first().filter(|node| node.is_leaf()).count()
    }

    // ======================== Children ========================

    /// Children of this node, left to right.
    fn children(&self) -> Children<Self> {
        Children::new(self.clone())
    }

    fn first_child(&self) -> Option<Self> {
        self.child(0).ok()
    }

    fn last_child(&self) -> Option<Self> {
        self.child_count()
            .checked_sub(1)
            .and_then(|index| self.child(index).ok())
    }

    /// Index of `child` among the children of this node, by identity.
    fn index_of(&self, child: &Self) -> Option<usize> {
        self.children().position(|node| node.identical(child))
    }

    /// Whether `node` is a direct child of this node.
    fn is_child(&self, node: &Self) -> bool {
        node.parent().is_some_and(|parent| parent.identical(self))
    }

    /// Child following `child`, or `None` when `child` is the last one.
    fn child_after(&self, child: &Self) -> TreeResult<Option<Self>> {
        let index = self.index_of(child).ok_or(TreeError::NotAChild)?;
        Ok(self.child(index + 1).ok())
    }

    /// Child preceding `child`, or `None` when `child` is the first one.
    fn child_before(&self, child: &Self) -> TreeResult<Option<Self>> {
        let index = self.index_of(child).ok_or(TreeError::NotAChild)?;
        Ok(index.checked_sub(1).and_then(|index| self.child(index).ok()))
    }

    /// Descends along `path`, returning `None` if an index is out of bounds.
    fn child_at_path(&self, path: &Path) -> Option<Self> {
        let mut node = self.clone();
        for index in path.iter() {
            node = node.child(index).ok()?;
        }
        Some(node)
    }

    // ======================== Siblings ========================

    fn next_sibling(&self) -> Option<Self> {
        self.parent()?.child_after(self).ok().flatten()
    }

    fn previous_sibling(&self) -> Option<Self> {
        self.parent()?.child_before(self).ok().flatten()
    }

    /// Number of children of this node's parent, 1 for a root.
    fn sibling_count(&self) -> usize {
        self.parent().map_or(1, |parent| parent.child_count())
    }

    /// Whether `node` shares the parent of this node. A node is its own sibling.
    fn is_sibling(&self, node: &Self) -> bool {
        if self.identical(node) {
            return true;
        }
        match (self.parent(), node.parent()) {
            (Some(a), Some(b)) => a.identical(&b),
            _ => false,
        }
    }

    // ======================== Leaves ========================

    /// Leftmost leaf of the subtree rooted at this node.
    fn first_leaf(&self) -> Self {
        let mut node = self.clone();
        while let Some(child) = node.first_child() {
            node = child;
        }
        node
    }

    /// Rightmost leaf of the subtree rooted at this node.
    fn last_leaf(&self) -> Self {
        let mut node = self.clone();
        while let Some(child) = node.last_child() {
            node = child;
        }
        node
    }

    /// Leaf following this node in the whole tree, left to right.
    fn next_leaf(&self) -> Option<Self> {
        let mut node = self.clone();
        loop {
            if let Some(sibling) = node.next_sibling() {
                return Some(sibling.first_leaf());
            }
            node = node.parent()?;
        }
    }

    /// Leaf preceding this node in the whole tree, left to right.
    fn previous_leaf(&self) -> Option<Self> {
        let mut node = self.clone();
        loop {
            if let Some(sibling) = node.previous_sibling() {
                return Some(sibling.last_leaf());
            }
            node = node.parent()?;
        }
    }

    /// Successor of this node in pre-order over the whole tree.
    fn next_node(&self) -> Option<Self> {
        if let Some(child) = self.first_child() {
            return Some(child);
        }
        let mut node = self.clone();
        loop {
            if let Some(sibling) = node.next_sibling() {
                return Some(sibling);
            }
            node = node.parent()?;
        }
    }

    /// Predecessor of this node in pre-order over the whole tree.
    fn previous_node(&self) -> Option<Self> {
        let parent = self.parent()?;
        match self.previous_sibling() {
            Some(sibling) => Some(sibling.last_leaf()),
            None => Some(parent),
        }
    }

    // ======================== Ancestry ========================

    /// Whether `node` is an ancestor of this node. A node is its own ancestor.
    fn is_ancestor(&self, node: &Self) -> bool {
        let mut current = Some(self.clone());
        while let Some(ancestor) = current {
            if ancestor.identical(node) {
                return true;
            }
            current = ancestor.parent();
        }
        false
    }

    /// Whether `node` is a descendant of this node. A node is its own descendant.
    fn is_descendant(&self, node: &Self) -> bool {
        node.is_ancestor(self)
    }

    /// Nearest node that is an ancestor of both `self` and `node`, `None` if the two
    /// nodes belong to different trees.
    fn shared_ancestor(&self, node: &Self) -> Option<Self> {
        if self.identical(node) {
            return Some(self.clone());
        }

        let (level1, level2) = (self.level(), node.level());
        let (mut deep, mut shallow, diff) = if level2 > level1 {
            (node.clone(), self.clone(), level2 - level1)
        } else {
            (self.clone(), node.clone(), level1 - level2)
        };

        for _ in 0..diff {
            deep = deep.parent()?;
        }

        loop {
            if deep.identical(&shallow) {
                return Some(deep);
            }
            deep = deep.parent()?;
            shallow = shallow.parent()?;
        }
    }

    /// Whether `node` belongs to the same tree as this node.
    fn is_related(&self, node: &Self) -> bool {
        self.root().identical(&node.root())
    }

    /// Nodes from the root down to this node, both included.
    fn path_elements(&self) -> Vec<Self> {
        let mut elements = vec![self.clone()];
        let mut node = self.parent();
        while let Some(parent) = node {
            node = parent.parent();
            elements.push(parent);
        }
        elements.reverse();
        elements
    }

    /// Child-index path from the root down to this node.
    fn path(&self) -> Path {
        let mut indices = Vec::with_capacity(8);
        let mut node = self.clone();
        while let Some(parent) = node.parent() {
            // `node` is a child of `parent`, `index_of` always finds it.
            indices.push(parent.index_of(&node).unwrap_or_default());
            node = parent;
        }
        indices.reverse();
        Path::of(indices)
    }

    // ======================== Traversals ========================

    /// Breadth-first traversal of the subtree rooted at this node.
    fn breadth_first(&self) -> BreadthFirst<Self> {
        BreadthFirst::new(self.clone())
    }

    /// Pre-order traversal of the subtree rooted at this node.
    fn preorder(&self) -> Preorder<Self> {
        Preorder::new(self.clone())
    }

    /// Post-order traversal of the subtree rooted at this node.
    fn postorder(&self) -> Postorder<Self> {
        Postorder::new(self.clone())
    }

    /// Depth-first traversal, which is the post-order traversal.
    fn depth_first(&self) -> Postorder<Self> {
        self.postorder()
    }

    /// Nodes from `ancestor` down to this node, failing with
    /// [`TreeError::NotAnAncestor`] when `ancestor` is not on the parent chain.
    fn path_from_ancestor(&self, ancestor: &Self) -> TreeResult<PathFromAncestor<Self>> {
        PathFromAncestor::new(ancestor, self.clone())
    }

    /// Default traversal of the subtree rooted at this node (breadth-first).
    fn iter(&self) -> BreadthFirst<Self> {
        self.breadth_first()
    }

    // ======================== Comparison ========================

    /// Structural equality: same values and same shapes, recursively. The two trees
    /// may use different representations.
    fn equals<U>(&self, other: &U) -> bool
    where
        U: Tree<Value = Self::Value>,
        Self::Value: PartialEq,
    {
        let mut stack = vec![(self.clone(), other.clone())];
        while let Some((a, b)) = stack.pop() {
            if a.child_count() != b.child_count() || a.value() != b.value() {
                return false;
            }
            stack.extend(a.children().zip(b.children()));
        }
        true
    }

    /// Feeds the values and child counts of the subtree, in breadth-first order, to
    /// `state`. Trees that are [`equals`](Tree::equals) produce the same stream.
    fn hash_structure<H: Hasher>(&self, state: &mut H)
    where
        Self::Value: Hash,
    {
        for node in self.breadth_first() {
            node.value().hash(state);
            node.child_count().hash(state);
        }
    }

    /// Hash of the subtree consistent with [`equals`](Tree::equals).
    fn tree_hash(&self) -> u64
    where
        Self::Value: Hash,
    {
        let mut hasher = DefaultHasher::new();
        self.hash_structure(&mut hasher);
        hasher.finish()
    }

    // ======================== Text ========================

    /// Parentheses notation of the subtree, e.g. `mul(add(x,1),y)`.
    fn to_parentheses_string(&self) -> String
    where
        Self::Value: fmt::Display,
    {
        parentheses::to_parentheses_string(self)
    }

    /// Parentheses notation of the subtree with values rendered by `format`.
    fn to_parentheses_string_with<F>(&self, format: F) -> String
    where
        F: FnMut(&Self::Value) -> String,
    {
        parentheses::to_parentheses_string_with(self, format)
    }
}
