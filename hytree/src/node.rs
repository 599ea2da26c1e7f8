//! Mutable, parent-linked trees stored in a slot arena.
//!
//! Role
//! - [`TreeNode`] owns every node of a tree in a [`SlotMap`] keyed by [`NodeId`]. Each
//!   slot stores its value, the id of its parent and the ordered ids of its children,
//!   so parent links are plain indices and never own anything.
//! - Mutations (`insert`, `remove`, `attach`, `detach`, `replace`, ...) take node ids
//!   and keep the arena acyclic: inserting a node below one of its own descendants is
//!   rejected with [`TreeError::CyclicInsertion`] before anything is modified.
//! - Read access goes through [`NodeRef`], a copyable borrowed view implementing
//!   [`Tree`]. All traversal and query logic comes from the trait.
//!
//! Semantics
//! - The arena may hold detached subtrees next to the main tree (freshly created nodes,
//!   removed children). The main tree is the one containing the node the arena was
//!   created with; [`TreeNode::root_id`] climbs from that node to its current root.
//! - Detached subtrees stay alive until they are re-attached, [`deleted`](TreeNode::delete)
//!   or dropped by [`compact`](TreeNode::compact).
//! - Equality, hashing and formatting of a `TreeNode` only consider the main tree.
//!
//! Example
//! ```
//! use hytree::node::TreeNode;
//! use hytree::tree::Tree;
//!
//! let mut tree = TreeNode::new("add");
//! let root = tree.root_id();
//! let x = tree.attach_value(root, "x").unwrap();
//! tree.attach_value(root, "0").unwrap();
//!
//! assert_eq!(tree.to_string(), "add(x,0)");
//! assert_eq!(tree.node(x).unwrap().level(), 1);
//! ```

use std::collections::VecDeque;
use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use crate::error::{ParseError, ParseResult, TreeError, TreeResult};
use crate::parentheses;
use crate::path::Path;
use crate::tree::Tree;

new_key_type! {
    /// Stable handle of a node inside a [`TreeNode`] arena.
    pub struct NodeId;
}

#[derive(Debug, Clone)]
struct NodeSlot<V> {
    value: V,
    parent: Option<NodeId>,
    children: SmallVec<[NodeId; 4]>,
}

impl<V> NodeSlot<V> {
    #[inline]
    fn new(value: V, parent: Option<NodeId>) -> Self {
        NodeSlot {
            value,
            parent,
            children: SmallVec::new(),
        }
    }
}

/// An editable tree whose nodes live in a slot arena.
#[derive(Clone)]
pub struct TreeNode<V> {
    nodes: SlotMap<NodeId, NodeSlot<V>>,
    anchor: NodeId,
}

impl<V> TreeNode<V> {
    /// Creates a tree made of a single root node.
    pub fn new(value: V) -> Self {
        let mut nodes = SlotMap::with_key();
        let anchor = nodes.insert(NodeSlot::new(value, None));
        TreeNode { nodes, anchor }
    }

    /// Builder: attaches `child` below the root and returns the tree.
    pub fn with_child(mut self, child: TreeNode<V>) -> Self {
        let root = self.root_id();
        self.adopt_into(root, child);
        self
    }

    /// Builder: attaches a new leaf holding `value` below the root.
    pub fn with_value(self, value: V) -> Self {
        self.with_child(TreeNode::new(value))
    }

    // ======================== Access ========================

    /// Id of the root of the main tree.
    pub fn root_id(&self) -> NodeId {
        let mut id = self.anchor;
        while let Some(parent) = self.nodes.get(id).and_then(|slot| slot.parent) {
            id = parent;
        }
        id
    }

    /// Read-only view of the root of the main tree.
    pub fn root(&self) -> NodeRef<'_, V> {
        NodeRef {
            tree: self,
            id: self.root_id(),
        }
    }

    /// Read-only view of the node `id`.
    pub fn node(&self, id: NodeId) -> TreeResult<NodeRef<'_, V>> {
        self.slot(id)?;
        Ok(NodeRef { tree: self, id })
    }

    /// Whether `id` is a live node of the arena.
    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    #[inline]
    pub fn value(&self, id: NodeId) -> Option<&V> {
        self.nodes.get(id).map(|slot| &slot.value)
    }

    #[inline]
    pub fn value_mut(&mut self, id: NodeId) -> Option<&mut V> {
        self.nodes.get_mut(id).map(|slot| &mut slot.value)
    }

    /// Replaces the value of `id`, returning the previous one.
    pub fn set_value(&mut self, id: NodeId, value: V) -> TreeResult<V> {
        let slot = self.slot_mut(id)?;
        Ok(std::mem::replace(&mut slot.value, value))
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|slot| slot.parent)
    }

    /// Children of `id`, empty for unknown ids.
    #[inline]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map_or(&[][..], |slot| slot.children.as_slice())
    }

    /// Number of nodes of the main tree.
    pub fn size(&self) -> usize {
        self.root().size()
    }

    /// Number of live slots in the arena, detached subtrees included.
    #[inline]
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    /// Number of live slots that do not belong to the main tree.
    pub fn garbage_size(&self) -> usize {
        self.nodes.len() - self.size()
    }

    /// Whether `ancestor` lies on the parent chain of `node`, `node` included.
    pub fn is_ancestor_of(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Follows `path` from `from`, `None` if an index is out of bounds.
    pub fn id_at_path(&self, from: NodeId, path: &Path) -> Option<NodeId> {
        let mut id = from;
        for index in path.iter() {
            id = *self.nodes.get(id)?.children.get(index)?;
        }
        self.contains(id).then_some(id)
    }

    // ======================== Structure edits ========================

    /// Allocates a detached node holding `value`.
    pub fn create(&mut self, value: V) -> NodeId {
        self.nodes.insert(NodeSlot::new(value, None))
    }

    /// Inserts `child` at `index` among the children of `parent`, detaching it from
    /// its previous parent first.
    ///
    /// Fails without modifying the tree when `child` is `parent` or one of its
    /// ancestors, or when `index` is greater than the number of children `parent`
    /// has once `child` is detached.
    pub fn insert(&mut self, parent: NodeId, index: usize, child: NodeId) -> TreeResult<()> {
        let count = self.slot(parent)?.children.len();
        let already_child = self.slot(child)?.parent == Some(parent);
        if self.is_ancestor_of(child, parent) {
            return Err(TreeError::CyclicInsertion);
        }

        let count = if already_child { count - 1 } else { count };
        if index > count {
            return Err(TreeError::ChildIndexOutOfBounds { index, count });
        }

        self.unlink(child);
        self.nodes[parent].children.insert(index, child);
        self.nodes[child].parent = Some(parent);
        Ok(())
    }

    /// Appends `child` to the children of `parent`.
    ///
    /// If `child` already is a child of `parent` it is moved to the last position.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        let count = self.slot(parent)?.children.len();
        let index = if self.slot(child)?.parent == Some(parent) {
            count - 1
        } else {
            count
        };
        self.insert(parent, index, child)
    }

    /// Appends a new leaf holding `value` to the children of `parent`.
    pub fn attach_value(&mut self, parent: NodeId, value: V) -> TreeResult<NodeId> {
        self.slot(parent)?;
        let id = self.nodes.insert(NodeSlot::new(value, Some(parent)));
        self.nodes[parent].children.push(id);
        Ok(id)
    }

    /// Appends one new leaf per value to the children of `parent`.
    pub fn attach_values(
        &mut self,
        parent: NodeId,
        values: impl IntoIterator<Item = V>,
    ) -> TreeResult<()> {
        self.slot(parent)?;
        for value in values {
            let id = self.nodes.insert(NodeSlot::new(value, Some(parent)));
            self.nodes[parent].children.push(id);
        }
        Ok(())
    }

    /// Moves every node of `other` into this arena and appends its root to the
    /// children of `parent`. Returns the id of the moved root.
    pub fn adopt(&mut self, parent: NodeId, other: TreeNode<V>) -> TreeResult<NodeId> {
        self.slot(parent)?;
        Ok(self.adopt_into(parent, other))
    }

    /// Removes the child at `index` from `parent`. The removed subtree stays in the
    /// arena, detached, and its id is returned.
    pub fn remove(&mut self, parent: NodeId, index: usize) -> TreeResult<NodeId> {
        let count = self.slot(parent)?.children.len();
        if index >= count {
            return Err(TreeError::ChildIndexOutOfBounds { index, count });
        }
        let child = self.nodes[parent].children.remove(index);
        self.nodes[child].parent = None;
        Ok(child)
    }

    /// Removes `child` from the children of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> TreeResult<()> {
        let index = self
            .slot(parent)?
            .children
            .iter()
            .position(|id| *id == child)
            .ok_or(TreeError::NotAChild)?;
        self.remove(parent, index).map(|_| ())
    }

    /// Detaches every child of `parent`, returning their ids in order.
    pub fn remove_all_children(&mut self, parent: NodeId) -> TreeResult<Vec<NodeId>> {
        let children = std::mem::take(&mut self.slot_mut(parent)?.children);
        for child in &children {
            self.nodes[*child].parent = None;
        }
        Ok(children.into_vec())
    }

    /// Detaches `node` from its parent. Does nothing for a root.
    pub fn detach(&mut self, node: NodeId) -> TreeResult<()> {
        self.slot(node)?;
        self.unlink(node);
        Ok(())
    }

    /// Replaces the child at `index` of `parent` by `child`. The previous child is
    /// detached and its id returned.
    pub fn replace(&mut self, parent: NodeId, index: usize, child: NodeId) -> TreeResult<NodeId> {
        let count = self.slot(parent)?.children.len();
        self.slot(child)?;
        let old = *self.nodes[parent]
            .children
            .get(index)
            .ok_or(TreeError::ChildIndexOutOfBounds { index, count })?;
        if old == child {
            return Ok(old);
        }
        if self.is_ancestor_of(child, parent) {
            return Err(TreeError::CyclicInsertion);
        }

        // Detaching `child` may shift `old` when both are siblings.
        self.unlink(child);
        let slot = &mut self.nodes[parent];
        if let Some(position) = slot.children.iter().position(|id| *id == old) {
            slot.children[position] = child;
        }
        self.nodes[child].parent = Some(parent);
        self.nodes[old].parent = None;
        Ok(old)
    }

    /// Replaces the node at `path` (from the root) by the subtree `subtree` and frees
    /// the replaced nodes. Returns `false` when `path` does not address a node.
    ///
    /// For the empty path the root keeps its id: it takes over the value and the
    /// children of `subtree`, whose own slot is freed.
    pub fn replace_at_path(&mut self, path: &Path, subtree: NodeId) -> TreeResult<bool> {
        self.slot(subtree)?;
        let root = self.root_id();
        self.anchor = root;

        let Some(target) = self.id_at_path(root, path) else {
            return Ok(false);
        };
        if target == subtree {
            return Ok(true);
        }

        match self.nodes[target].parent {
            Some(parent) => {
                let index = self.nodes[parent]
                    .children
                    .iter()
                    .position(|id| *id == target)
                    .ok_or(TreeError::NotAChild)?;
                self.replace(parent, index, subtree)?;
                self.free(target);
            }
            None => {
                self.unlink(subtree);
                let old = std::mem::take(&mut self.nodes[target].children);
                for child in old {
                    self.nodes[child].parent = None;
                    self.free(child);
                }

                let slot = self
                    .nodes
                    .remove(subtree)
                    .ok_or(TreeError::UnknownNode(subtree))?;
                for child in &slot.children {
                    self.nodes[*child].parent = Some(target);
                }
                let node = &mut self.nodes[target];
                node.value = slot.value;
                node.children = slot.children;
            }
        }
        Ok(true)
    }

    /// Removes the node at `path` (from the root) and frees its subtree. Returns
    /// `false` when `path` does not address a node or addresses the root.
    pub fn remove_at_path(&mut self, path: &Path) -> TreeResult<bool> {
        let root = self.root_id();
        self.anchor = root;

        let Some(target) = self.id_at_path(root, path) else {
            return Ok(false);
        };
        if self.nodes[target].parent.is_none() {
            return Ok(false);
        }
        self.unlink(target);
        self.free(target);
        Ok(true)
    }

    /// Detaches `node` and frees its whole subtree. Ids of the freed nodes become
    /// invalid.
    pub fn delete(&mut self, node: NodeId) -> TreeResult<()> {
        self.slot(node)?;
        if self.is_ancestor_of(node, self.anchor) {
            return Err(TreeError::RootRemoval);
        }
        self.unlink(node);
        self.free(node);
        Ok(())
    }

    /// Drops every slot that does not belong to the main tree and renumbers the
    /// remaining ones. Every previously obtained id becomes invalid; the new root id
    /// is returned.
    pub fn compact(&mut self) -> NodeId {
        let root = self.root_id();
        let mut old = std::mem::take(&mut self.nodes);
        let mut nodes = SlotMap::with_capacity_and_key(old.len());

        let mut queue = VecDeque::new();
        if let Some(slot) = old.remove(root) {
            let id = nodes.insert(NodeSlot::new(slot.value, None));
            self.anchor = id;
            queue.push_back((slot.children, id));
        }
        while let Some((children, parent)) = queue.pop_front() {
            for child in children {
                if let Some(slot) = old.remove(child) {
                    let id = nodes.insert(NodeSlot::new(slot.value, Some(parent)));
                    nodes[parent].children.push(id);
                    queue.push_back((slot.children, id));
                }
            }
        }

        self.nodes = nodes;
        self.anchor
    }

    // ======================== Copies ========================

    /// Copies the tree `tree` of any representation into a new `TreeNode`, mapping
    /// every value through `mapper`.
    pub fn of_tree_with<T, F>(tree: &T, mut mapper: F) -> Self
    where
        T: Tree,
        F: FnMut(&T::Value) -> V,
    {
        match Self::try_of_tree_with(tree, |value| Ok::<V, Infallible>(mapper(value))) {
            Ok(tree) => tree,
            Err(never) => match never {},
        }
    }

    /// Fallible version of [`of_tree_with`](TreeNode::of_tree_with); stops at the first
    /// error of `mapper`.
    pub fn try_of_tree_with<T, F, E>(tree: &T, mut mapper: F) -> Result<Self, E>
    where
        T: Tree,
        F: FnMut(&T::Value) -> Result<V, E>,
    {
        let mut out = TreeNode::new(mapper(tree.value())?);
        let mut queue = VecDeque::from([(tree.clone(), out.anchor)]);
        while let Some((source, target)) = queue.pop_front() {
            for child in source.children() {
                let id = out
                    .nodes
                    .insert(NodeSlot::new(mapper(child.value())?, Some(target)));
                out.nodes[target].children.push(id);
                queue.push_back((child, id));
            }
        }
        Ok(out)
    }

    /// Copies the main tree, mapping every value through `mapper`.
    pub fn map<B, F>(&self, mapper: F) -> TreeNode<B>
    where
        F: FnMut(&V) -> B,
    {
        TreeNode::of_tree_with(&self.root(), mapper)
    }

    /// Fallible version of [`map`](TreeNode::map).
    pub fn try_map<B, E, F>(&self, mapper: F) -> Result<TreeNode<B>, E>
    where
        F: FnMut(&V) -> Result<B, E>,
    {
        TreeNode::try_of_tree_with(&self.root(), mapper)
    }

    /// Copies `tree` into this arena as a detached subtree, mapping every value
    /// through `mapper`. Returns the id of the copied root.
    pub fn graft_with<T, F>(&mut self, tree: &T, mut mapper: F) -> NodeId
    where
        T: Tree,
        F: FnMut(&T::Value) -> V,
    {
        let root = self.create(mapper(tree.value()));
        let mut queue = VecDeque::from([(tree.clone(), root)]);
        while let Some((source, target)) = queue.pop_front() {
            for child in source.children() {
                let id = self
                    .nodes
                    .insert(NodeSlot::new(mapper(child.value()), Some(target)));
                self.nodes[target].children.push(id);
                queue.push_back((child, id));
            }
        }
        root
    }

    // ======================== Internals ========================

    #[inline]
    fn slot(&self, id: NodeId) -> TreeResult<&NodeSlot<V>> {
        self.nodes.get(id).ok_or(TreeError::UnknownNode(id))
    }

    #[inline]
    fn slot_mut(&mut self, id: NodeId) -> TreeResult<&mut NodeSlot<V>> {
        self.nodes.get_mut(id).ok_or(TreeError::UnknownNode(id))
    }

    /// Removes `child` from the children of its parent, if any.
    fn unlink(&mut self, child: NodeId) {
        if let Some(parent) = self.nodes.get_mut(child).and_then(|slot| slot.parent.take()) {
            if let Some(slot) = self.nodes.get_mut(parent) {
                slot.children.retain(|id| *id != child);
            }
        }
    }

    /// Frees the slots of the subtree rooted at `node`, which must be detached.
    fn free(&mut self, node: NodeId) {
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(slot) = self.nodes.remove(id) {
                stack.extend(slot.children);
            }
        }
    }

    /// Appends `child` to `parent` without any check. Both must be live and `child`
    /// must be detached.
    pub(crate) fn push_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    fn adopt_into(&mut self, parent: NodeId, mut other: TreeNode<V>) -> NodeId {
        let other_root = other.root_id();
        let mut queue = VecDeque::new();
        let mut moved = None;
        if let Some(slot) = other.nodes.remove(other_root) {
            let id = self.nodes.insert(NodeSlot::new(slot.value, Some(parent)));
            self.nodes[parent].children.push(id);
            moved = Some(id);
            queue.push_back((slot.children, id));
        }
        while let Some((children, target)) = queue.pop_front() {
            for child in children {
                if let Some(slot) = other.nodes.remove(child) {
                    let id = self.nodes.insert(NodeSlot::new(slot.value, Some(target)));
                    self.nodes[target].children.push(id);
                    queue.push_back((slot.children, id));
                }
            }
        }
        moved.unwrap_or(parent)
    }

    /// Rebuilds a tree from breadth-first flattened arrays. The layout must have been
    /// validated beforehand.
    pub(crate) fn from_flat_parts(values: Vec<V>, offsets: &[u32], counts: &[u32]) -> TreeResult<Self> {
        let mut nodes = SlotMap::with_capacity_and_key(values.len());
        let ids: Vec<NodeId> = values
            .into_iter()
            .map(|value| nodes.insert(NodeSlot::new(value, None)))
            .collect();
        let anchor = *ids
            .first()
            .ok_or_else(|| TreeError::InvalidFlatLayout("a tree has at least one node".into()))?;

        for (index, (&offset, &count)) in offsets.iter().zip(counts).enumerate() {
            let start = offset as usize;
            let range = ids
                .get(start..start + count as usize)
                .filter(|_| count > 0)
                .unwrap_or_default();
            for &child in range {
                nodes[child].parent = Some(ids[index]);
                nodes[ids[index]].children.push(child);
            }
        }
        Ok(TreeNode { nodes, anchor })
    }
}

impl<V: Clone> TreeNode<V> {
    /// Copies the tree `tree` of any representation into a new `TreeNode`.
    pub fn of_tree<T: Tree<Value = V>>(tree: &T) -> Self {
        Self::of_tree_with(tree, V::clone)
    }

    /// Deep copy of the main tree, without any detached slot.
    pub fn copy(&self) -> Self {
        Self::of_tree(&self.root())
    }

    /// Deep copy of the subtree rooted at `id` as a standalone tree.
    pub fn copy_subtree(&self, id: NodeId) -> TreeResult<Self> {
        Ok(Self::of_tree(&self.node(id)?))
    }

    /// Copies the subtree rooted at `id` inside this arena. The copy is detached and
    /// its root id is returned.
    pub fn copy_within(&mut self, id: NodeId) -> TreeResult<NodeId> {
        let value = self.slot(id)?.value.clone();
        let root = self.create(value);
        let mut queue = VecDeque::from([(id, root)]);
        while let Some((source, target)) = queue.pop_front() {
            let children = self.nodes[source].children.clone();
            for child in children {
                let value = self.nodes[child].value.clone();
                let copy = self.nodes.insert(NodeSlot::new(value, Some(target)));
                self.nodes[target].children.push(copy);
                queue.push_back((child, copy));
            }
        }
        Ok(root)
    }

    /// Copies `tree` into this arena as a detached subtree.
    pub fn graft<T: Tree<Value = V>>(&mut self, tree: &T) -> NodeId {
        self.graft_with(tree, V::clone)
    }
}

impl TreeNode<String> {
    /// Parses the parentheses notation, e.g. `mul(add(x,1),y)`.
    pub fn parse(src: &str) -> ParseResult<Self> {
        parentheses::parse(src)
    }
}

impl FromStr for TreeNode<String> {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parentheses::parse(s)
    }
}

impl<V: PartialEq> PartialEq for TreeNode<V> {
    fn eq(&self, other: &Self) -> bool {
        self.root().equals(&other.root())
    }
}

impl<V: Eq> Eq for TreeNode<V> {}

impl<V: Hash> Hash for TreeNode<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.root().hash_structure(state);
    }
}

impl<V: fmt::Display> fmt::Display for TreeNode<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root().to_parentheses_string())
    }
}

impl<V: fmt::Debug> fmt::Debug for TreeNode<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.root().to_parentheses_string_with(|value| format!("{value:?}"));
        f.debug_tuple("TreeNode").field(&format_args!("{text}")).finish()
    }
}

/// Borrowed view of one node of a [`TreeNode`].
pub struct NodeRef<'a, V> {
    tree: &'a TreeNode<V>,
    id: NodeId,
}

impl<'a, V> NodeRef<'a, V> {
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Arena this node belongs to.
    #[inline]
    pub fn tree(&self) -> &'a TreeNode<V> {
        self.tree
    }

    /// Value of the node, borrowed for the lifetime of the arena.
    #[inline]
    pub fn get(&self) -> &'a V {
        &self.slot().value
    }

    #[inline]
    fn slot(&self) -> &'a NodeSlot<V> {
        &self.tree.nodes[self.id]
    }
}

impl<V> Clone for NodeRef<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for NodeRef<'_, V> {}

impl<'a, V> Tree for NodeRef<'a, V> {
    type Value = V;

    #[inline]
    fn value(&self) -> &V {
        &self.slot().value
    }

    #[inline]
    fn parent(&self) -> Option<Self> {
        self.slot().parent.map(|id| NodeRef {
            tree: self.tree,
            id,
        })
    }

    fn child(&self, index: usize) -> TreeResult<Self> {
        let children = &self.slot().children;
        children
            .get(index)
            .map(|&id| NodeRef {
                tree: self.tree,
                id,
            })
            .ok_or(TreeError::ChildIndexOutOfBounds {
                index,
                count: children.len(),
            })
    }

    #[inline]
    fn child_count(&self) -> usize {
        self.slot().children.len()
    }

    #[inline]
    fn identical(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }

    fn index_of(&self, child: &Self) -> Option<usize> {
        if !std::ptr::eq(self.tree, child.tree) {
            return None;
        }
        self.slot().children.iter().position(|id| *id == child.id)
    }
}

impl<V: fmt::Debug> fmt::Debug for NodeRef<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("value", self.value())
            .finish()
    }
}

impl<V: fmt::Display> fmt::Display for NodeRef<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_parentheses_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlink_keeps_sibling_order() {
        let mut tree = TreeNode::new(0);
        let root = tree.root_id();
        tree.attach_values(root, [1, 2, 3]).unwrap();
        let middle = tree.children(root)[1];
        tree.unlink(middle);
        assert_eq!(tree.to_string(), "0(1,3)");
        assert_eq!(tree.parent(middle), None);
    }

    #[test]
    fn free_releases_every_slot() {
        let mut tree = TreeNode::new(0);
        let root = tree.root_id();
        let child = tree.attach_value(root, 1).unwrap();
        tree.attach_values(child, [2, 3]).unwrap();
        tree.unlink(child);
        tree.free(child);
        assert_eq!(tree.arena_len(), 1);
    }
}
