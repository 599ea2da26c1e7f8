//! Immutable trees flattened into breadth-first parallel arrays.
//!
//! Role
//! - [`FlatTreeNode`] stores a whole tree in three arrays indexed by breadth-first
//!   position: `values[i]`, `child_offsets[i]` (index of the first child, or
//!   [`NO_CHILDREN`]) and `child_counts[i]`. A node is a view `(arrays, index)`; all
//!   views of a tree share the same arrays behind an [`Arc`].
//!
//! Layout
//! - The root sits at index 0.
//! - The children of a non-leaf node `i` occupy the contiguous range
//!   `child_offsets[i] .. child_offsets[i] + child_counts[i]`, strictly to the right
//!   of `i`, in left-to-right order.
//!
//! Complexity
//! - `root`, `child`, `child_count` and `size` of the root are O(1).
//! - `parent` is not stored: it scans backwards from the node for the nearest node
//!   whose child range contains it, O(n) in the worst case. Prefer
//!   [`TreeNode`](crate::node::TreeNode) when parents are looked up often.
//!
//! Views are `Send + Sync` whenever the values are: the arrays are never mutated after
//! construction.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use either::Either;

use crate::error::{TreeError, TreeResult};
use crate::iter::BreadthFirst;
use crate::node::TreeNode;
use crate::tree::Tree;

/// Child offset stored for leaves.
pub const NO_CHILDREN: u32 = u32::MAX;

#[derive(Debug, PartialEq, Eq, Hash)]
struct FlatData<V> {
    values: Vec<V>,
    child_offsets: Vec<u32>,
    child_counts: Vec<u32>,
}

/// Node of an immutable, breadth-first flattened tree.
pub struct FlatTreeNode<V> {
    data: Arc<FlatData<V>>,
    index: usize,
}

/// Breadth-first nodes of `tree` and the child offsets and counts of the flattened
/// layout.
pub(crate) fn flatten<T: Tree>(tree: &T) -> (Vec<T>, Vec<u32>, Vec<u32>) {
    let nodes: Vec<T> = tree.breadth_first().collect();
    let mut offsets = Vec::with_capacity(nodes.len());
    let mut counts = Vec::with_capacity(nodes.len());

    let mut next = 1u32;
    for node in &nodes {
        let count = node.child_count() as u32;
        counts.push(count);
        if count > 0 {
            offsets.push(next);
            next += count;
        } else {
            offsets.push(NO_CHILDREN);
        }
    }
    (nodes, offsets, counts)
}

/// Checks that `offsets` and `counts` describe a breadth-first layout of `len` nodes.
pub(crate) fn validate_layout(len: usize, offsets: &[u32], counts: &[u32]) -> TreeResult<()> {
    let invalid = |message: String| Err(TreeError::InvalidFlatLayout(message));

    if len == 0 {
        return invalid("a tree has at least one node".into());
    }
    if offsets.len() != len || counts.len() != len {
        return invalid(format!(
            "array lengths differ: {len} values, {} child offsets, {} child counts",
            offsets.len(),
            counts.len()
        ));
    }

    // Every node but the root must be claimed by an earlier node, in order.
    let mut next = 1usize;
    for (index, (&offset, &count)) in offsets.iter().zip(counts).enumerate() {
        if index > 0 && next <= index {
            return invalid(format!("node {index} is not the child of any preceding node"));
        }
        if count == 0 {
            if offset != NO_CHILDREN {
                return invalid(format!("leaf {index} has child offset {offset}"));
            }
            continue;
        }
        if offset as usize != next {
            return invalid(format!(
                "node {index} has child offset {offset}, expected {next}"
            ));
        }
        next += count as usize;
        if next > len {
            return invalid(format!(
                "children of node {index} end at {next}, past the {len} nodes"
            ));
        }
    }
    if next != len {
        return invalid(format!("only {next} of {len} nodes are reachable from the root"));
    }
    Ok(())
}

impl<V> FlatTreeNode<V> {
    /// Flattens `tree`, mapping every value through `mapper`.
    pub fn of_tree_with<T, F>(tree: &T, mapper: F) -> Self
    where
        T: Tree,
        F: FnMut(&T::Value) -> V,
    {
        let (nodes, child_offsets, child_counts) = flatten(tree);
        let mut mapper = mapper;
        let values = nodes.iter().map(|node| mapper(node.value())).collect();
        FlatTreeNode {
            data: Arc::new(FlatData {
                values,
                child_offsets,
                child_counts,
            }),
            index: 0,
        }
    }

    /// Builds a flattened tree from raw arrays, rejecting any layout that is not a
    /// breadth-first tree rooted at index 0.
    pub fn from_parts(
        values: Vec<V>,
        child_offsets: Vec<u32>,
        child_counts: Vec<u32>,
    ) -> TreeResult<Self> {
        validate_layout(values.len(), &child_offsets, &child_counts)?;
        Ok(FlatTreeNode {
            data: Arc::new(FlatData {
                values,
                child_offsets,
                child_counts,
            }),
            index: 0,
        })
    }

    /// Position of this node in the flattened arrays.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Index of the first child, `None` for a leaf.
    #[inline]
    pub fn child_offset(&self) -> Option<usize> {
        match self.data.child_offsets[self.index] {
            NO_CHILDREN => None,
            offset => Some(offset as usize),
        }
    }

    /// Values of the whole tree in flattened order.
    #[inline]
    pub fn values(&self) -> &[V] {
        &self.data.values
    }

    /// Child offsets of the whole tree, [`NO_CHILDREN`] for leaves.
    #[inline]
    pub fn child_offsets(&self) -> &[u32] {
        &self.data.child_offsets
    }

    #[inline]
    pub fn child_counts(&self) -> &[u32] {
        &self.data.child_counts
    }

    /// Nodes of the subtree rooted at this node in breadth-first order. For the root
    /// this walks the arrays directly.
    pub fn nodes(&self) -> impl Iterator<Item = FlatTreeNode<V>> + '_ {
        if self.index == 0 {
            Either::Left((0..self.data.values.len()).map(|index| FlatTreeNode {
                data: Arc::clone(&self.data),
                index,
            }))
        } else {
            Either::Right(BreadthFirst::new(self.clone()))
        }
    }

    /// Flattened copy of the subtree rooted at this node with every value mapped
    /// through `mapper`. The layout of the root is reused as is.
    pub fn map_nodes<B, F>(&self, mapper: F) -> FlatTreeNode<B>
    where
        F: FnMut(&V) -> B,
    {
        if self.index != 0 {
            return FlatTreeNode::of_tree_with(self, mapper);
        }
        FlatTreeNode {
            data: Arc::new(FlatData {
                values: self.data.values.iter().map(mapper).collect(),
                child_offsets: self.data.child_offsets.clone(),
                child_counts: self.data.child_counts.clone(),
            }),
            index: 0,
        }
    }

    /// Whether `index` lies in the child range of the node at `candidate`.
    #[inline]
    fn is_parent_of(&self, candidate: usize, index: usize) -> bool {
        let count = self.data.child_counts[candidate] as usize;
        let offset = self.data.child_offsets[candidate] as usize;
        count > 0 && offset <= index && index < offset + count
    }

    /// Rebuilds a mutable tree, moving the values out when the arrays are not shared
    /// with another view.
    pub fn into_tree_node(self) -> TreeNode<V>
    where
        V: Clone,
    {
        if self.index != 0 {
            return TreeNode::of_tree(&self);
        }
        match Arc::try_unwrap(self.data) {
            Ok(FlatData {
                values,
                child_offsets,
                child_counts,
            }) => match TreeNode::from_flat_parts(values, &child_offsets, &child_counts) {
                Ok(tree) => tree,
                Err(_) => unreachable!("flattened arrays always hold a root"),
            },
            Err(data) => TreeNode::of_tree(&FlatTreeNode { data, index: 0 }),
        }
    }
}

impl<V: Clone> FlatTreeNode<V> {
    /// Flattens `tree` with one breadth-first walk.
    pub fn of_tree<T: Tree<Value = V>>(tree: &T) -> Self {
        Self::of_tree_with(tree, V::clone)
    }
}

impl<V> Clone for FlatTreeNode<V> {
    fn clone(&self) -> Self {
        FlatTreeNode {
            data: Arc::clone(&self.data),
            index: self.index,
        }
    }
}

impl<V> Tree for FlatTreeNode<V> {
    type Value = V;

    #[inline]
    fn value(&self) -> &V {
        &self.data.values[self.index]
    }

    fn parent(&self) -> Option<Self> {
        (0..self.index)
            .rev()
            .find(|&candidate| self.is_parent_of(candidate, self.index))
            .map(|index| FlatTreeNode {
                data: Arc::clone(&self.data),
                index,
            })
    }

    fn child(&self, index: usize) -> TreeResult<Self> {
        let count = self.child_count();
        match self.child_offset() {
            Some(offset) if index < count => Ok(FlatTreeNode {
                data: Arc::clone(&self.data),
                index: offset + index,
            }),
            _ => Err(TreeError::ChildIndexOutOfBounds { index, count }),
        }
    }

    #[inline]
    fn child_count(&self) -> usize {
        self.data.child_counts[self.index] as usize
    }

    #[inline]
    fn identical(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data) && self.index == other.index
    }

    #[inline]
    fn is_root(&self) -> bool {
        self.index == 0
    }

    #[inline]
    fn root(&self) -> Self {
        FlatTreeNode {
            data: Arc::clone(&self.data),
            index: 0,
        }
    }

    fn size(&self) -> usize {
        if self.index == 0 {
            self.data.values.len()
        } else {
            self.breadth_first().count()
        }
    }
}

impl<V: PartialEq> PartialEq for FlatTreeNode<V> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
            && (Arc::ptr_eq(&self.data, &other.data) || self.data == other.data)
    }
}

impl<V: Eq> Eq for FlatTreeNode<V> {}

impl<V: Hash> Hash for FlatTreeNode<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.data.hash(state);
    }
}

impl<V: fmt::Debug> fmt::Debug for FlatTreeNode<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlatTreeNode")
            .field("index", &self.index)
            .field("values", &self.data.values)
            .field("child_offsets", &self.data.child_offsets)
            .field("child_counts", &self.data.child_counts)
            .finish()
    }
}

impl<V: fmt::Display> fmt::Display for FlatTreeNode<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_parentheses_string())
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use serde::de::Error as _;
    use serde::ser::SerializeStruct;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::FlatTreeNode;

    /// The whole arrays are written, a non-root view is read back as the root of its
    /// tree.
    impl<V: Serialize> Serialize for FlatTreeNode<V> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut state = serializer.serialize_struct("FlatTreeNode", 3)?;
            state.serialize_field("values", &self.data.values)?;
            state.serialize_field("child_offsets", &self.data.child_offsets)?;
            state.serialize_field("child_counts", &self.data.child_counts)?;
            state.end()
        }
    }

    impl<'de, V: Deserialize<'de>> Deserialize<'de> for FlatTreeNode<V> {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            #[derive(Deserialize)]
            struct Parts<T> {
                values: Vec<T>,
                child_offsets: Vec<u32>,
                child_counts: Vec<u32>,
            }

            let parts = Parts::<V>::deserialize(deserializer)?;
            FlatTreeNode::from_parts(parts.values, parts.child_offsets, parts.child_counts)
                .map_err(D::Error::custom)
        }
    }
}
