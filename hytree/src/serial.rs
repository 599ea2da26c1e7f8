//! Binary persistence of trees with borsh.
//!
//! Both representations share one layout, the breadth-first arrays of
//! [`FlatTreeNode`]:
//! ```text
//! tag: u8 | values: Vec<V> | child_offsets: Vec<u32> | child_counts: Vec<u32>
//! ```
//! The tag records which representation was written. Either representation can be
//! read back from either tag, and the layout is validated before any node is built.

use std::io::{Read, Write};

use borsh::{BorshDeserialize, BorshSerialize};
use strum::FromRepr;

use crate::error::SerialError;
use crate::flat::{FlatTreeNode, flatten, validate_layout};
use crate::node::TreeNode;
use crate::tree::Tree;

/// Leading byte of a persisted tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u8)]
pub enum SerialTag {
    TreeNode = 1,
    FlatTreeNode = 2,
}

fn write_layout<T, W>(tag: SerialTag, tree: &T, writer: &mut W) -> Result<(), SerialError>
where
    T: Tree,
    T::Value: BorshSerialize,
    W: Write,
{
    let (nodes, offsets, counts) = flatten(tree);
    let values: Vec<&T::Value> = nodes.iter().map(|node| node.value()).collect();

    (tag as u8).serialize(writer)?;
    values.serialize(writer)?;
    offsets.serialize(writer)?;
    counts.serialize(writer)?;
    Ok(())
}

type Layout<V> = (SerialTag, Vec<V>, Vec<u32>, Vec<u32>);

fn read_layout<V, R>(reader: &mut R) -> Result<Layout<V>, SerialError>
where
    V: BorshDeserialize,
    R: Read,
{
    let raw = u8::deserialize_reader(reader)?;
    let tag = SerialTag::from_repr(raw).ok_or(SerialError::UnknownTag(raw))?;
    let values = Vec::<V>::deserialize_reader(reader)?;
    let offsets = Vec::<u32>::deserialize_reader(reader)?;
    let counts = Vec::<u32>::deserialize_reader(reader)?;

    validate_layout(values.len(), &offsets, &counts)?;
    Ok((tag, values, offsets, counts))
}

/// Writes the main tree of `tree`.
pub fn write_tree_node<V, W>(tree: &TreeNode<V>, writer: &mut W) -> Result<(), SerialError>
where
    V: BorshSerialize,
    W: Write,
{
    write_layout(SerialTag::TreeNode, &tree.root(), writer)
}

/// Writes the subtree rooted at `tree`.
pub fn write_flat<V, W>(tree: &FlatTreeNode<V>, writer: &mut W) -> Result<(), SerialError>
where
    V: BorshSerialize,
    W: Write,
{
    write_layout(SerialTag::FlatTreeNode, tree, writer)
}

pub fn read_tree_node<V, R>(reader: &mut R) -> Result<TreeNode<V>, SerialError>
where
    V: BorshDeserialize,
    R: Read,
{
    let (_, values, offsets, counts) = read_layout(reader)?;
    Ok(TreeNode::from_flat_parts(values, &offsets, &counts)?)
}

pub fn read_flat<V, R>(reader: &mut R) -> Result<FlatTreeNode<V>, SerialError>
where
    V: BorshDeserialize,
    R: Read,
{
    let (_, values, offsets, counts) = read_layout(reader)?;
    Ok(FlatTreeNode::from_parts(values, offsets, counts)?)
}

impl<V: BorshSerialize> BorshSerialize for TreeNode<V> {
    fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        write_tree_node(self, writer).map_err(Into::into)
    }
}

impl<V: BorshDeserialize> BorshDeserialize for TreeNode<V> {
    fn deserialize_reader<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        read_tree_node(reader).map_err(Into::into)
    }
}

impl<V: BorshSerialize> BorshSerialize for FlatTreeNode<V> {
    fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        write_flat(self, writer).map_err(Into::into)
    }
}

impl<V: BorshDeserialize> BorshDeserialize for FlatTreeNode<V> {
    fn deserialize_reader<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        read_flat(reader).map_err(Into::into)
    }
}
