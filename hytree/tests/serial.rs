#![cfg(feature = "borsh")]

use hytree::error::SerialError;
use hytree::flat::{FlatTreeNode, NO_CHILDREN};
use hytree::node::TreeNode;
use hytree::serial::{SerialTag, read_flat, read_tree_node, write_flat, write_tree_node};
use hytree::tree::Tree;

fn sample() -> TreeNode<String> {
    TreeNode::parse("mul(div(cos(1.0),cos(π)),sin(mul(1.0,z)))").unwrap()
}

#[test]
fn tree_node_round_trip() {
    let tree = sample();
    let bytes = borsh::to_vec(&tree).unwrap();
    assert_eq!(bytes[0], SerialTag::TreeNode as u8);

    let decoded: TreeNode<String> = borsh::from_slice(&bytes).unwrap();
    assert_eq!(decoded, tree);
}

#[test]
fn flat_round_trip() {
    let flat = FlatTreeNode::of_tree(&sample().root());
    let bytes = borsh::to_vec(&flat).unwrap();
    assert_eq!(bytes[0], SerialTag::FlatTreeNode as u8);

    let decoded: FlatTreeNode<String> = borsh::from_slice(&bytes).unwrap();
    assert_eq!(decoded, flat);
    assert_eq!(decoded.child_offsets(), flat.child_offsets());
}

#[test]
fn representations_read_each_other() {
    let tree = sample();

    let mut bytes = Vec::new();
    write_tree_node(&tree, &mut bytes).unwrap();
    let flat: FlatTreeNode<String> = read_flat(&mut bytes.as_slice()).unwrap();
    assert!(flat.equals(&tree.root()));

    let mut bytes = Vec::new();
    write_flat(&flat, &mut bytes).unwrap();
    let back: TreeNode<String> = read_tree_node(&mut bytes.as_slice()).unwrap();
    assert_eq!(back, tree);
}

#[test]
fn detached_slots_are_not_written() {
    let mut tree = sample();
    tree.create("garbage".to_string());
    let decoded: TreeNode<String> = borsh::from_slice(&borsh::to_vec(&tree).unwrap()).unwrap();
    assert_eq!(decoded, tree);
    assert_eq!(decoded.garbage_size(), 0);
}

#[test]
fn subtree_views_are_written_as_trees() {
    let flat = FlatTreeNode::of_tree(&sample().root());
    let sin = flat.child(1).unwrap();

    let mut bytes = Vec::new();
    write_flat(&sin, &mut bytes).unwrap();
    let decoded: FlatTreeNode<String> = read_flat(&mut bytes.as_slice()).unwrap();
    assert_eq!(decoded.to_string(), "sin(mul(1.0,z))");
}

#[test]
fn invalid_layouts_are_rejected() {
    let values = vec!["a".to_string(), "b".to_string()];
    let mut bytes = vec![SerialTag::FlatTreeNode as u8];
    bytes.extend(borsh::to_vec(&values).unwrap());
    bytes.extend(borsh::to_vec(&vec![2u32, NO_CHILDREN]).unwrap());
    bytes.extend(borsh::to_vec(&vec![1u32, 0]).unwrap());

    let error = read_flat::<String, _>(&mut bytes.as_slice()).unwrap_err();
    assert!(matches!(error, SerialError::Layout(_)), "{error}");

    let truncated = &borsh::to_vec(&sample()).unwrap()[..10];
    assert!(matches!(
        read_tree_node::<String, _>(&mut &truncated[..]),
        Err(SerialError::Io(_))
    ));
    assert!(borsh::from_slice::<TreeNode<String>>(&[9, 0, 0, 0, 0]).is_err());
}
