use std::thread;

use hytree::error::TreeError;
use hytree::flat::{FlatTreeNode, NO_CHILDREN};
use hytree::node::TreeNode;
use hytree::tree::Tree;

fn sample() -> FlatTreeNode<String> {
    FlatTreeNode::of_tree(&TreeNode::parse("a(b(d,e),c(f))").unwrap().root())
}

#[test]
fn breadth_first_layout() {
    let flat = sample();
    assert_eq!(flat.values(), ["a", "b", "c", "d", "e", "f"]);
    assert_eq!(
        flat.child_offsets(),
        [1, 3, 5, NO_CHILDREN, NO_CHILDREN, NO_CHILDREN]
    );
    assert_eq!(flat.child_counts(), [2, 2, 1, 0, 0, 0]);
    assert_eq!(flat.child_offset(), Some(1));
}

#[test]
fn navigation() {
    let flat = sample();
    let b = flat.child(0).unwrap();
    let e = b.child(1).unwrap();

    assert_eq!(e.value(), "e");
    assert_eq!(e.index(), 4);
    assert_eq!(e.child_offset(), None);
    assert!(e.parent().unwrap().identical(&b));
    assert!(flat.parent().is_none());
    assert!(e.root().identical(&flat));
    assert!(e.is_ancestor(&flat));
    assert_eq!(e.level(), 2);
    assert_eq!(
        e.child(0).unwrap_err(),
        TreeError::ChildIndexOutOfBounds { index: 0, count: 0 }
    );

    assert_eq!(flat.size(), 6);
    assert_eq!(b.size(), 3);
    assert_eq!(b.to_string(), "b(d,e)");
}

#[test]
fn nodes_in_flat_order() {
    let flat = sample();
    let indices: Vec<usize> = flat.nodes().map(|node| node.index()).collect();
    assert_eq!(indices, [0, 1, 2, 3, 4, 5]);

    let c = flat.child(1).unwrap();
    let values: Vec<String> = c.nodes().map(|node| node.value().clone()).collect();
    assert_eq!(values, ["c", "f"]);
}

#[test]
fn flatten_round_trip() {
    let tree = TreeNode::parse("mul(div(cos(1.0),cos(π)),sin(mul(1.0,z)))").unwrap();
    let flat = FlatTreeNode::of_tree(&tree.root());
    let again = FlatTreeNode::of_tree(&flat);

    assert_eq!(again, flat);
    assert!(flat.equals(&tree.root()));
    assert_eq!(flat.clone().into_tree_node(), tree);

    // A shared view cannot give its arrays away but still converts.
    let shared = flat.clone();
    assert_eq!(shared.into_tree_node(), tree);
    assert_eq!(flat.child(1).unwrap().into_tree_node().to_string(), "sin(mul(1.0,z))");
}

#[test]
fn equality_and_identity() {
    let first = sample();
    let second = sample();

    assert_eq!(first, second);
    assert!(!first.identical(&second));
    assert!(first.identical(&first.clone()));
    assert_ne!(first, first.child(0).unwrap());
}

#[test]
fn map_nodes() {
    let flat = sample();
    let upper = flat.map_nodes(|value| value.to_uppercase());
    assert_eq!(upper.to_string(), "A(B(D,E),C(F))");
    assert_eq!(upper.child_offsets(), flat.child_offsets());

    let sub = flat.child(0).unwrap().map_nodes(|value| value.len());
    assert_eq!(sub.to_string(), "1(1,1)");
    assert!(sub.is_root());
}

#[test]
fn from_parts_validates_the_layout() {
    let values = || vec!["a", "b", "c"];

    let tree = FlatTreeNode::from_parts(values(), vec![1, NO_CHILDREN, NO_CHILDREN], vec![2, 0, 0]).unwrap();
    assert_eq!(tree.to_string(), "a(b,c)");

    let invalid = [
        (vec![1, NO_CHILDREN], vec![2, 0, 0]),
        (vec![2, NO_CHILDREN, NO_CHILDREN], vec![2, 0, 0]),
        (vec![1, NO_CHILDREN, NO_CHILDREN], vec![1, 0, 0]),
        (vec![1, NO_CHILDREN, NO_CHILDREN], vec![3, 0, 0]),
        (vec![1, 5, NO_CHILDREN], vec![2, 0, 0]),
    ];
    for (offsets, counts) in invalid {
        let error = FlatTreeNode::from_parts(values(), offsets, counts).unwrap_err();
        assert!(error.is_invalid_flat_layout(), "{error}");
    }
    assert!(FlatTreeNode::<&str>::from_parts(vec![], vec![], vec![]).is_err());
}

#[test]
fn views_are_shared_between_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<FlatTreeNode<String>>();

    let flat = sample();
    let sizes: Vec<usize> = thread::scope(|scope| {
        let handles: Vec<_> = (0..flat.child_count())
            .map(|index| {
                let view = flat.child(index).unwrap();
                scope.spawn(move || view.size())
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });
    assert_eq!(sizes, [3, 2]);
}
