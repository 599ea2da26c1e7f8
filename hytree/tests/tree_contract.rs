use hytree::error::TreeError;
use hytree::flat::FlatTreeNode;
use hytree::node::{NodeRef, TreeNode};
use hytree::path::Path;
use hytree::tree::Tree;

// a
// ├── b
// │   ├── d
// │   └── e
// └── c
//     └── f
const SAMPLE: &str = "a(b(d,e),c(f))";

fn find<'a>(tree: &'a TreeNode<String>, value: &str) -> NodeRef<'a, String> {
    tree.root()
        .breadth_first()
        .find(|node| node.value() == value)
        .unwrap_or_else(|| panic!("no node `{value}`"))
}

fn values<T: Tree<Value = String>>(nodes: impl IntoIterator<Item = T>) -> Vec<String> {
    nodes.into_iter().map(|node| node.value().clone()).collect()
}

#[test]
fn shape_queries() {
    let tree = TreeNode::parse(SAMPLE).unwrap();
    let root = tree.root();

    assert!(root.is_root());
    assert!(!root.is_leaf());
    assert_eq!(root.size(), 6);
    assert_eq!(root.depth(), 2);
    assert_eq!(root.leaf_count(), 3);
    assert_eq!(find(&tree, "d").level(), 2);
    assert_eq!(find(&tree, "c").depth(), 1);
    assert!(find(&tree, "f").root().identical(&root));
}

#[test]
fn children_and_siblings() {
    let tree = TreeNode::parse(SAMPLE).unwrap();
    let root = tree.root();
    let (b, c, d) = (find(&tree, "b"), find(&tree, "c"), find(&tree, "d"));

    assert_eq!(values(root.children()), ["b", "c"]);
    assert!(root.first_child().unwrap().identical(&b));
    assert!(root.last_child().unwrap().identical(&c));
    assert_eq!(root.index_of(&c), Some(1));
    assert!(root.is_child(&b));
    assert!(!root.is_child(&d));

    assert!(b.next_sibling().unwrap().identical(&c));
    assert!(c.previous_sibling().unwrap().identical(&b));
    assert!(c.next_sibling().is_none());
    assert!(b.previous_sibling().is_none());
    assert_eq!(b.sibling_count(), 2);
    assert_eq!(root.sibling_count(), 1);
    assert!(b.is_sibling(&c));
    assert!(!b.is_sibling(&d));

    assert!(root.child_after(&b).unwrap().unwrap().identical(&c));
    assert!(root.child_after(&c).unwrap().is_none());
    assert!(root.child_before(&b).unwrap().is_none());
    assert_eq!(root.child_after(&d).unwrap_err(), TreeError::NotAChild);
    assert_eq!(
        root.child(5).unwrap_err(),
        TreeError::ChildIndexOutOfBounds { index: 5, count: 2 }
    );
}

#[test]
fn index_of_uses_identity() {
    let tree = TreeNode::parse("x(y,y)").unwrap();
    let root = tree.root();
    let second = root.child(1).unwrap();

    assert!(root.child(0).unwrap().equals(&second));
    assert_eq!(root.index_of(&second), Some(1));
}

#[test]
fn leaves_and_neighbours() {
    let tree = TreeNode::parse(SAMPLE).unwrap();
    let root = tree.root();

    assert_eq!(root.first_leaf().value(), "d");
    assert_eq!(root.last_leaf().value(), "f");
    assert_eq!(find(&tree, "d").next_leaf().unwrap().value(), "e");
    assert_eq!(find(&tree, "e").next_leaf().unwrap().value(), "f");
    assert!(find(&tree, "f").next_leaf().is_none());
    assert_eq!(find(&tree, "f").previous_leaf().unwrap().value(), "e");
    assert!(find(&tree, "d").previous_leaf().is_none());

    // Following `next_node` from the root visits the tree in pre-order.
    let mut walked = vec![root.value().clone()];
    let mut node = root;
    while let Some(next) = node.next_node() {
        walked.push(next.value().clone());
        node = next;
    }
    assert_eq!(walked, values(root.preorder()));

    assert_eq!(find(&tree, "f").previous_node().unwrap().value(), "c");
    assert_eq!(find(&tree, "c").previous_node().unwrap().value(), "e");
    assert!(root.previous_node().is_none());
}

#[test]
fn ancestry() {
    let tree = TreeNode::parse(SAMPLE).unwrap();
    let (a, b, d, e, f) = (
        tree.root(),
        find(&tree, "b"),
        find(&tree, "d"),
        find(&tree, "e"),
        find(&tree, "f"),
    );

    assert!(d.is_ancestor(&b));
    assert!(d.is_ancestor(&d));
    assert!(!b.is_ancestor(&d));
    assert!(b.is_descendant(&d));
    assert!(!d.is_descendant(&b));

    assert!(d.shared_ancestor(&e).unwrap().identical(&b));
    assert!(d.shared_ancestor(&f).unwrap().identical(&a));
    assert!(b.shared_ancestor(&e).unwrap().identical(&b));
    assert!(d.is_related(&f));

    let other = TreeNode::parse(SAMPLE).unwrap();
    let foreign = find(&other, "d");
    assert!(d.shared_ancestor(&foreign).is_none());
    assert!(!d.is_related(&foreign));
}

#[test]
fn paths() {
    let tree = TreeNode::parse(SAMPLE).unwrap();
    let root = tree.root();
    let f = find(&tree, "f");

    let path = f.path();
    assert_eq!(path, Path::of([1, 0]));
    assert_eq!(path.to_string(), "[1, 0]");
    assert!(root.child_at_path(&path).unwrap().identical(&f));
    assert!(root.child_at_path(&Path::of([0, 2])).is_none());
    assert!(root.path().is_empty());

    assert_eq!(values(f.path_elements()), ["a", "c", "f"]);
    assert_eq!(values(f.path_from_ancestor(&root).unwrap()), ["a", "c", "f"]);
    assert_eq!(
        root.path_from_ancestor(&f).unwrap_err(),
        TreeError::NotAnAncestor
    );
}

#[test]
fn structural_equality_across_representations() {
    let tree = TreeNode::parse(SAMPLE).unwrap();
    let flat = FlatTreeNode::of_tree(&tree.root());
    let other = TreeNode::parse("a(b(d,e),c(g))").unwrap();

    assert!(tree.root().equals(&flat));
    assert!(flat.equals(&tree.root()));
    assert!(!tree.root().equals(&other.root()));
    assert_eq!(tree.root().tree_hash(), flat.tree_hash());
    assert_ne!(tree.root().tree_hash(), other.root().tree_hash());

    // Equal subtrees of one tree are equal but not identical.
    let twins = TreeNode::parse("r(x(1),x(1))").unwrap();
    let (left, right) = (twins.root().child(0).unwrap(), twins.root().child(1).unwrap());
    assert!(left.equals(&right));
    assert!(!left.identical(&right));
}
