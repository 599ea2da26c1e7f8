//! Lazy traversals over any [`Tree`].
//!
//! Every iterator keeps its own explicit worklist instead of recursing, so the call
//! stack stays flat whatever the depth of the tree:
//! - [`BreadthFirst`] holds a queue of sibling groups,
//! - [`Preorder`] a stack of sibling groups,
//! - [`Postorder`] a stack of `(node, remaining children)` frames,
//! - [`PathFromAncestor`] the parent chain collected up front.
//!
//! Each traversal starts at the node it was created from and visits that node's
//! subtree only. Iterators are finite and fused; create a new one to restart.

use std::collections::VecDeque;
use std::iter::FusedIterator;

use crate::error::{TreeError, TreeResult};
use crate::tree::Tree;

/// Children of a node, left to right.
#[derive(Debug, Clone)]
pub struct Children<T> {
    parent: T,
    next: usize,
    end: usize,
}

impl<T: Tree> Children<T> {
    pub fn new(parent: T) -> Self {
        let end = parent.child_count();
        Children {
            parent,
            next: 0,
            end,
        }
    }
}

impl<T: Tree> Iterator for Children<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.next >= self.end {
            return None;
        }
        let child = self.parent.child(self.next).ok();
        self.next += 1;
        child
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl<T: Tree> DoubleEndedIterator for Children<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.next >= self.end {
            return None;
        }
        self.end -= 1;
        self.parent.child(self.end).ok()
    }
}

impl<T: Tree> ExactSizeIterator for Children<T> {}
impl<T: Tree> FusedIterator for Children<T> {}

/// Breadth-first traversal: a node is yielded only after every node of a shallower
/// level of the subtree.
#[derive(Debug, Clone)]
pub struct BreadthFirst<T> {
    start: Option<T>,
    queue: VecDeque<Children<T>>,
}

impl<T: Tree> BreadthFirst<T> {
    pub fn new(root: T) -> Self {
        BreadthFirst {
            start: Some(root),
            queue: VecDeque::new(),
        }
    }
}

impl<T: Tree> Iterator for BreadthFirst<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let node = match self.start.take() {
            Some(root) => root,
            None => loop {
                let group = self.queue.front_mut()?;
                match group.next() {
                    Some(node) => break node,
                    None => {
                        self.queue.pop_front();
                    }
                }
            },
        };

        if !node.is_leaf() {
            self.queue.push_back(node.children());
        }
        Some(node)
    }
}

impl<T: Tree> FusedIterator for BreadthFirst<T> {}

/// Pre-order traversal: a node, then the pre-order traversals of its children from
/// left to right.
#[derive(Debug, Clone)]
pub struct Preorder<T> {
    start: Option<T>,
    stack: Vec<Children<T>>,
}

impl<T: Tree> Preorder<T> {
    pub fn new(root: T) -> Self {
        Preorder {
            start: Some(root),
            stack: Vec::new(),
        }
    }
}

impl<T: Tree> Iterator for Preorder<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let node = match self.start.take() {
            Some(root) => root,
            None => loop {
                let group = self.stack.last_mut()?;
                match group.next() {
                    Some(node) => break node,
                    None => {
                        self.stack.pop();
                    }
                }
            },
        };

        if !node.is_leaf() {
            self.stack.push(node.children());
        }
        Some(node)
    }
}

impl<T: Tree> FusedIterator for Preorder<T> {}

/// Post-order traversal: the post-order traversals of the children from left to
/// right, then the node itself.
#[derive(Debug, Clone)]
pub struct Postorder<T> {
    stack: Vec<(T, Children<T>)>,
}

impl<T: Tree> Postorder<T> {
    pub fn new(root: T) -> Self {
        let children = root.children();
        Postorder {
            stack: vec![(root, children)],
        }
    }
}

impl<T: Tree> Iterator for Postorder<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            let (_, remaining) = self.stack.last_mut()?;
            match remaining.next() {
                Some(child) => {
                    let children = child.children();
                    self.stack.push((child, children));
                }
                None => {
                    let (node, _) = self.stack.pop()?;
                    return Some(node);
                }
            }
        }
    }
}

impl<T: Tree> FusedIterator for Postorder<T> {}

/// Nodes on the path from an ancestor down to one of its descendants, both included.
#[derive(Debug, Clone)]
pub struct PathFromAncestor<T> {
    stack: Vec<T>,
}

impl<T: Tree> PathFromAncestor<T> {
    /// Collects the parent chain of `descendant` up to `ancestor`. Fails with
    /// [`TreeError::NotAnAncestor`] when the chain reaches the root without meeting
    /// `ancestor`.
    pub fn new(ancestor: &T, descendant: T) -> TreeResult<Self> {
        let mut stack = Vec::new();
        let mut current = Some(descendant);
        while let Some(node) = current {
            let found = node.identical(ancestor);
            current = if found { None } else { node.parent() };
            stack.push(node);
            if found {
                return Ok(PathFromAncestor { stack });
            }
        }
        Err(TreeError::NotAnAncestor)
    }
}

impl<T: Tree> Iterator for PathFromAncestor<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.stack.pop()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.stack.len(), Some(self.stack.len()))
    }
}

impl<T: Tree> ExactSizeIterator for PathFromAncestor<T> {}
impl<T: Tree> FusedIterator for PathFromAncestor<T> {}
