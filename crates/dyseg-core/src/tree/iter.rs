use core::{iter::FusedIterator, marker::PhantomData};

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use super::arena::{Arena, NodeId};
use crate::{Aggregator, Index};

/// Iterator over the `(index, partial aggregate)` entries of a [Tree](crate::Tree)
/// in ascending index order
///
/// Created by [Tree::iter](crate::Tree::iter).
pub struct Iter<'a, I: Index, A: Aggregator> {
    nodes: &'a Arena<A::PartialAggregate>,
    stack: Vec<NodeId>,
    remaining: usize,
    _marker: PhantomData<fn() -> I>,
}

impl<'a, I: Index, A: Aggregator> Iter<'a, I, A> {
    pub(super) fn new(
        nodes: &'a Arena<A::PartialAggregate>,
        root: Option<NodeId>,
        len: usize,
    ) -> Self {
        let mut stack = Vec::new();
        stack.extend(root);
        Self {
            nodes,
            stack,
            remaining: len,
            _marker: PhantomData,
        }
    }
}

impl<I: Index, A: Aggregator> Iterator for Iter<'_, I, A> {
    type Item = (I, A::PartialAggregate);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            let node = &self.nodes[id];
            if node.is_leaf() {
                self.remaining -= 1;
                return Some((I::from_position(node.span.lo), node.value));
            }
            // right first so that the left subtree is visited first
            self.stack.extend(node.right);
            self.stack.extend(node.left);
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<I: Index, A: Aggregator> ExactSizeIterator for Iter<'_, I, A> {}
impl<I: Index, A: Aggregator> FusedIterator for Iter<'_, I, A> {}
