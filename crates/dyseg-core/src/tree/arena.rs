use core::ops::{Index, IndexMut};

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use super::node::Node;

/// Handle to a node stored in an [Arena]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

#[derive(Debug, Clone)]
enum Slot<P> {
    Occupied(Node<P>),
    Free { next: Option<usize> },
}

/// Slot storage for tree nodes with a free list of released slots
#[derive(Debug, Clone)]
pub(crate) struct Arena<P> {
    slots: Vec<Slot<P>>,
    free_head: Option<usize>,
    len: usize,
}

impl<P> Default for Arena<P> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<P> Arena<P> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            len: 0,
        }
    }

    /// Number of occupied slots
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub fn alloc(&mut self, node: Node<P>) -> NodeId {
        self.len += 1;
        match self.free_head {
            Some(idx) => {
                let next = match self.slots[idx] {
                    Slot::Free { next } => next,
                    Slot::Occupied(_) => unreachable!("free list points at an occupied slot"),
                };
                self.free_head = next;
                self.slots[idx] = Slot::Occupied(node);
                NodeId(idx)
            }
            None => {
                self.slots.push(Slot::Occupied(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Releases the slot of `id` and returns the node it held
    ///
    /// # Panics
    ///
    /// Panics if `id` does not refer to a live node.
    pub fn release(&mut self, id: NodeId) -> Node<P> {
        let slot = core::mem::replace(
            &mut self.slots[id.0],
            Slot::Free {
                next: self.free_head,
            },
        );
        match slot {
            Slot::Occupied(node) => {
                self.free_head = Some(id.0);
                self.len -= 1;
                node
            }
            Slot::Free { .. } => panic!("released a stale node handle {:?}", id),
        }
    }

    /// Drops every node while keeping the allocated storage
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
        self.len = 0;
    }

    #[inline]
    #[cfg(test)]
    pub fn get(&self, id: NodeId) -> Option<&Node<P>> {
        match self.slots.get(id.0) {
            Some(Slot::Occupied(node)) => Some(node),
            _ => None,
        }
    }
}

impl<P> Index<NodeId> for Arena<P> {
    type Output = Node<P>;

    #[inline]
    fn index(&self, id: NodeId) -> &Self::Output {
        match self.slots.get(id.0) {
            Some(Slot::Occupied(node)) => node,
            _ => panic!("stale node handle {:?}", id),
        }
    }
}

impl<P> IndexMut<NodeId> for Arena<P> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        match self.slots.get_mut(id.0) {
            Some(Slot::Occupied(node)) => node,
            _ => panic!("stale node handle {:?}", id),
        }
    }
}
