use core::ops::RangeBounds;

use super::{Tree, TreeConf};
use crate::{cfg_not_sync, cfg_sync, Aggregator, Index};

/// A cloneable [Tree] handle backed by interior mutability
///
/// By default the handle is single-threaded and uses `RefCell`. With the `sync` flag
/// enabled it is backed by a `parking_lot` read-write lock so that clones can be
/// shared across threads: queries take the shared lock and mutations the exclusive one.
///
/// ```
/// use dyseg_core::{SharedTree, aggregator::sum::U64SumAggregator};
///
/// let tree: SharedTree<u32, U64SumAggregator> = SharedTree::new();
/// let other = tree.clone();
/// tree.insert(10, 4);
/// other.insert(20, 6);
/// assert_eq!(tree.query(..), 10);
/// ```
#[derive(Clone)]
pub struct SharedTree<I: Index, A: Aggregator> {
    inner: Inner<I, A>,
}

impl<I: Index, A: Aggregator> Default for SharedTree<I, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Index, A: Aggregator> SharedTree<I, A> {
    /// Creates an empty shared tree
    pub fn new() -> Self {
        Self::from(Tree::new())
    }

    /// Creates an empty shared tree from the given configuration
    pub fn with_conf(conf: TreeConf) -> Self {
        Self::from(Tree::with_conf(conf))
    }

    /// See [Tree::insert]
    #[inline]
    pub fn insert(&self, index: I, input: A::Input) -> Option<A::PartialAggregate> {
        self.inner.write().insert(index, input)
    }

    /// See [Tree::apply]
    #[inline]
    pub fn apply(&self, index: I, input: A::Input) -> A::PartialAggregate {
        self.inner.write().apply(index, input)
    }

    /// See [Tree::remove]
    #[inline]
    pub fn remove(&self, index: I) -> Option<A::PartialAggregate> {
        self.inner.write().remove(index)
    }

    /// See [Tree::clear]
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// See [Tree::query]
    #[inline]
    pub fn query<R: RangeBounds<I>>(&self, range: R) -> A::PartialAggregate {
        self.inner.read().query(range)
    }

    /// See [Tree::query_and_lower]
    #[inline]
    pub fn query_and_lower<R: RangeBounds<I>>(&self, range: R) -> A::Aggregate {
        self.inner.read().query_and_lower(range)
    }

    /// See [Tree::get]
    #[inline]
    pub fn get(&self, index: I) -> Option<A::PartialAggregate> {
        self.inner.read().get(index)
    }

    /// See [Tree::value_at]
    #[inline]
    pub fn value_at(&self, index: I) -> A::PartialAggregate {
        self.inner.read().value_at(index)
    }

    /// See [Tree::contains]
    #[inline]
    pub fn contains(&self, index: I) -> bool {
        self.inner.read().contains(index)
    }

    /// See [Tree::total]
    #[inline]
    pub fn total(&self) -> A::PartialAggregate {
        self.inner.read().total()
    }

    /// See [Tree::len]
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// See [Tree::is_empty]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Borrows the underlying tree for reading
    #[inline]
    pub fn read(&self) -> TreeRef<'_, I, A> {
        self.inner.read()
    }

    /// Borrows the underlying tree for writing
    #[inline]
    pub fn write(&self) -> TreeRefMut<'_, I, A> {
        self.inner.write()
    }
}

impl<I: Index, A: Aggregator> From<Tree<I, A>> for SharedTree<I, A> {
    fn from(tree: Tree<I, A>) -> Self {
        Self {
            inner: Inner::new(tree),
        }
    }
}

impl<I: Index, A: Aggregator> core::fmt::Debug for SharedTree<I, A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&*self.inner.read(), f)
    }
}

// Two different Inner implementations below:

cfg_not_sync! {
    #[cfg(not(feature = "std"))]
    use alloc::rc::Rc;
    use core::cell::RefCell;
    #[cfg(feature = "std")]
    use std::rc::Rc;

    /// An immutably borrowed Tree from [`RefCell::borrow`]
    pub type TreeRef<'a, I, A> = core::cell::Ref<'a, Tree<I, A>>;
    /// A mutably borrowed Tree from [`RefCell::borrow_mut`]
    pub type TreeRefMut<'a, I, A> = core::cell::RefMut<'a, Tree<I, A>>;

    #[derive(Clone)]
    struct Inner<I: Index, A: Aggregator>(Rc<RefCell<Tree<I, A>>>);

    impl<I: Index, A: Aggregator> Inner<I, A> {
        #[inline(always)]
        fn new(val: Tree<I, A>) -> Self {
            Self(Rc::new(RefCell::new(val)))
        }

        #[inline(always)]
        fn read(&self) -> TreeRef<'_, I, A> {
            self.0.borrow()
        }

        #[inline(always)]
        fn write(&self) -> TreeRefMut<'_, I, A> {
            self.0.borrow_mut()
        }
    }
}

cfg_sync! {
    use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
    use std::sync::Arc;

    /// The lock you get from [`RwLock::read`].
    pub type TreeRef<'a, I, A> = RwLockReadGuard<'a, Tree<I, A>>;
    /// The lock you get from [`RwLock::write`].
    pub type TreeRefMut<'a, I, A> = RwLockWriteGuard<'a, Tree<I, A>>;

    #[derive(Clone)]
    struct Inner<I: Index, A: Aggregator>(Arc<RwLock<Tree<I, A>>>);

    impl<I: Index, A: Aggregator> Inner<I, A> {
        #[inline(always)]
        fn new(val: Tree<I, A>) -> Self {
            Self(Arc::new(RwLock::new(val)))
        }

        #[inline(always)]
        fn read(&self) -> TreeRef<'_, I, A> {
            self.0.read()
        }

        #[inline(always)]
        fn write(&self) -> TreeRefMut<'_, I, A> {
            self.0.write()
        }
    }
}
