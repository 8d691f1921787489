mod key;

pub use key::{DirectKey, HashKey, KeyMapper};

use crate::{Aggregator, Tree};

/// A set of aggregator inputs whose combined aggregate is maintained incrementally
///
/// Every value is stored in a private [Tree] at the index chosen by the key mapper
/// `M`. Values that map to the same index replace each other, which gives set
/// semantics for [DirectKey] and also means that hash collisions under [HashKey]
/// overwrite one another.
///
/// [AggregateSet::all] combines values in ascending index order. Under [HashKey]
/// that is hash order, so only commutative aggregators give a meaningful result.
///
/// # Example
///
/// ```
/// use dyseg_core::{AggregateSet, aggregator::max::I32MaxAggregator};
///
/// let mut set: AggregateSet<I32MaxAggregator> = AggregateSet::new();
/// set.insert(-7);
/// set.insert(31);
/// set.insert(4);
/// assert_eq!(set.all(), 31);
/// set.remove(&31);
/// assert_eq!(set.all(), 4);
/// ```
#[derive(Clone)]
pub struct AggregateSet<A, M = DirectKey>
where
    A: Aggregator,
    M: KeyMapper<A::Input>,
{
    tree: Tree<M::Index, A>,
    mapper: M,
}

/// An [AggregateSet] keyed by the hash of each value
pub type HashedAggregateSet<A, S = hashbrown::hash_map::DefaultHashBuilder> =
    AggregateSet<A, HashKey<S>>;

impl<A, M> Default for AggregateSet<A, M>
where
    A: Aggregator,
    M: KeyMapper<A::Input> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<A, M> AggregateSet<A, M>
where
    A: Aggregator,
    M: KeyMapper<A::Input>,
{
    /// Creates an empty set with a default key mapper
    pub fn new() -> Self
    where
        M: Default,
    {
        Self::with_mapper(M::default())
    }

    /// Creates an empty set using the given key mapper
    pub fn with_mapper(mapper: M) -> Self {
        Self {
            tree: Tree::new(),
            mapper,
        }
    }

    /// Inserts `value`, returning `true` if its key was not present before
    pub fn insert(&mut self, value: A::Input) -> bool {
        let key = self.mapper.key(&value);
        self.tree.insert(key, value).is_none()
    }

    /// Removes the value stored at the key of `value`, returning `true` if one was present
    pub fn remove(&mut self, value: &A::Input) -> bool {
        self.tree.remove(self.mapper.key(value)).is_some()
    }

    /// Returns `true` if a value is stored at the key of `value`
    pub fn contains(&self, value: &A::Input) -> bool {
        self.tree.contains(self.mapper.key(value))
    }

    /// Returns the combination of all values in the set
    #[inline]
    pub fn all(&self) -> A::PartialAggregate {
        self.tree.total()
    }

    /// Returns the lowered combination of all values in the set
    #[inline]
    pub fn all_and_lower(&self) -> A::Aggregate {
        self.tree.total_and_lower()
    }

    /// Returns the number of values in the set
    #[inline]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the set is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Removes all values
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns the underlying tree
    pub fn tree(&self) -> &Tree<M::Index, A> {
        &self.tree
    }

    /// Returns the key mapper
    pub fn mapper(&self) -> &M {
        &self.mapper
    }
}

impl<A, M> core::fmt::Debug for AggregateSet<A, M>
where
    A: Aggregator,
    M: KeyMapper<A::Input>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AggregateSet")
            .field("len", &self.len())
            .field("all", &self.all())
            .finish()
    }
}

impl<A, M> Extend<A::Input> for AggregateSet<A, M>
where
    A: Aggregator,
    M: KeyMapper<A::Input>,
{
    fn extend<T: IntoIterator<Item = A::Input>>(&mut self, iter: T) {
        for value in iter {
            self.insert(value);
        }
    }
}
