use core::{
    fmt,
    hash::{BuildHasher, Hash},
};

use crate::Index;

/// Maps values of type `T` onto the index domain of an [AggregateSet](crate::AggregateSet)
pub trait KeyMapper<T> {
    /// Index domain produced by the mapper
    type Index: Index;

    /// Returns the index that `value` is stored at
    fn key(&self, value: &T) -> Self::Index;
}

/// Stores integral values at their own index
#[derive(Default, Debug, Clone, Copy)]
pub struct DirectKey;

impl<T: Index> KeyMapper<T> for DirectKey {
    type Index = T;

    #[inline]
    fn key(&self, value: &T) -> T {
        *value
    }
}

/// Stores values at the `u64` hash produced by the build hasher `S`
#[derive(Default, Clone)]
pub struct HashKey<S = hashbrown::hash_map::DefaultHashBuilder> {
    hasher: S,
}

impl<S: BuildHasher> HashKey<S> {
    /// Creates a mapper hashing with the given build hasher
    pub fn with_hasher(hasher: S) -> Self {
        Self { hasher }
    }

    /// Returns the build hasher of the mapper
    pub fn hasher(&self) -> &S {
        &self.hasher
    }
}

impl<T: Hash, S: BuildHasher> KeyMapper<T> for HashKey<S> {
    type Index = u64;

    #[inline]
    fn key(&self, value: &T) -> u64 {
        self.hasher.hash_one(value)
    }
}

impl<S> fmt::Debug for HashKey<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashKey").finish_non_exhaustive()
    }
}
