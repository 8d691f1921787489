use core::fmt::Debug;

/// An integer type usable as the index domain of a [Tree](crate::Tree)
///
/// Indices are mapped order-preservingly onto unsigned *positions* `index - MIN`.
/// All range arithmetic inside the tree happens on positions held in a `u128`, which
/// leaves headroom for the widest ranges of any 64-bit domain.
pub trait Index: Copy + Ord + Debug + Send + Sync + 'static {
    /// Smallest index of the domain
    const MIN: Self;
    /// Largest index of the domain
    const MAX: Self;

    /// Returns the position of this index, `self - Self::MIN`
    fn into_position(self) -> u128;

    /// Inverse of [Index::into_position]
    ///
    /// Only called with positions obtained from [Index::into_position].
    fn from_position(position: u128) -> Self;
}

macro_rules! unsigned_index {
    ($($type:ty),*) => {
        $(
            impl Index for $type {
                const MIN: Self = <$type>::MIN;
                const MAX: Self = <$type>::MAX;

                #[inline]
                fn into_position(self) -> u128 {
                    self as u128
                }
                #[inline]
                fn from_position(position: u128) -> Self {
                    position as $type
                }
            }
        )*
    };
}

macro_rules! signed_index {
    ($($type:ty),*) => {
        $(
            impl Index for $type {
                const MIN: Self = <$type>::MIN;
                const MAX: Self = <$type>::MAX;

                #[inline]
                fn into_position(self) -> u128 {
                    (self as i128 - <$type>::MIN as i128) as u128
                }
                #[inline]
                fn from_position(position: u128) -> Self {
                    (position as i128 + <$type>::MIN as i128) as $type
                }
            }
        )*
    };
}

unsigned_index!(u8, u16, u32, u64, usize);
signed_index!(i8, i16, i32, i64, isize);
