use core::fmt::Debug;

/// Incremental AVG aggregation
#[cfg(feature = "avg")]
pub mod avg;
/// Incremental MAX aggregation
#[cfg(feature = "max")]
pub mod max;
/// Incremental MIN aggregation
#[cfg(feature = "min")]
pub mod min;
/// Incremental SUM aggregation
#[cfg(feature = "sum")]
pub mod sum;

/// Aggregation interface that a [Tree](crate::Tree) is parameterised by
///
/// dyseg provides a few pre-defined aggregator implementations:
/// - [sum]
/// - [min]
/// - [max]
/// - [avg]
///
/// [combine](Aggregator::combine) must be associative. It does not need to be
/// commutative: the tree always combines values in ascending index order.
/// [IDENTITY](Aggregator::IDENTITY) must be a neutral element of `combine`, since
/// every empty region of the tree aggregates to it.
///
/// # Example
///
/// Here is a non-commutative aggregator keeping the value at the highest index.
/// ```
/// use dyseg_core::{Aggregator, Tree};
///
/// #[derive(Default, Debug, Clone)]
/// struct Last;
///
/// impl Aggregator for Last {
///     const IDENTITY: Self::PartialAggregate = None;
///     type Input = u32;
///     type PartialAggregate = Option<u32>;
///     type Aggregate = Option<u32>;
///
///     fn lift(input: Self::Input) -> Self::PartialAggregate {
///         Some(input)
///     }
///     fn combine(a: Self::PartialAggregate, b: Self::PartialAggregate) -> Self::PartialAggregate {
///         b.or(a)
///     }
///     fn lower(a: Self::PartialAggregate) -> Self::Aggregate {
///         a
///     }
/// }
///
/// let mut tree: Tree<u16, Last> = Tree::new();
/// tree.insert(7, 70);
/// tree.insert(2, 20);
/// assert_eq!(tree.query(0..=5), Some(20));
/// assert_eq!(tree.total(), Some(70));
/// ```
pub trait Aggregator: Default + Debug + Clone + 'static {
    /// Identity value for [Self::PartialAggregate].
    ///
    /// For example, for SUM types the identity value should be set to 0.
    const IDENTITY: Self::PartialAggregate;

    /// Aggregator Input type that is lifted into a [Self::PartialAggregate] on insertion.
    type Input: InputBounds;

    /// Partial Aggregate type stored in every node of the tree.
    type PartialAggregate: PartialAggregateType;

    /// Final Aggregate type that can be lowered from a [Self::PartialAggregate].
    ///
    /// In many cases the [Self::PartialAggregate] type will be the same as [Self::Aggregate].
    /// An instance where it is not is an AVG function where the partial aggregate consists of a (sum, count)
    /// pair and the final aggregate "average" is calculated through sum/count.
    type Aggregate: Debug + Send;

    /// Lifts [Self::Input] into a [Self::PartialAggregate]
    fn lift(input: Self::Input) -> Self::PartialAggregate;

    /// Combine two partial aggregates and produces a new [Self::PartialAggregate].
    fn combine(a: Self::PartialAggregate, b: Self::PartialAggregate) -> Self::PartialAggregate;

    /// Lowers a [Self::PartialAggregate] into a final [Self::Aggregate].
    fn lower(a: Self::PartialAggregate) -> Self::Aggregate;

    /// Returns ``true`` if [Self::IDENTITY] is neutral for `value` on both sides
    #[inline]
    fn identity_holds(value: Self::PartialAggregate) -> bool {
        Self::combine(Self::IDENTITY, value) == value && Self::combine(value, Self::IDENTITY) == value
    }
}

/// Bounds for Aggregator Input
pub trait InputBounds: Debug + Clone + Send {}
impl<T> InputBounds for T where T: Debug + Clone + Send {}

/// Trait bounds for a partial aggregate type
///
/// `Default` is deliberately absent: empty regions use [Aggregator::IDENTITY].
pub trait PartialAggregateBounds: Debug + Clone + Copy + PartialEq + Send + Sync {}
impl<T> PartialAggregateBounds for T where T: Debug + Clone + Copy + PartialEq + Send + Sync {}

/// A partial aggregate type
pub trait PartialAggregateType: PartialAggregateBounds {}

macro_rules! primitive_partial {
    ($type:ty) => {
        impl PartialAggregateType for $type {}
    };
}

primitive_partial!(u8);
primitive_partial!(u16);
primitive_partial!(u32);
primitive_partial!(u64);
primitive_partial!(usize);
primitive_partial!(i8);
primitive_partial!(i16);
primitive_partial!(i32);
primitive_partial!(i64);
primitive_partial!(isize);
primitive_partial!(f32);
primitive_partial!(f64);
primitive_partial!(i128);
primitive_partial!(u128);
primitive_partial!(bool);
primitive_partial!(char);

impl<T: PartialAggregateType> PartialAggregateType for Option<T> {}

macro_rules! tuple_partial {
    ( $( $name:ident )+ ) => {
        impl<$($name: PartialAggregateType),+> PartialAggregateType for ($($name,)+)
        {
        }
    };
}

tuple_partial!(A B);
tuple_partial!(A B C);
tuple_partial!(A B C D);
