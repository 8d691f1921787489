use super::{super::Aggregator, PartialAggregateType};

/// Running (sum, count) pair used as the partial aggregate for AVG
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvgState {
    /// Sum of all lifted inputs
    pub sum: f64,
    /// Number of lifted inputs
    pub count: u64,
}

impl AvgState {
    /// The empty state
    pub const EMPTY: Self = Self { sum: 0.0, count: 0 };

    /// Returns the average or `None` if the state holds no inputs
    #[inline]
    pub fn average(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

impl PartialAggregateType for AvgState {}

macro_rules! avg_impl {
    ($struct:tt, $type:ty) => {
        #[derive(Default, Debug, Clone, Copy)]
        #[allow(missing_docs)]
        pub struct $struct;

        impl Aggregator for $struct {
            const IDENTITY: Self::PartialAggregate = AvgState::EMPTY;

            type Input = $type;
            type Aggregate = Option<f64>;
            type PartialAggregate = AvgState;

            #[inline]
            fn lift(input: Self::Input) -> Self::PartialAggregate {
                AvgState {
                    sum: input as f64,
                    count: 1,
                }
            }

            #[inline]
            fn combine(
                a: Self::PartialAggregate,
                b: Self::PartialAggregate,
            ) -> Self::PartialAggregate {
                AvgState {
                    sum: a.sum + b.sum,
                    count: a.count + b.count,
                }
            }

            #[inline]
            fn lower(a: Self::PartialAggregate) -> Self::Aggregate {
                a.average()
            }
        }
    };
}

avg_impl!(I64AvgAggregator, i64);
avg_impl!(U64AvgAggregator, u64);
avg_impl!(F64AvgAggregator, f64);
