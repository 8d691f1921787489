use super::super::Aggregator;

macro_rules! min_impl {
    ($struct:tt, $type:ty, $pa:tt) => {
        #[derive(Default, Debug, Clone, Copy)]
        #[allow(missing_docs)]
        pub struct $struct;

        impl Aggregator for $struct {
            const IDENTITY: Self::PartialAggregate = <$type>::MAX;
            type Input = $type;
            type Aggregate = $type;
            type PartialAggregate = $pa;

            #[inline]
            fn lift(input: Self::Input) -> Self::PartialAggregate {
                input.into()
            }

            #[inline]
            fn combine(
                a: Self::PartialAggregate,
                b: Self::PartialAggregate,
            ) -> Self::PartialAggregate {
                <$type>::min(a, b)
            }

            #[inline]
            fn lower(a: Self::PartialAggregate) -> Self::Aggregate {
                a
            }
        }
    };
}

min_impl!(U16MinAggregator, u16, u16);
min_impl!(U32MinAggregator, u32, u32);
min_impl!(U64MinAggregator, u64, u64);
min_impl!(I16MinAggregator, i16, i16);
min_impl!(I32MinAggregator, i32, i32);
min_impl!(I64MinAggregator, i64, i64);
min_impl!(F32MinAggregator, f32, f32);
min_impl!(F64MinAggregator, f64, f64);
