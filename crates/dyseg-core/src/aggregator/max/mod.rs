use super::super::Aggregator;

macro_rules! max_impl {
    ($struct:tt, $type:ty, $pa:tt) => {
        #[derive(Default, Debug, Clone, Copy)]
        #[allow(missing_docs)]
        pub struct $struct;

        impl Aggregator for $struct {
            const IDENTITY: Self::PartialAggregate = <$type>::MIN;
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
                <$type>::max(a, b)
            }

            #[inline]
            fn lower(a: Self::PartialAggregate) -> Self::Aggregate {
                a
            }
        }
    };
}

max_impl!(U16MaxAggregator, u16, u16);
max_impl!(U32MaxAggregator, u32, u32);
max_impl!(U64MaxAggregator, u64, u64);
max_impl!(I16MaxAggregator, i16, i16);
max_impl!(I32MaxAggregator, i32, i32);
max_impl!(I64MaxAggregator, i64, i64);
max_impl!(F32MaxAggregator, f32, f32);
max_impl!(F64MaxAggregator, f64, f64);
