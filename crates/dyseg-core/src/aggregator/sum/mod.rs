use super::super::Aggregator;

macro_rules! sum_impl {
    ($struct:tt, $type:ty, $pa:tt) => {
        #[derive(Default, Debug, Clone, Copy)]
        #[allow(missing_docs)]
        pub struct $struct;

        impl Aggregator for $struct {
            const IDENTITY: Self::PartialAggregate = 0 as $pa;

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
                a + b
            }

            #[inline]
            fn lower(a: Self::PartialAggregate) -> Self::Aggregate {
                a.into()
            }
        }
    };
}

sum_impl!(U16SumAggregator, u16, u16);
sum_impl!(U32SumAggregator, u32, u32);
sum_impl!(U64SumAggregator, u64, u64);
sum_impl!(I16SumAggregator, i16, i16);
sum_impl!(I32SumAggregator, i32, i32);
sum_impl!(I64SumAggregator, i64, i64);
sum_impl!(F32SumAggregator, f32, f32);
sum_impl!(F64SumAggregator, f64, f64);
