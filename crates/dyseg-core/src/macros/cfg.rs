/// Items only compiled with the `profiler` feature
#[macro_export]
#[doc(hidden)]
macro_rules! cfg_profiler {
    ($($item:item)*) => {
        $(
            #[cfg(feature = "profiler")]
            $item
        )*
    }
}

/// Items for the thread-safe [SharedTree](crate::SharedTree) backend
#[macro_export]
#[doc(hidden)]
macro_rules! cfg_sync {
    ($($item:item)*) => {
        $(
            #[cfg(feature = "sync")]
            $item
        )*
    }
}

/// Items for the single-threaded [SharedTree](crate::SharedTree) backend
#[macro_export]
#[doc(hidden)]
macro_rules! cfg_not_sync {
    ($($item:item)*) => {
        $(
            #[cfg(not(feature = "sync"))]
            $item
        )*
    }
}
