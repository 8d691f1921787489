//! Latency sketches used by the `profiler` feature of dyseg.
//!
//! A [Sketch] is a cheaply cloneable handle to a shared [DDSketch]. The
//! [profile_scope] macro records the time spent until the end of the enclosing
//! scope into a sketch.
#![deny(missing_docs)]

use minstant::Instant;
use parking_lot::Mutex;
use sketches_ddsketch::{Config, DDSketch};
use std::sync::Arc;

/// Records the latency of the enclosing scope into the given [Sketch]
///
/// ```
/// use dyseg_stats::{profile_scope, Sketch};
///
/// let sketch = Sketch::default();
/// {
///     profile_scope!(&sketch);
/// }
/// assert_eq!(sketch.percentiles().count(), 1);
/// ```
#[macro_export]
macro_rules! profile_scope {
    ($sketch:expr) => {
        let _measure = $crate::Measure::new($sketch);
    };
}

/// Extracts [Percentiles] from a [DDSketch]
pub fn sketch_percentiles(sketch: &DDSketch) -> Percentiles {
    let quantile = |q: f64| sketch.quantile(q).ok().flatten().unwrap_or(0.0);
    Percentiles {
        count: sketch.count(),
        min: sketch.min().unwrap_or(0.0),
        p50: quantile(0.5),
        p99: quantile(0.99),
        p99_9: quantile(0.999),
        p99_99: quantile(0.9999),
        p99_999: quantile(0.99999),
        max: sketch.max().unwrap_or(0.0),
    }
}

/// Latency percentiles in nanoseconds
#[derive(Default, Clone, Copy)]
pub struct Percentiles {
    count: usize,
    min: f64,
    p50: f64,
    p99: f64,
    p99_9: f64,
    p99_99: f64,
    p99_999: f64,
    max: f64,
}

impl Percentiles {
    /// Number of recorded samples
    pub fn count(&self) -> usize {
        self.count
    }
    /// Smallest recorded sample
    pub fn min(&self) -> f64 {
        self.min
    }
    /// Median
    pub fn p50(&self) -> f64 {
        self.p50
    }
    /// 99th percentile
    pub fn p99(&self) -> f64 {
        self.p99
    }
    /// 99.9th percentile
    pub fn p99_9(&self) -> f64 {
        self.p99_9
    }
    /// 99.99th percentile
    pub fn p99_99(&self) -> f64 {
        self.p99_99
    }
    /// 99.999th percentile
    pub fn p99_999(&self) -> f64 {
        self.p99_999
    }
    /// Largest recorded sample
    pub fn max(&self) -> f64 {
        self.max
    }
}

impl std::fmt::Debug for Percentiles {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Percentiles")
            .field("count", &self.count)
            .field("min", &format_args!("{:.2}ns", self.min))
            .field("p50", &format_args!("{:.2}ns", self.p50))
            .field("p99", &format_args!("{:.2}ns", self.p99))
            .field("p99.9", &format_args!("{:.2}ns", self.p99_9))
            .field("p99.99", &format_args!("{:.2}ns", self.p99_99))
            .field("p99.999", &format_args!("{:.2}ns", self.p99_999))
            .field("max", &format_args!("{:.2}ns", self.max))
            .finish()
    }
}

/// A shared latency sketch
///
/// Clones point at the same underlying [DDSketch]. The sketch sits behind a mutex so
/// that a profiled tree can still be moved between threads.
#[derive(Clone)]
pub struct Sketch {
    inner: Arc<Mutex<DDSketch>>,
}

impl Default for Sketch {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(DDSketch::new(Config::new(0.01, 2048, 1.0e-9)))),
        }
    }
}

impl Sketch {
    /// Adds a sample (in nanoseconds)
    #[inline]
    pub fn add(&self, data: f64) {
        self.inner.lock().add(data)
    }
    /// Returns the current percentiles of the sketch
    pub fn percentiles(&self) -> Percentiles {
        sketch_percentiles(&self.inner.lock())
    }
}

impl std::fmt::Debug for Sketch {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.percentiles(), f)
    }
}

// Inspired by https://github.com/spacejam/sled/blob/main/src/metrics.rs
/// A scope guard that records its lifetime into a [Sketch] when dropped
pub struct Measure {
    start: Instant,
    sketch: Sketch,
}

impl Measure {
    /// Starts a new measurement
    #[inline]
    pub fn new(sketch: &Sketch) -> Measure {
        Measure {
            sketch: sketch.clone(), // clones Arc
            start: Instant::now(),
        }
    }
}

impl Drop for Measure {
    #[inline]
    fn drop(&mut self) {
        self.sketch.add(self.start.elapsed().as_nanos() as f64);
    }
}
