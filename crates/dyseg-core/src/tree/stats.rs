use core::fmt;
use dyseg_stats::Sketch;

/// Latency sketches of a [Tree](crate::Tree)
#[derive(Clone, Default)]
pub struct Stats {
    /// A sketch for recording latencies of inserts (including `apply`)
    pub insert: Sketch,
    /// A sketch for recording latencies of removals
    pub remove: Sketch,
    /// A sketch for recording latencies of range queries
    pub query: Sketch,
}

impl fmt::Debug for Stats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Tree Stats")
            .field("insert", &self.insert.percentiles())
            .field("remove", &self.remove.percentiles())
            .field("query", &self.query.percentiles())
            .finish()
    }
}
