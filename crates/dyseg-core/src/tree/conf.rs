/// Configuration for a [Tree](crate::Tree)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TreeConf {
    /// Number of node slots to pre-allocate
    pub capacity: usize,
}

impl TreeConf {
    /// Pre-allocates room for `capacity` nodes
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Pre-allocates room for a tree holding `entries` indices
    ///
    /// A tree with k entries materializes at most `2k - 1` nodes.
    pub fn with_entries(mut self, entries: usize) -> Self {
        self.capacity = entries.saturating_mul(2).saturating_sub(1);
        self
    }
}
