//! dyseg is a sparse segment tree whose nodes are materialized on demand.
//!
//! A [Tree] maps integer indices (signed or unsigned, up to 64 bits) to values and
//! answers range aggregation queries with any associative [Aggregator]. Only inserted
//! indices and the internal nodes joining them are stored, so the memory footprint
//! depends on the number of entries rather than on the span of the index domain.
//!
//! ## Feature Flags
//! - `std` (_enabled by default_)
//!     - Enables features that rely on the standard library
//! - `sum` (_enabled by default_)
//!     - Enables sum aggregation
//! - `avg` (_enabled by default_)
//!     - Enables avg aggregation
//! - `min` (_enabled by default_)
//!     - Enables min aggregation
//! - `max` (_enabled by default_)
//!     - Enables max aggregation
//! - `sync` (_implicitly enables_ `std`)
//!     - Backs [SharedTree] with a read-write lock so it can be shared across threads
//! - `profiler` (_implicitly enables_ `std`)
//!     - Records latency sketches of tree operations
//!
//! ## Example
//!
//! ```
//! use dyseg::{aggregator::sum::I64SumAggregator, Tree};
//!
//! let mut tree: Tree<i64, I64SumAggregator> = Tree::new();
//! tree.insert(-3, -3);
//! tree.insert(1 << 40, 100);
//! tree.apply(-3, 10);
//!
//! assert_eq!(tree.query(..0), 7);
//! assert_eq!(tree.query(-5..=(1 << 40)), 107);
//! assert_eq!(tree.node_count(), 3);
//! ```
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]
#![forbid(unsafe_code)]

#[doc(inline)]
pub use dyseg_core::*;

#[cfg(feature = "stats")]
#[doc(inline)]
pub use dyseg_stats as stats;
