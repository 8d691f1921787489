//! dyseg-core contains the sparse segment tree and its building blocks.
//!
//! A [Tree] aggregates values over an integer index domain using an [Aggregator],
//! materializing nodes only for indices that have been inserted. Internal nodes
//! cover dyadic ranges of one implicit, unbounded segment tree, so indices may be
//! arbitrarily far apart (including negative indices) at O(k) memory for k entries.
//!
//! ```
//! use dyseg_core::{Tree, aggregator::sum::I64SumAggregator};
//!
//! let mut tree: Tree<i64, I64SumAggregator> = Tree::new();
//! tree.insert(-3, -3);
//! tree.insert(100, 100);
//! assert_eq!(tree.query(-100..=100), 97);
//! ```
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]
#![forbid(unsafe_code)]

extern crate alloc;

mod macros;

/// Aggregation interface and built-in aggregators
pub mod aggregator;
/// Errors returned by the strict entry points
pub mod error;
/// Index domains supported by the tree
pub mod index;
/// Set-like adapter over a [Tree]
pub mod set;
/// The sparse segment tree
pub mod tree;

pub use aggregator::Aggregator;
pub use error::Error;
pub use index::Index;
pub use set::{AggregateSet, DirectKey, HashKey, HashedAggregateSet, KeyMapper};
pub use tree::{Iter, SharedTree, Tree, TreeConf, TreeRef, TreeRefMut};

#[cfg(feature = "profiler")]
pub use tree::Stats;
