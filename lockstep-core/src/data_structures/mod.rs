//! Data structures for concurrent collections.
//!
//! - [`coupled_list`] - Sorted set with per-node locks and lock-free reads

pub mod coupled_list;

pub use coupled_list::{CoupledList, CoupledListIter};
