//! Concurrent ordered integer set for read-heavy workloads.
//!
//! [`CoupledList`] is a sorted singly linked list with one lock per node:
//! `contains`, `range`, `iter` and `len` never lock, while `insert` and
//! `delete` lock the one or two nodes they touch and validate before
//! mutating. Memory of removed nodes is reclaimed through a [`Guard`].
//!
//! The guard is a type parameter with no default. For long-running use pick
//! `lockstep_crossbeam::EpochCoupledList`, which frees removed nodes once no
//! reader can reach them. [`DeferredGuard`] holds every removed node until the
//! list is dropped and is meant for tests and short-lived lists.
//!
//! # Usage
//!
//! ```rust,ignore
//! use lockstep_crossbeam::EpochCoupledList;
//!
//! let list = EpochCoupledList::new();
//! list.insert(42);
//! ```
//!
//! Within this crate, with the test guard:
//!
//! ```rust
//! use lockstep_core::{CoupledList, DeferredGuard};
//!
//! let list: CoupledList<DeferredGuard> = CoupledList::new();
//! assert!(list.insert(5));
//! assert!(list.insert(3));
//! assert!(!list.insert(5));
//!
//! let mut seen = Vec::new();
//! list.range(|v| {
//!     seen.push(v);
//!     true
//! });
//! assert_eq!(seen, vec![3, 5]);
//! assert_eq!(list.len(), 2);
//! ```

pub mod common_tests;
pub mod data_structures;
pub mod error;
pub mod guard;
pub mod retry;

pub use data_structures::{CoupledList, CoupledListIter};
pub use error::{Error, Operation, Result};
pub use guard::{DeferredGuard, Guard};
pub use retry::{Backoff, RetryPolicy};
