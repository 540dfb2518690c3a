//! Crossbeam-based reclamation for lockstep collections.
//!
//! This crate provides `EpochGuard`, an implementation of the `Guard` trait
//! using crossbeam-epoch, and the production list alias built on it.
//!
//! # Usage
//!
//! ```rust
//! use lockstep_crossbeam::EpochCoupledList;
//!
//! let list = EpochCoupledList::new();
//! list.insert(42);
//! assert!(list.contains(42));
//! ```

pub mod epoch_guard;

pub use epoch_guard::EpochGuard;

/// Lock-coupled list whose removed nodes are reclaimed by crossbeam-epoch.
pub type EpochCoupledList = lockstep_core::CoupledList<EpochGuard>;
