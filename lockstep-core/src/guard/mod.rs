//! Guard trait for memory reclamation strategies.
//!
//! Readers walk the list without taking any lock, so a node unlinked by a
//! concurrent delete may still be in a reader's hands. The `Guard` trait
//! decides when such a node may actually be freed.
//!
//! ```text
//! CoupledList<G: Guard>
//!     │
//!     ├── CoupledList<EpochGuard>      (production, lockstep-crossbeam)
//!     └── CoupledList<DeferredGuard>   (testing)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use lockstep_core::{CoupledList, DeferredGuard};
//! use lockstep_crossbeam::EpochGuard;
//!
//! // Production: epoch-based reclamation
//! let list: CoupledList<EpochGuard> = CoupledList::new();
//! list.insert(42);
//!
//! // Testing: every unlinked node lives until the list is dropped
//! let test_list: CoupledList<DeferredGuard> = CoupledList::new();
//! ```

mod deferred_guard;

pub use deferred_guard::DeferredGuard;

/// A memory reclamation guard that protects concurrent access to nodes.
///
/// # Safety Contract
///
/// Implementations must ensure that a node passed to `defer_destroy` is not
/// freed while any `ReadGuard` pinned before the call is still alive.
///
/// # Design Note
///
/// The guard stored inside a list only schedules destruction. Protection of
/// readers happens per operation through `pin()`, so storing a guard does
/// not make the list `!Send` or `!Sync`.
///
pub trait Guard: Sized + Default + Send + Sync {
    /// An active guard that protects reads for its lifetime.
    ///
    /// For epoch-based guards this is a pinned `crossbeam_epoch::Guard`.
    /// For deferred guards it is `()`, since nothing is freed before the
    /// owning list is dropped.
    ///
    type ReadGuard: Sized;

    /// Pin an active read guard.
    fn pin() -> Self::ReadGuard;

    /// Schedule a node for deferred destruction.
    ///
    /// # Safety
    ///
    /// - `node` must be a valid pointer previously allocated by the list
    /// - `node` must be unlinked (not reachable by a new traversal)
    /// - `node` must not be deferred more than once
    /// - `dealloc` must be the correct deallocation function for `node`
    ///
    unsafe fn defer_destroy<N>(&self, node: *mut N, dealloc: unsafe fn(*mut N));
}
