//! Deferred guard implementation for testing.
//!
//! `DeferredGuard` keeps every unlinked node alive until the guard itself is
//! dropped, which happens when the owning list is dropped.

#[cfg(debug_assertions)]
use std::collections::HashSet;

use parking_lot::Mutex;

use super::Guard;

/// A simple guard that defers all node destruction until the guard is dropped.
///
/// Useful for tests where destruction timing must be predictable. Memory
/// grows with every delete, so it is not meant for long-running processes.
///
pub struct DeferredGuard {
    deferred: Mutex<Vec<DeferredNode>>,
    #[cfg(debug_assertions)]
    seen: Mutex<HashSet<usize>>,
}

struct DeferredNode {
    ptr: *mut (),
    dealloc: unsafe fn(*mut ()),
}

// Safety: the pointer is only dereferenced by `dealloc` when the guard drops,
// and the vector holding it is behind a mutex.
unsafe impl Send for DeferredNode {}

impl DeferredGuard {
    pub fn new() -> Self {
        DeferredGuard {
            deferred: Mutex::new(Vec::new()),
            #[cfg(debug_assertions)]
            seen: Mutex::new(HashSet::new()),
        }
    }

    /// Number of nodes waiting for destruction.
    pub fn pending(&self) -> usize {
        self.deferred.lock().len()
    }
}

impl Default for DeferredGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DeferredGuard {
    fn drop(&mut self) {
        for node in self.deferred.get_mut().drain(..) {
            unsafe {
                (node.dealloc)(node.ptr);
            }
        }
    }
}

impl Guard for DeferredGuard {
    /// Nothing is freed before the guard drops, so reads need no pinning.
    type ReadGuard = ();

    fn pin() -> Self::ReadGuard {}

    unsafe fn defer_destroy<N>(&self, node: *mut N, dealloc: unsafe fn(*mut N)) {
        #[cfg(debug_assertions)]
        {
            let fresh = self.seen.lock().insert(node as usize);
            assert!(fresh, "node {:p} deferred twice", node);
        }

        // Safety: `*mut N` and `*mut ()` have the same layout, and the
        // function is only ever called with the pointer it was paired with.
        let dealloc =
            unsafe { std::mem::transmute::<unsafe fn(*mut N), unsafe fn(*mut ())>(dealloc) };
        self.deferred.lock().push(DeferredNode {
            ptr: node.cast(),
            dealloc,
        });
    }
}
