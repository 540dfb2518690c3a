use std::cmp::Ordering as CmpOrdering;
use std::fmt;
use std::marker::PhantomData;
use std::ptr;
use std::sync::atomic::{AtomicBool, AtomicPtr, AtomicUsize, Ordering};

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::error::{Error, Operation, Result};
use crate::guard::Guard;
use crate::retry::RetryPolicy;

type NodePtr = *mut ListNode;

// =============================================================================
// LIST INVARIANTS
// =============================================================================
//
// ┌──────┐    ┌──────┐    ┌──────┐    ┌──────┐
// │ HEAD │───►│  3   │───►│  5   │───►│  7   │───► null
// │(sent)│    │      │    │      │    │      │
// └──────┘    └──────┘    └──────┘    └──────┘
//
// 1. Values reachable from HEAD are strictly increasing.
// 2. HEAD is never locked for deletion, never marked, never unlinked.
// 3. `node.next` is written only while the node's own lock is held.
// 4. `node.deleted` is set once, under the node's own lock, and never reset.
// 5. A marked node is never reachable again once its unlink is published.
//
// =============================================================================
// INSERT (one lock)
// =============================================================================
//
//   scan:      pred(3) ──────► curr(7)            value = 5
//   lock:      pred
//   validate:  pred.next == curr && !pred.deleted, otherwise unlock and rescan
//   publish:   pred(3) ──────► new(5) ──────► curr(7)
//
// =============================================================================
// DELETE (two locks, later node first)
// =============================================================================
//
//   scan:      pred(3) ──────► curr(5) ──────► next(7)      value = 5
//   lock:      curr, then pred
//   validate:  !curr.deleted, pred.next == curr && !pred.deleted
//   mark:      curr.deleted = true
//   unlink:    pred(3) ───────────────────────► next(7)
//                              curr(5) ──────► next(7)   (readers may still be here)
//   reclaim:   curr is handed to the guard after both locks are released
//
// Every two-lock acquisition goes from the later node to the earlier one and
// insert holds a single lock, so waits always point towards HEAD and cannot
// form a cycle.
//
struct ListNode {
    value: i64,
    next: AtomicPtr<ListNode>,
    lock: Mutex<()>,
    deleted: AtomicBool,
}

impl ListNode {
    fn new(value: i64, next: NodePtr) -> Self {
        ListNode {
            value,
            next: AtomicPtr::new(next),
            lock: Mutex::new(()),
            deleted: AtomicBool::new(false),
        }
    }

    // The sentinel's value is never compared: traversal starts at HEAD and
    // only inspects its successors.
    fn new_sentinel() -> Self {
        Self::new(i64::MIN, ptr::null_mut())
    }

    /// Load next pointer (Acquire ordering)
    #[inline]
    fn get_next(&self) -> NodePtr {
        self.next.load(Ordering::Acquire)
    }

    /// Store next pointer (Release ordering). Caller holds `self.lock`.
    #[inline]
    fn set_next(&self, ptr: NodePtr) {
        self.next.store(ptr, Ordering::Release)
    }

    #[inline]
    fn is_deleted(&self) -> bool {
        self.deleted.load(Ordering::Acquire)
    }

    /// Caller holds `self.lock`.
    #[inline]
    fn mark_deleted(&self) {
        self.deleted.store(true, Ordering::Release)
    }

    /// # Safety
    /// `ptr` was allocated with `Box::new`, is unreachable and is freed once.
    unsafe fn dealloc_ptr(ptr: NodePtr) {
        drop(unsafe { Box::from_raw(ptr) });
    }
}

// Result of a lock-free scan: `pred.value < target <= curr.value`,
// `curr` is null when the scan ran off the end.
#[derive(Debug, Copy, Clone)]
struct Window {
    pred: NodePtr,
    curr: NodePtr,
}

/// Concurrent sorted set of `i64` built on a singly linked list with one lock
/// per node. Readers never lock; writers lock at most two adjacent nodes and
/// validate what they scanned before mutating.
///
/// `len()` is maintained inside the writers' critical sections but read
/// without a lock, so it may briefly disagree with a concurrent `range`.
///
/// The reclamation backend is always chosen explicitly. Long-lived lists
/// want `lockstep_crossbeam::EpochCoupledList`; `DeferredGuard` keeps every
/// removed node until the list is dropped.
///
/// ```compile_fail
/// let list: lockstep_core::CoupledList = lockstep_core::CoupledList::new();
/// ```
///
pub struct CoupledList<G: Guard> {
    head: NodePtr,
    len: AtomicUsize,
    policy: RetryPolicy,
    /// Receives every unlinked node for deferred destruction.
    guard: G,
}

impl<G: Guard> CoupledList<G> {
    pub fn new() -> Self {
        Self::with_policy(RetryPolicy::default())
    }

    /// Create an empty list whose mutators follow `policy`.
    pub fn with_policy(policy: RetryPolicy) -> Self {
        let head = Box::into_raw(Box::new(ListNode::new_sentinel()));
        CoupledList {
            head,
            len: AtomicUsize::new(0),
            policy,
            guard: G::default(),
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Get the shared guard instance for this list.
    pub fn guard(&self) -> &G {
        &self.guard
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Lock-free walk to the window around `value`.
    ///
    /// # Safety
    /// The caller holds a `G::ReadGuard` for as long as it uses the result.
    unsafe fn locate(&self, value: i64) -> Window {
        let mut pred = self.head;
        let mut curr = unsafe { (*pred).get_next() };

        while let Some(node) = unsafe { curr.as_ref() } {
            if node.value >= value {
                break;
            }
            pred = curr;
            curr = node.get_next();
        }

        Window { pred, curr }
    }

    /// First node after HEAD that is not marked deleted.
    ///
    /// # Safety
    /// Same contract as [`Self::locate`].
    unsafe fn first_live(&self) -> NodePtr {
        unsafe { skip_deleted((*self.head).get_next()) }
    }

    // =========================================================================
    // Mutators
    // =========================================================================

    /// Insert `value`.
    ///
    /// Returns `true` if the value was inserted, `false` if it already exists.
    /// Follows the configured backoff but never gives up.
    pub fn insert(&self, value: i64) -> bool {
        match self.insert_internal(value, self.policy.without_limit()) {
            Ok(inserted) => inserted,
            Err(err) => unreachable!("unbounded insert returned {err}"),
        }
    }

    /// Insert `value`, giving up once the configured retry bound is spent.
    pub fn try_insert(&self, value: i64) -> Result<bool> {
        self.insert_internal(value, self.policy)
    }

    /// Delete `value`.
    ///
    /// Returns `true` if the value was removed, `false` if it was absent.
    /// Follows the configured backoff but never gives up.
    pub fn delete(&self, value: i64) -> bool {
        match self.delete_internal(value, self.policy.without_limit()) {
            Ok(deleted) => deleted,
            Err(err) => unreachable!("unbounded delete returned {err}"),
        }
    }

    /// Delete `value`, giving up once the configured retry bound is spent.
    pub fn try_delete(&self, value: i64) -> Result<bool> {
        self.delete_internal(value, self.policy)
    }

    fn insert_internal(&self, value: i64, policy: RetryPolicy) -> Result<bool> {
        let _read = G::pin();
        let mut retry = policy.start();

        loop {
            let Window { pred, curr } = unsafe { self.locate(value) };
            // Safety: pred is HEAD or a node reached under the read guard.
            let pred_node = unsafe { &*pred };

            let pred_lock = pred_node.lock.lock();
            if pred_node.get_next() != curr || pred_node.is_deleted() {
                drop(pred_lock);
                if !retry.retry() {
                    return Err(self.exhausted(Operation::Insert, value, retry.retries()));
                }
                trace!(
                    operation = %Operation::Insert,
                    %value,
                    retries = retry.retries(),
                    "validation failed"
                );
                continue;
            }

            if let Some(existing) = unsafe { curr.as_ref() } {
                if existing.value == value {
                    return Ok(false);
                }
            }

            let node = Box::into_raw(Box::new(ListNode::new(value, curr)));
            pred_node.set_next(node);
            self.len.fetch_add(1, Ordering::AcqRel);
            return Ok(true);
        }
    }

    fn delete_internal(&self, value: i64, policy: RetryPolicy) -> Result<bool> {
        let _read = G::pin();
        let mut retry = policy.start();

        loop {
            let Window { pred, curr } = unsafe { self.locate(value) };
            // Safety: both nodes were reached under the read guard.
            let Some(node) = (unsafe { curr.as_ref() }) else {
                return Ok(false);
            };
            let pred_node = unsafe { &*pred };

            // Later node first, see the DELETE diagram above.
            let node_lock = node.lock.lock();
            if node.is_deleted() {
                drop(node_lock);
                if !retry.retry() {
                    return Err(self.exhausted(Operation::Delete, value, retry.retries()));
                }
                trace!(
                    operation = %Operation::Delete,
                    %value,
                    retries = retry.retries(),
                    "target already removed"
                );
                continue;
            }

            let pred_lock = pred_node.lock.lock();
            if pred_node.get_next() != curr || pred_node.is_deleted() {
                drop(pred_lock);
                drop(node_lock);
                if !retry.retry() {
                    return Err(self.exhausted(Operation::Delete, value, retry.retries()));
                }
                trace!(
                    operation = %Operation::Delete,
                    %value,
                    retries = retry.retries(),
                    "validation failed"
                );
                continue;
            }

            if node.value != value {
                return Ok(false);
            }

            node.mark_deleted();
            pred_node.set_next(node.get_next());
            self.len.fetch_sub(1, Ordering::AcqRel);

            drop(pred_lock);
            drop(node_lock);

            // Safety: the node is marked, unlinked and unlocked, and only the
            // thread that marked it gets here.
            unsafe {
                self.guard.defer_destroy(curr, ListNode::dealloc_ptr);
            }
            return Ok(true);
        }
    }

    fn exhausted(&self, operation: Operation, value: i64, retries: u32) -> Error {
        debug!(%operation, %value, retries, "retry budget spent");
        Error::RetriesExhausted {
            operation,
            value,
            retries,
        }
    }

    // =========================================================================
    // Lock-free reads
    // =========================================================================

    /// Check if `value` is in the list.
    pub fn contains(&self, value: i64) -> bool {
        let _read = G::pin();
        let mut curr = unsafe { (*self.head).get_next() };

        while let Some(node) = unsafe { curr.as_ref() } {
            match node.value.cmp(&value) {
                CmpOrdering::Less => curr = node.get_next(),
                CmpOrdering::Equal => return !node.is_deleted(),
                CmpOrdering::Greater => return false,
            }
        }
        false
    }

    /// Visit values in ascending order until `visitor` returns `false`.
    ///
    /// Not a snapshot: concurrent writes may or may not be observed, but the
    /// visitor never sees a value twice or out of order.
    pub fn range<F>(&self, mut visitor: F)
    where
        F: FnMut(i64) -> bool,
    {
        for value in self.iter() {
            if !visitor(value) {
                break;
            }
        }
    }

    /// Approximate number of elements, exact whenever no writer is in flight.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        let _read = G::pin();
        unsafe { self.first_live().is_null() }
    }

    pub fn iter(&self) -> CoupledListIter<'_, G> {
        let read = G::pin();
        let first = unsafe { self.first_live() };
        CoupledListIter::new(read, first)
    }

    /// Iterate values `>= start`.
    pub fn iter_from(&self, start: i64) -> CoupledListIter<'_, G> {
        let read = G::pin();
        let Window { curr, .. } = unsafe { self.locate(start) };
        let first = unsafe { skip_deleted(curr) };
        CoupledListIter::new(read, first)
    }

    /// Collects all values into a Vec.
    pub fn to_vec(&self) -> Vec<i64> {
        self.iter().collect()
    }
}

/// Advance past nodes already marked deleted.
///
/// # Safety
/// `curr` is null or a node protected by the caller's read guard.
unsafe fn skip_deleted(mut curr: NodePtr) -> NodePtr {
    while let Some(node) = unsafe { curr.as_ref() } {
        if !node.is_deleted() {
            break;
        }
        curr = node.get_next();
    }
    curr
}

// ============================================================================
// Iterator Support
// ============================================================================

/// Ascending iterator over the values of a [`CoupledList`].
///
/// Holds a read guard until dropped, so every node it can reach stays valid.
/// Values are copied out; deleted nodes met on the way are skipped.
///
pub struct CoupledListIter<'a, G: Guard> {
    _read: G::ReadGuard,
    current: NodePtr,
    _list: PhantomData<&'a CoupledList<G>>,
}

impl<G: Guard> CoupledListIter<'_, G> {
    fn new(read: G::ReadGuard, first: NodePtr) -> Self {
        CoupledListIter {
            _read: read,
            current: first,
            _list: PhantomData,
        }
    }
}

impl<G: Guard> Iterator for CoupledListIter<'_, G> {
    type Item = i64;

    fn next(&mut self) -> Option<Self::Item> {
        // Safety: the iterator's read guard protects every reachable node.
        let node = unsafe { self.current.as_ref() }?;
        self.current = unsafe { skip_deleted(node.get_next()) };
        Some(node.value)
    }
}

impl<G: Guard> Default for CoupledList<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: Guard> FromIterator<i64> for CoupledList<G> {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        let list = Self::new();
        for value in iter {
            list.insert(value);
        }
        list
    }
}

impl<G: Guard> fmt::Debug for CoupledList<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

// Safety: all shared node state is atomic or behind the node lock, and
// unlinked nodes are reclaimed through `G`.
unsafe impl<G: Guard> Send for CoupledList<G> {}
unsafe impl<G: Guard> Sync for CoupledList<G> {}

impl<G: Guard> Drop for CoupledList<G> {
    fn drop(&mut self) {
        // Free HEAD and every node still reachable from it. Unlinked nodes
        // belong to the guard.
        let mut curr = self.head;
        let mut freed = 0usize;

        while !curr.is_null() {
            unsafe {
                let next = (*curr).get_next();
                debug_assert!(
                    !(*curr).is_deleted(),
                    "INVARIANT VIOLATION: reachable node {} is marked deleted at drop time",
                    (*curr).value
                );
                ListNode::dealloc_ptr(curr);
                curr = next;
            }
            freed += 1;
        }

        debug!(live = freed - 1, "dropped coupled list");
    }
}

// ============================================================================
// Tests - Unique to CoupledList
// ============================================================================
// Note: guard-generic tests live in common_tests and run from tests/
