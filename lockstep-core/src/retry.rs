//! Retry configuration for the optimistic mutators.
//!
//! Insert and delete scan without locks, lock the nodes they found, and
//! re-validate. A failed validation round is a *retry*. `RetryPolicy`
//! decides how long a mutator waits between rounds and how many rounds a
//! bounded operation may spend before it gives up.

use std::thread;

/// What a mutator does between two validation rounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backoff {
    /// Restart the scan immediately.
    #[default]
    None,
    /// Exponential spinning that escalates to yielding once the spin budget
    /// is spent (`crossbeam::utils::Backoff::snooze`).
    Spin,
    /// Yield the thread to the scheduler.
    Yield,
}

/// Retry bound and backoff applied by [`CoupledList`](crate::CoupledList) mutators.
///
/// # Example
///
/// ```rust
/// use lockstep_core::{Backoff, CoupledList, DeferredGuard, RetryPolicy};
///
/// let policy = RetryPolicy::bounded(64).with_backoff(Backoff::Spin);
/// let list: CoupledList<DeferredGuard> = CoupledList::with_policy(policy);
///
/// assert_eq!(list.try_insert(3), Ok(true));
/// assert_eq!(list.policy().max_retries(), Some(64));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: Option<u32>,
    backoff: Backoff,
}

impl RetryPolicy {
    /// Retry forever, without backoff.
    pub const fn unbounded() -> Self {
        RetryPolicy {
            max_retries: None,
            backoff: Backoff::None,
        }
    }

    /// Allow at most `max_retries` failed validation rounds after the first
    /// attempt. `bounded(0)` gives up on the first failed validation.
    pub const fn bounded(max_retries: u32) -> Self {
        RetryPolicy {
            max_retries: Some(max_retries),
            backoff: Backoff::None,
        }
    }

    pub const fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub const fn max_retries(&self) -> Option<u32> {
        self.max_retries
    }

    pub const fn backoff(&self) -> Backoff {
        self.backoff
    }

    /// Same backoff, no bound.
    pub(crate) const fn without_limit(mut self) -> Self {
        self.max_retries = None;
        self
    }

    pub(crate) fn start(&self) -> RetryState {
        RetryState {
            policy: *self,
            retries: 0,
            spinner: crossbeam::utils::Backoff::new(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Per-operation retry bookkeeping.
pub(crate) struct RetryState {
    policy: RetryPolicy,
    retries: u32,
    spinner: crossbeam::utils::Backoff,
}

impl RetryState {
    /// Records a failed validation round and backs off.
    ///
    /// Returns `false` without backing off once the bound is spent; the
    /// caller must then give up.
    pub(crate) fn retry(&mut self) -> bool {
        if self.policy.max_retries == Some(self.retries) {
            return false;
        }
        self.retries = self.retries.saturating_add(1);

        match self.policy.backoff {
            Backoff::None => {}
            Backoff::Spin => self.spinner.snooze(),
            Backoff::Yield => thread::yield_now(),
        }
        true
    }

    pub(crate) fn retries(&self) -> u32 {
        self.retries
    }
}
