use rstest::rstest;
use serial_test::serial;

use lockstep_core::common_tests::coupled_list_core_tests::*;
use lockstep_core::common_tests::coupled_list_stress_tests::*;
use lockstep_core::common_tests::init_tracing;
use lockstep_core::{Backoff, DeferredGuard, Guard, RetryPolicy};
use lockstep_crossbeam::{EpochCoupledList, EpochGuard};

// Marker types so each case can name its guard at the type level
trait TestGuard {
    type GuardType: Guard + 'static;
}

struct UseEpochGuard;
struct UseDeferredGuard;

impl TestGuard for UseEpochGuard {
    type GuardType = EpochGuard;
}

impl TestGuard for UseDeferredGuard {
    type GuardType = DeferredGuard;
}

#[rstest]
#[case::epoch(UseEpochGuard)]
#[case::deferred(UseDeferredGuard)]
fn test_basic<T: TestGuard>(#[case] _guard: T) {
    init_tracing();
    test_basic_operations::<T::GuardType>();
}

#[rstest]
#[case::epoch(UseEpochGuard)]
#[case::deferred(UseDeferredGuard)]
fn test_scenarios<T: TestGuard>(#[case] _guard: T) {
    test_insert_out_of_order::<T::GuardType>();
    test_duplicate_insert_rejected::<T::GuardType>();
    test_delete_present_value::<T::GuardType>();
    test_delete_absent_value::<T::GuardType>();
}

#[rstest]
#[case::epoch(UseEpochGuard)]
#[case::deferred(UseDeferredGuard)]
fn test_reads<T: TestGuard>(#[case] _guard: T) {
    test_range_early_stop::<T::GuardType>();
    test_iter_operations::<T::GuardType>();
    test_extreme_values::<T::GuardType>();
}

#[rstest]
#[case::epoch(UseEpochGuard)]
#[case::deferred(UseDeferredGuard)]
fn test_model<T: TestGuard>(#[case] _guard: T) {
    test_sequential_against_model::<T::GuardType>();
    test_try_operations::<T::GuardType>();
}

#[rstest]
#[case::epoch(UseEpochGuard)]
#[case::deferred(UseDeferredGuard)]
fn test_disjoint<T: TestGuard>(#[case] _guard: T) {
    test_concurrent_disjoint_inserts::<T::GuardType>();
    test_concurrent_disjoint_deletes::<T::GuardType>();
}

// ============================================================================
// Stress tests
// ============================================================================

#[rstest]
#[serial(stress_tests)]
#[case::epoch(UseEpochGuard)]
#[case::deferred(UseDeferredGuard)]
fn stress_same_value<T: TestGuard>(#[case] _guard: T) {
    test_concurrent_delete_same_value::<T::GuardType>();
    test_concurrent_insert_same_value::<T::GuardType>();
    test_insert_delete_race_single_value::<T::GuardType>();
}

#[rstest]
#[serial(stress_tests)]
#[case::epoch(UseEpochGuard)]
#[case::deferred(UseDeferredGuard)]
fn stress_readers_during_churn<T: TestGuard>(#[case] _guard: T) {
    test_range_ordered_during_churn::<T::GuardType>();
    test_contains_during_modifications::<T::GuardType>();
}

#[rstest]
#[serial(stress_tests)]
#[case::epoch(UseEpochGuard)]
#[case::deferred(UseDeferredGuard)]
fn stress_private_keys<T: TestGuard>(#[case] _guard: T) {
    test_private_key_linearizability::<T::GuardType>();
}

#[rstest]
#[serial(stress_tests)]
#[case::no_backoff(RetryPolicy::unbounded())]
#[case::spin(RetryPolicy::unbounded().with_backoff(Backoff::Spin))]
#[case::yield_now(RetryPolicy::unbounded().with_backoff(Backoff::Yield))]
fn stress_no_deadlock_epoch(#[case] policy: RetryPolicy) {
    test_contention_no_deadlock::<EpochGuard>(policy);
}

#[rstest]
#[serial(stress_tests)]
#[case::fail_fast(RetryPolicy::bounded(0))]
#[case::few_spins(RetryPolicy::bounded(4).with_backoff(Backoff::Spin))]
fn stress_bounded_retries_epoch(#[case] policy: RetryPolicy) {
    test_bounded_retries_under_contention::<EpochGuard>(policy);
}

// ============================================================================
// Epoch-specific behaviour
// ============================================================================

#[test]
#[serial(stress_tests)]
fn test_iterator_survives_concurrent_deletes() {
    use std::sync::Arc;
    use std::thread;

    let list: Arc<EpochCoupledList> = Arc::new((0..10_000).collect());

    // The iterator pins before the deletes start, so every node it walks
    // stays allocated even after being unlinked.
    let mut iter = list.iter();
    let first = iter.next();

    let deleter = {
        let list = Arc::clone(&list);
        thread::spawn(move || {
            for v in 0..10_000 {
                assert!(list.delete(v));
            }
        })
    };
    deleter.join().unwrap();

    let rest: Vec<i64> = iter.collect();
    assert_eq!(first, Some(0));
    for window in rest.windows(2) {
        assert!(window[0] < window[1]);
    }
    assert!(list.is_empty());
    assert_eq!(list.len(), 0);
}

#[test]
fn test_list_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<EpochCoupledList>();
}
