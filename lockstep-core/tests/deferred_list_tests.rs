use lockstep_core::DeferredGuard;
use lockstep_core::common_tests::coupled_list_core_tests::*;
use lockstep_core::common_tests::init_tracing;

#[test]
fn test_basic() {
    init_tracing();
    test_basic_operations::<DeferredGuard>();
}

#[test]
fn test_insert_order() {
    test_insert_out_of_order::<DeferredGuard>();
}

#[test]
fn test_duplicates() {
    test_duplicate_insert_rejected::<DeferredGuard>();
}

#[test]
fn test_delete_present() {
    test_delete_present_value::<DeferredGuard>();
}

#[test]
fn test_delete_absent() {
    test_delete_absent_value::<DeferredGuard>();
}

#[test]
fn test_range_stop() {
    test_range_early_stop::<DeferredGuard>();
}

#[test]
fn test_extremes() {
    test_extreme_values::<DeferredGuard>();
}

#[test]
fn test_iter() {
    test_iter_operations::<DeferredGuard>();
}

#[test]
fn test_try_ops() {
    test_try_operations::<DeferredGuard>();
}

#[test]
fn test_model() {
    test_sequential_against_model::<DeferredGuard>();
}

#[test]
fn test_disjoint_inserts() {
    test_concurrent_disjoint_inserts::<DeferredGuard>();
}

#[test]
fn test_disjoint_deletes() {
    test_concurrent_disjoint_deletes::<DeferredGuard>();
}
