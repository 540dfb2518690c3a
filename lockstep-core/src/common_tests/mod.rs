//! Guard-generic test bodies shared by the integration suites of every crate.


use tracing_subscriber::EnvFilter;

/// Install a test-friendly subscriber driven by `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Assert that `values` is strictly ascending.
pub fn assert_strictly_ascending(values: &[i64]) {
    for window in values.windows(2) {
        assert!(
            window[0] < window[1],
            "values out of order or duplicated: {} then {}",
            window[0],
            window[1]
        );
    }
}
