#![allow(dead_code)]

pub mod classgen;

use once_cell::sync::Lazy;

static TRACING: Lazy<()> = Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
});

/// Routes crate logs to the test harness, which shows them for failing
/// tests only.
pub fn init_tracing() {
    Lazy::force(&TRACING);
}
