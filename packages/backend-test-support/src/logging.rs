//! Tracing for integration test binaries.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Idempotent; safe to call from every test binary's `ctor`.
///
/// Filter precedence: `TEST_LOG`, `RUST_LOG`, then `warn`. Set
/// `TEST_LOG_JSON=1` to get the production JSON layout instead of
/// compact text.
pub fn init() {
    INITIALIZED.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        let json = std::env::var("TEST_LOG_JSON").is_ok_and(|v| v == "1");
        let builder = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time();
        if json {
            builder.json().try_init().ok();
        } else {
            builder.compact().try_init().ok();
        }
    });
}
