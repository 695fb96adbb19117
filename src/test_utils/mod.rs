//! Test utilities for duecite
//!
//! Helpers shared by unit tests and the integration suite: logging setup,
//! sample BibTeX files and collectors, and a small runtime with a
//! registration module for it.
//!
//! # Example
//!
//! ```rust,no_run
//! use duecite::collector::CollectorHandle;
//! use duecite::injections::Injector;
//! use duecite::test_utils::{DEMO_MODULE, demo_runtime, init_test_logging};
//!
//! init_test_logging(None);
//! let mut rt = demo_runtime();
//! let collector = CollectorHandle::default();
//! let injector = Injector::with_modules(collector.clone(), vec![&DEMO_MODULE]);
//! injector.activate(&mut rt, false).unwrap();
//! rt.import("demo.cluster").unwrap();
//! ```

pub mod fixtures;

pub use fixtures::{
    BibFixture, DEMO_MODULE, FAILING_MODULE, NUMPY_BIBTEX, demo_runtime, sample_collector,
};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, tests run without a subscriber.
///
/// ```bash
/// RUST_LOG=duecite=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
