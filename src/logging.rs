//! Logging setup for the command-line driver.
//!
//! Logs go to stderr so report output on stdout stays machine-readable.
//! `RUST_LOG` takes precedence over the configured level:
//!
//! ```bash
//! RUST_LOG=debug methodscan scan src/
//! RUST_LOG=methodscan::cli=trace methodscan scan Foo.java
//! ```

use std::sync::Once;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: Once = Once::new();

/// Initialize logging with a default filter such as `"warn"` or `"methodscan=debug"`.
///
/// Only the first call takes effect.
pub fn init(default_filter: &str) {
    INIT.call_once(|| {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::try_new(default_filter).unwrap_or_else(|_| EnvFilter::new("warn"))
        };

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_filter(filter);

        // A global subscriber may already be installed by an embedding binary.
        let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
    });
}
