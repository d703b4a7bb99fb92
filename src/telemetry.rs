//! Process-wide logging bootstrap.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install the global tracing subscriber, writing to stderr.
///
/// Idempotent: only the first call has an effect, and a subscriber installed
/// by someone else is left in place. `RUST_LOG` overrides `default_level`.
pub fn init(default_level: tracing::Level) {
    INIT.call_once(|| {
        let filter = EnvFilter::builder()
            .with_default_directive(default_level.into())
            .from_env_lossy();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
