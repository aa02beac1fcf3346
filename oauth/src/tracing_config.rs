//! Subscriber setup for hosts that embed the authenticator.
//!
//! The authenticator only emits `tracing` events. Spans on the resolution
//! path carry the token length, never the token id.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,bookstore_oauth=debug";

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human readable lines on stdout.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
    /// Human readable lines routed through the test harness capture.
    Test,
}

/// Install the global subscriber.
///
/// Returns `false` if one was already set, so hosts and test binaries can
/// call it unconditionally.
pub fn init_tracing(format: LogFormat) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry.with(fmt::layer()).try_init().is_ok(),
        LogFormat::Json => registry.with(fmt::layer().json()).try_init().is_ok(),
        LogFormat::Test => registry.with(fmt::layer().with_test_writer()).try_init().is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_refused() {
        init_tracing(LogFormat::Test);
        assert!(!init_tracing(LogFormat::Json));
    }
}
