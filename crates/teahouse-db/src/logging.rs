//! # Logging Setup
//!
//! ## Log Levels
//! - `RUST_LOG=debug` - Show debug messages
//! - `RUST_LOG=teahouse_db=trace` - Trace the order transaction
//! - Default: [`DEFAULT_LOG_FILTER`], or `[logging] filter` from the config

use tracing_subscriber::EnvFilter;

/// Filter used when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_FILTER: &str = "info,teahouse=debug,sqlx=warn";

/// Installs the global fmt subscriber. `RUST_LOG` overrides `fallback`.
///
/// Call once, at binary startup.
pub fn init_tracing(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
