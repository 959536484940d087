#![forbid(unsafe_code)]

//! Logging glue.
//!
//! With the `tracing` feature the usual macros are re-exported so downstream
//! crates can write `infiniscroll_core::debug!(..)`. With `tracing-json` a
//! process-wide subscriber can be installed; its filter comes from
//! [`LOG_ENV_VAR`] and falls back to the directive passed by the caller.

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV_VAR: &str = "INFINISCROLL_LOG";

#[cfg(feature = "tracing")]
pub use tracing::{debug, debug_span, error, info, trace, warn};

/// Output format for [`init_logging`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable single-line output.
    #[default]
    Pretty,
    /// One JSON object per event (for log shipping).
    Json,
}

impl LogFormat {
    /// Parse a format name; unknown names fall back to `Pretty`.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" | "jsonl" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Install a global subscriber writing to stderr.
///
/// Returns `false` when a subscriber was already installed (tests commonly
/// race on this), `true` otherwise.
#[cfg(feature = "tracing-json")]
pub fn init_logging(default_directive: &str, format: LogFormat) -> bool {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().try_init().is_ok(),
        LogFormat::Pretty => builder.try_init().is_ok(),
    }
}
