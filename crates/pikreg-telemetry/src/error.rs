//! Logging setup failures.

use thiserror::Error;

/// Result alias used across this crate.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Why logging could not be set up.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber was already installed, or installation failed.
    #[error("could not install the log subscriber")]
    SubscriberInstall {
        /// Installation failure.
        #[source]
        source: tracing_subscriber::util::TryInitError,
    },
    /// The `--log-level` directive does not parse.
    #[error("invalid log level '{level}'")]
    InvalidLevel {
        /// Directive as given.
        level: String,
        /// Filter parse failure.
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },
}
