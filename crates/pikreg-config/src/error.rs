//! Error types for client-side persistence.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for persistence operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Session id failed the client-side format check.
    #[error("invalid session id: {reason}")]
    InvalidSessionId {
        /// Offending value.
        value: String,
        /// Human-readable rule that was broken.
        reason: &'static str,
    },
    /// State file could not be read or written.
    #[error("state file {operation} failed for {}", path.display())]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// File involved.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// State file exists but is not a JSON object of strings.
    #[error("state file {} is corrupt", path.display())]
    CorruptStore {
        /// File involved.
        path: PathBuf,
        /// Decode error.
        source: serde_json::Error,
    },
    /// A value could not be encoded for storage.
    #[error("failed to encode stored value")]
    Encode {
        /// Encode error.
        source: serde_json::Error,
    },
    /// In-memory store lock was poisoned by a panicking writer.
    #[error("state store lock poisoned")]
    Poisoned,
    /// No platform configuration directory could be resolved.
    #[error("no configuration directory available; pass a state file explicitly")]
    NoConfigDir,
}

/// Convenience alias for persistence results.
pub type ConfigResult<T> = Result<T, ConfigError>;
