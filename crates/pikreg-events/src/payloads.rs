//! Event payload types carried by the sequential activation stream.

use serde::{Deserialize, Serialize};

/// Outcome of one activation attempt for one account.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    /// The backend activated the account.
    Success,
    /// The backend reported a failure for the account.
    Error,
}

impl ResultStatus {
    /// Label used by the wire format and table output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// One record per account per activation attempt.
///
/// Immutable once recorded; a retried run produces a fresh record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivationResult {
    /// Account name the record refers to.
    pub account: String,
    /// Whether the activation succeeded.
    pub status: ResultStatus,
    /// Backend explanation, when provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Whether the stored account row was updated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<bool>,
}

impl ActivationResult {
    /// Whether the record reports a successful activation.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, ResultStatus::Success)
    }
}

/// Typed event frames emitted by `/activate_account_sequential`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActivationEvent {
    /// Connection acknowledged by the backend.
    Init {
        /// Optional greeting from the backend.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// The backend resolved the batch and knows its size.
    Start {
        /// Number of accounts in the batch.
        total: usize,
        /// Optional human-readable note.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// The backend began activating one account.
    Processing {
        /// 1-based position of the account in the batch.
        current: usize,
        /// Batch size echoed by the backend.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        total: Option<usize>,
        /// Account being processed.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        account: Option<String>,
        /// Optional human-readable note.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// One account finished.
    Result {
        /// 1-based position of the account in the batch.
        current: usize,
        /// Batch size echoed by the backend.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        total: Option<usize>,
        /// Outcome for the account.
        account_result: ActivationResult,
    },
    /// The backend is waiting before the next account.
    Delay {
        /// Wait duration in seconds, display only.
        #[serde(alias = "delay", alias = "delay_seconds")]
        seconds: f64,
        /// Optional human-readable note.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// The batch finished.
    Complete {
        /// Summary line from the backend.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        /// Final result list, when the backend repeats it.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        results: Vec<ActivationResult>,
    },
    /// The batch aborted server-side.
    Error {
        /// Failure explanation.
        message: String,
    },
}

impl ActivationEvent {
    /// Wire discriminator for the event.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::Start { .. } => "start",
            Self::Processing { .. } => "processing",
            Self::Result { .. } => "result",
            Self::Delay { .. } => "delay",
            Self::Complete { .. } => "complete",
            Self::Error { .. } => "error",
        }
    }

    /// Whether the event ends the run.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Error { .. })
    }
}
