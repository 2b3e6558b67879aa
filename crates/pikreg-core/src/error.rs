//! Error types for the console state machines.

use thiserror::Error;

/// Primary error type for core operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// An account input line did not have the four required fields.
    #[error("line {line}: expected email----password----clientId----token ({reason})")]
    MalformedAccountLine {
        /// 1-based line number in the submitted text.
        line: usize,
        /// Which rule the line broke.
        reason: &'static str,
    },
    /// The submitted batch contained no accounts.
    #[error("enter at least one account")]
    EmptyBatch,
    /// An activation request was incomplete.
    #[error("invalid activation selection: {reason}")]
    InvalidSelection {
        /// Which rule the selection broke.
        reason: &'static str,
    },
    /// The wizard received an event its current state does not accept.
    #[error("cannot apply {event} while account is {state}")]
    IllegalTransition {
        /// State label at the time of the event.
        state: &'static str,
        /// Event label.
        event: &'static str,
    },
    /// Every account in the batch has already been processed.
    #[error("all accounts have been processed")]
    BatchFinished,
}

/// Convenience alias for core results.
pub type CoreResult<T> = Result<T, CoreError>;
