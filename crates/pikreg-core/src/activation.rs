//! Sequential activation run state.
//!
//! A [`SequentialRun`] consumes decoded stream events one at a time and keeps
//! the aggregate progress a display needs. It performs no timing of its own:
//! the backend enforces the pause between accounts and the run only records
//! the announced delay. Once cancelled or terminated, the run ignores every
//! further event, so a late frame from a superseded stream cannot change what
//! was displayed.

use pikreg_api_models::SequentialActivateRequest;
use pikreg_events::{ActivationEvent, ActivationResult};
use tracing::{debug, info};

use crate::error::{CoreError, CoreResult};

/// Lifecycle of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunStatus {
    /// No run started yet.
    #[default]
    Idle,
    /// Events are being consumed.
    Running,
    /// The backend reported completion.
    Completed,
    /// The backend or the transport reported a failure.
    Error,
    /// The operator stopped watching the run.
    Cancelled,
}

impl RunStatus {
    /// Lowercase label for display and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Error => "error",
            Self::Cancelled => "cancelled",
        }
    }
}

/// What the caller should do with the stream after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunSignal {
    /// Keep reading.
    Continue,
    /// The run reached a terminal state; close the stream.
    Close,
    /// The run is no longer accepting events; the event was dropped.
    Ignored,
}

/// Display state of a sequential run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequentialProgress {
    /// Accounts in the batch, once announced.
    pub total: usize,
    /// 1-based position of the account in flight; never decreases.
    pub current: usize,
    /// Account currently being processed.
    pub current_account: Option<String>,
    /// Lifecycle status.
    pub status: RunStatus,
    /// Pause announced since the last account started, if any.
    pub delay_seconds: Option<f64>,
    /// Informational messages in arrival order.
    pub messages: Vec<String>,
    /// Displayed percentage, 0 to 100; never decreases within a run.
    pub percent: u8,
    /// Per-account outcomes in arrival order.
    pub results: Vec<ActivationResult>,
    /// Completion message.
    pub summary: Option<String>,
    /// Failure message.
    pub error: Option<String>,
}

fn percent_of(current: usize, total: usize) -> Option<u8> {
    if total == 0 {
        return None;
    }
    let value = current.saturating_mul(100) / total;
    Some(u8::try_from(value.min(100)).unwrap_or(100))
}

/// Operator's choice of accounts for an activation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationSelection {
    /// Activation key.
    pub key: String,
    /// Account names, ignored when `all` is set.
    pub names: Vec<String>,
    /// Activate every account visible to the session.
    pub all: bool,
    /// Lower bound of the pause between accounts, in seconds.
    pub delay_min: u64,
    /// Upper bound of the pause between accounts, in seconds.
    pub delay_max: u64,
}

impl ActivationSelection {
    /// Check the selection before any request is made.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidSelection`] for a blank key, an empty name
    /// list without `all`, or an inverted delay range.
    pub fn validate(&self) -> CoreResult<()> {
        if self.key.trim().is_empty() {
            return Err(CoreError::InvalidSelection {
                reason: "activation key is required",
            });
        }
        if !self.all && self.names.iter().all(|name| name.trim().is_empty()) {
            return Err(CoreError::InvalidSelection {
                reason: "select at least one account or activate all",
            });
        }
        if self.delay_min > self.delay_max {
            return Err(CoreError::InvalidSelection {
                reason: "minimum delay exceeds maximum delay",
            });
        }
        Ok(())
    }

    /// Body for the streaming endpoint.
    #[must_use]
    pub fn to_request(&self) -> SequentialActivateRequest {
        SequentialActivateRequest {
            key: self.key.trim().to_string(),
            names: self.names.clone(),
            all: self.all,
            delay_min: self.delay_min,
            delay_max: self.delay_max,
        }
    }
}

/// Orchestrates the display state of one sequential activation run.
#[derive(Debug, Clone, Default)]
pub struct SequentialRun {
    progress: SequentialProgress,
}

impl SequentialRun {
    /// Idle run.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current display state.
    #[must_use]
    pub const fn progress(&self) -> &SequentialProgress {
        &self.progress
    }

    /// Consume the run, keeping its final state.
    #[must_use]
    pub fn into_progress(self) -> SequentialProgress {
        self.progress
    }

    /// Whether events are still being accepted.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.progress.status == RunStatus::Running
    }

    /// Reset all progress and begin accepting events.
    ///
    /// Restarting a finished run reprocesses the batch from the beginning.
    pub fn start(&mut self) {
        self.progress = SequentialProgress {
            status: RunStatus::Running,
            ..SequentialProgress::default()
        };
        info!("sequential activation run started");
    }

    /// Apply one decoded stream event.
    pub fn apply(&mut self, event: &ActivationEvent) -> RunSignal {
        if !self.is_running() {
            debug!(kind = event.kind(), status = self.progress.status.as_str(), "event ignored");
            return RunSignal::Ignored;
        }
        let progress = &mut self.progress;
        match event {
            ActivationEvent::Init { message } => {
                progress.messages.extend(message.clone());
            }
            ActivationEvent::Start { total, message } => {
                progress.total = *total;
                progress.messages.extend(message.clone());
            }
            ActivationEvent::Processing {
                current,
                total,
                account,
                message,
            } => {
                if let Some(total) = total {
                    progress.total = *total;
                }
                progress.current = progress.current.max(*current);
                progress.current_account.clone_from(account);
                progress.delay_seconds = None;
                progress.messages.extend(message.clone());
                if let Some(percent) = percent_of(*current, progress.total) {
                    progress.percent = progress.percent.max(percent.saturating_sub(5));
                }
            }
            ActivationEvent::Result {
                current,
                total,
                account_result,
            } => {
                if let Some(total) = total {
                    progress.total = *total;
                }
                progress.current = progress.current.max(*current);
                progress.results.push(account_result.clone());
                if let Some(percent) = percent_of(*current, progress.total) {
                    progress.percent = progress.percent.max(percent);
                }
            }
            ActivationEvent::Delay { seconds, message } => {
                progress.delay_seconds = Some(*seconds);
                progress.messages.extend(message.clone());
            }
            ActivationEvent::Complete { message, results } => {
                progress.percent = 100;
                if !results.is_empty() {
                    progress.results.clone_from(results);
                }
                progress.summary.clone_from(message);
                progress.current_account = None;
                progress.status = RunStatus::Completed;
                info!(results = progress.results.len(), "sequential activation run completed");
                return RunSignal::Close;
            }
            ActivationEvent::Error { message } => {
                progress.error = Some(message.clone());
                progress.status = RunStatus::Error;
                info!(error = %message, results = progress.results.len(), "sequential activation run failed");
                return RunSignal::Close;
            }
        }
        RunSignal::Continue
    }

    /// Stop accepting events. Returns whether a running run was cancelled.
    pub fn cancel(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.progress.status = RunStatus::Cancelled;
        self.progress.current_account = None;
        info!(results = self.progress.results.len(), "sequential activation run cancelled");
        true
    }

    /// Record a transport failure; recorded results are kept.
    pub fn fail_transport(&mut self, message: impl Into<String>) {
        if !self.is_running() {
            return;
        }
        self.progress.error = Some(message.into());
        self.progress.status = RunStatus::Error;
    }

    /// The stream ended without a terminal event.
    ///
    /// The run counts as completed when its displayed progress already reached
    /// 100; otherwise it stays running and the caller decides how to report the
    /// interruption. Returns whether the run is now completed.
    pub fn stream_ended(&mut self) -> bool {
        if self.is_running() && self.progress.percent >= 100 {
            self.progress.status = RunStatus::Completed;
            self.progress.current_account = None;
        }
        self.progress.status == RunStatus::Completed
    }
}

/// Success and failure counts of a result list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResultTally {
    /// Accounts activated.
    pub succeeded: usize,
    /// Accounts that failed.
    pub failed: usize,
}

impl ResultTally {
    /// Count outcomes in `results`.
    #[must_use]
    pub fn of(results: &[ActivationResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        Self {
            succeeded,
            failed: results.len() - succeeded,
        }
    }
}
