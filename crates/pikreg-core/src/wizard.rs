//! Registration wizard.
//!
//! Each account moves through `pending -> initializing -> captcha_pending ->
//! email_pending -> success`, one backend call per arrow. A failed call parks
//! the account in `error` together with the step that failed; only an explicit
//! retry or skip moves it again. The batch cursor advances when the current
//! account succeeds or is skipped, and the wizard is finished once the cursor
//! passes the last account.

use std::fmt;

use tracing::{debug, info};

use crate::accounts::AccountLine;
use crate::error::{CoreError, CoreResult};

/// One backend call of the registration sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardStep {
    /// `POST /api/initialize`.
    Initialize,
    /// `POST /api/verify_captcha`.
    VerifyCaptcha,
    /// `POST /api/get_email_verification_code`.
    FetchEmailCode,
    /// `POST /api/register`.
    Register,
}

impl WizardStep {
    /// Short label for display and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::VerifyCaptcha => "verify captcha",
            Self::FetchEmailCode => "fetch email code",
            Self::Register => "register",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registration state of one account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AccountState {
    /// Not started.
    #[default]
    Pending,
    /// Initialize request in flight.
    Initializing,
    /// Initialized; captcha verification is next.
    CaptchaPending,
    /// Captcha solved; waiting for the email code, then registration.
    EmailPending {
        /// Verification code once known.
        code: Option<String>,
    },
    /// Registered.
    Success {
        /// Message from the register call.
        message: Option<String>,
    },
    /// A step failed.
    Error {
        /// Step that failed.
        step: WizardStep,
        /// Failure message.
        message: String,
        /// Verification code known at the time of failure.
        code: Option<String>,
    },
}

/// Input to the per-account machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEvent {
    /// Initialize request dispatched.
    Begin,
    /// Initialize succeeded.
    Initialized,
    /// Captcha verification succeeded.
    CaptchaVerified,
    /// The backend found the email code.
    CodeReceived(String),
    /// The operator typed the email code.
    CodeEntered(String),
    /// Register succeeded.
    Registered {
        /// Message from the backend.
        message: Option<String>,
    },
    /// A step failed.
    Failed {
        /// Step that failed.
        step: WizardStep,
        /// Failure message.
        message: String,
    },
    /// Re-arm the step that failed.
    Retry,
}

impl WizardEvent {
    const fn label(&self) -> &'static str {
        match self {
            Self::Begin => "begin",
            Self::Initialized => "initialized",
            Self::CaptchaVerified => "captcha verified",
            Self::CodeReceived(_) => "code received",
            Self::CodeEntered(_) => "code entered",
            Self::Registered { .. } => "registered",
            Self::Failed { .. } => "failure",
            Self::Retry => "retry",
        }
    }
}

impl AccountState {
    /// Status label matching the console's vocabulary.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Initializing => "initializing",
            Self::CaptchaPending => "captcha_pending",
            Self::EmailPending { .. } => "email_pending",
            Self::Success { .. } => "success",
            Self::Error { .. } => "error",
        }
    }

    /// Whether no further step will run without operator action.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::Error { .. })
    }

    /// The backend call this state is waiting on, if any.
    #[must_use]
    pub const fn pending_step(&self) -> Option<WizardStep> {
        match self {
            Self::Pending | Self::Initializing => Some(WizardStep::Initialize),
            Self::CaptchaPending => Some(WizardStep::VerifyCaptcha),
            Self::EmailPending { code: None } => Some(WizardStep::FetchEmailCode),
            Self::EmailPending { code: Some(_) } => Some(WizardStep::Register),
            Self::Success { .. } | Self::Error { .. } => None,
        }
    }

    fn known_code(&self) -> Option<String> {
        match self {
            Self::EmailPending { code } | Self::Error { code, .. } => code.clone(),
            _ => None,
        }
    }

    /// Compute the state after `event`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IllegalTransition`] when the state does not accept
    /// the event, including a failure reported for a step other than the one
    /// in flight.
    pub fn apply(&self, event: &WizardEvent) -> CoreResult<Self> {
        let next = match (self, event) {
            (Self::Pending, WizardEvent::Begin) => Self::Initializing,
            (Self::Initializing, WizardEvent::Initialized) => Self::CaptchaPending,
            (Self::CaptchaPending, WizardEvent::CaptchaVerified) => {
                Self::EmailPending { code: None }
            }
            (Self::EmailPending { code: None }, WizardEvent::CodeReceived(code))
            | (
                Self::EmailPending { code: None }
                | Self::Error {
                    step: WizardStep::FetchEmailCode,
                    ..
                },
                WizardEvent::CodeEntered(code),
            ) => Self::EmailPending {
                code: Some(code.clone()),
            },
            (Self::EmailPending { code: Some(_) }, WizardEvent::Registered { message }) => {
                Self::Success {
                    message: message.clone(),
                }
            }
            (state, WizardEvent::Failed { step, message })
                if state.pending_step() == Some(*step) && *state != Self::Pending =>
            {
                Self::Error {
                    step: *step,
                    message: message.clone(),
                    code: state.known_code(),
                }
            }
            (Self::Error { step, code, .. }, WizardEvent::Retry) => match step {
                WizardStep::Initialize => Self::Pending,
                WizardStep::VerifyCaptcha => Self::CaptchaPending,
                WizardStep::FetchEmailCode => Self::EmailPending { code: None },
                WizardStep::Register => Self::EmailPending { code: code.clone() },
            },
            (state, event) => {
                return Err(CoreError::IllegalTransition {
                    state: state.label(),
                    event: event.label(),
                });
            }
        };
        Ok(next)
    }
}

/// One account of the batch and its state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationEntry {
    /// Credentials as submitted.
    pub account: AccountLine,
    /// Registration state.
    pub state: AccountState,
    /// Whether the operator skipped the account after a failure.
    pub skipped: bool,
}

/// Counts over a finished or partial batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WizardSummary {
    /// Accounts registered.
    pub succeeded: usize,
    /// Accounts that ended in error, skipped or not.
    pub failed: usize,
    /// Accounts the operator skipped.
    pub skipped: usize,
    /// Accounts not yet settled.
    pub remaining: usize,
}

/// A batch of accounts registered one at a time.
#[derive(Debug, Clone)]
pub struct Wizard {
    entries: Vec<RegistrationEntry>,
    cursor: usize,
}

impl Wizard {
    /// Start a batch with every account pending.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyBatch`] for an empty list.
    pub fn new(accounts: Vec<AccountLine>) -> CoreResult<Self> {
        if accounts.is_empty() {
            return Err(CoreError::EmptyBatch);
        }
        let entries = accounts
            .into_iter()
            .map(|account| RegistrationEntry {
                account,
                state: AccountState::Pending,
                skipped: false,
            })
            .collect();
        Ok(Self { entries, cursor: 0 })
    }

    /// All entries in submission order.
    #[must_use]
    pub fn entries(&self) -> &[RegistrationEntry] {
        &self.entries
    }

    /// 0-based index of the account being processed.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// The account being processed, `None` once finished.
    #[must_use]
    pub fn current(&self) -> Option<&RegistrationEntry> {
        self.entries.get(self.cursor)
    }

    /// Whether every account has been registered or skipped.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.entries.len()
    }

    /// Backend call the current account waits on.
    #[must_use]
    pub fn next_step(&self) -> Option<WizardStep> {
        self.current().and_then(|entry| entry.state.pending_step())
    }

    /// Apply `event` to the current account.
    ///
    /// A success moves the cursor to the next account.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::BatchFinished`] after the last account, or the
    /// transition error of the account machine.
    pub fn apply(&mut self, event: &WizardEvent) -> CoreResult<AccountState> {
        let cursor = self.cursor;
        let entry = self
            .entries
            .get_mut(cursor)
            .ok_or(CoreError::BatchFinished)?;
        let next = entry.state.apply(event)?;
        debug!(
            account = %entry.account.email,
            from = entry.state.label(),
            to = next.label(),
            "registration state changed"
        );
        entry.state = next.clone();
        if matches!(next, AccountState::Success { .. }) {
            info!(account = %entry.account.email, "account registered");
            self.cursor += 1;
        }
        Ok(next)
    }

    /// Re-arm the failed step of the current account.
    ///
    /// # Errors
    ///
    /// Returns an error unless the current account is in `error`.
    pub fn retry(&mut self) -> CoreResult<AccountState> {
        self.apply(&WizardEvent::Retry)
    }

    /// Leave the failed current account behind and move on.
    ///
    /// # Errors
    ///
    /// Returns an error unless the current account is in `error`.
    pub fn skip(&mut self) -> CoreResult<()> {
        let entry = self
            .entries
            .get_mut(self.cursor)
            .ok_or(CoreError::BatchFinished)?;
        if !matches!(entry.state, AccountState::Error { .. }) {
            return Err(CoreError::IllegalTransition {
                state: entry.state.label(),
                event: "skip",
            });
        }
        entry.skipped = true;
        info!(account = %entry.account.email, "account skipped");
        self.cursor += 1;
        Ok(())
    }

    /// Counts over the batch so far.
    #[must_use]
    pub fn summary(&self) -> WizardSummary {
        self.entries
            .iter()
            .fold(WizardSummary::default(), |mut summary, entry| {
                match &entry.state {
                    AccountState::Success { .. } => summary.succeeded += 1,
                    AccountState::Error { .. } => summary.failed += 1,
                    _ => summary.remaining += 1,
                }
                if entry.skipped {
                    summary.skipped += 1;
                }
                summary
            })
    }
}
