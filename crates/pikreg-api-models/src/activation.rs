//! Activation request bodies.

use pikreg_events::ActivationResult;
use serde::{Deserialize, Serialize};

/// `POST /api/activate_account_with_names` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivateRequest {
    /// Activation key.
    pub key: String,
    /// Account names to activate; ignored by the backend when `all` is set.
    pub names: Vec<String>,
    /// Activate every account visible to the session.
    pub all: bool,
}

/// `POST /api/activate_account_sequential` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequentialActivateRequest {
    /// Activation key.
    pub key: String,
    /// Account names to activate; ignored by the backend when `all` is set.
    pub names: Vec<String>,
    /// Activate every account visible to the session.
    pub all: bool,
    /// Lower bound of the pause between accounts, in seconds.
    pub delay_min: u64,
    /// Upper bound of the pause between accounts, in seconds.
    pub delay_max: u64,
}

/// Payload of a batch activation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivationSummary {
    /// Per-account outcomes.
    #[serde(default)]
    pub results: Vec<ActivationResult>,
}
