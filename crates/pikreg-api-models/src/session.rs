//! Session bootstrap bodies.

use serde::{Deserialize, Serialize};

/// `POST /api/session/validate` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateSessionRequest {
    /// Session id to check.
    pub session_id: String,
}

/// `POST /api/session/generate` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenerateSessionRequest {
    /// Register a caller-chosen id.
    Custom {
        /// Id to register.
        custom_id: String,
    },
    /// Let the backend pick a random id of the given length.
    Random {
        /// Requested length, 6 to 20.
        length: u8,
    },
}

/// Payload of a successful validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionValidation {
    /// Whether the backend accepts the id.
    #[serde(default)]
    pub is_valid: bool,
    /// Whether the id carries admin visibility.
    #[serde(default)]
    pub is_admin: bool,
}

/// Payload of a successful generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSession {
    /// The id now registered with the backend.
    pub session_id: String,
}
