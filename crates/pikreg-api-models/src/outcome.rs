//! The `status` envelope shared by every JSON endpoint.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Value of the `status` discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiStatus {
    /// The request completed.
    Success,
    /// Some items of a batch request completed.
    Partial,
    /// The request completed with nothing to report (for example an empty list).
    Info,
    /// The backend rejected the request.
    Error,
}

/// Body used by endpoints that only answer with `status` and `message`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Ack {}

/// Tagged view of a backend response.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome<T> {
    /// `status: "success"`.
    Success {
        /// Human readable message, when the backend sent one.
        message: Option<String>,
        /// Endpoint specific payload.
        body: T,
    },
    /// `status: "partial"`.
    Partial {
        /// Human readable message, when the backend sent one.
        message: Option<String>,
        /// Endpoint specific payload.
        body: T,
    },
    /// `status: "info"`.
    Info {
        /// Human readable message, when the backend sent one.
        message: Option<String>,
        /// Endpoint specific payload.
        body: T,
    },
    /// `status: "error"`.
    Error {
        /// Reason reported by the backend.
        message: String,
    },
}

#[derive(Deserialize)]
struct Envelope {
    status: ApiStatus,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
}

const UNSPECIFIED_FAILURE: &str = "request failed without a message";

impl<T: DeserializeOwned> ApiOutcome<T> {
    /// Interpret a decoded JSON body.
    ///
    /// The message is read from `message`, falling back to `msg` which the
    /// email-code endpoint uses. The payload is only decoded for non-error
    /// statuses.
    ///
    /// # Errors
    ///
    /// Returns the decode error when `status` is missing or unknown, or when the
    /// payload does not match `T`.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let envelope = Envelope::deserialize(&value)?;
        let message = envelope.message.or(envelope.msg);
        let wrap: fn(Option<String>, T) -> Self = match envelope.status {
            ApiStatus::Success => |message, body| Self::Success { message, body },
            ApiStatus::Partial => |message, body| Self::Partial { message, body },
            ApiStatus::Info => |message, body| Self::Info { message, body },
            ApiStatus::Error => {
                return Ok(Self::Error {
                    message: message.unwrap_or_else(|| UNSPECIFIED_FAILURE.to_string()),
                });
            }
        };
        let body = serde_json::from_value(value)?;
        Ok(wrap(message, body))
    }
}

impl<T> ApiOutcome<T> {
    /// Discriminator of this outcome.
    #[must_use]
    pub const fn status(&self) -> ApiStatus {
        match self {
            Self::Success { .. } => ApiStatus::Success,
            Self::Partial { .. } => ApiStatus::Partial,
            Self::Info { .. } => ApiStatus::Info,
            Self::Error { .. } => ApiStatus::Error,
        }
    }

    /// Message attached to the outcome, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success { message, .. }
            | Self::Partial { message, .. }
            | Self::Info { message, .. } => message.as_deref(),
            Self::Error { message } => Some(message),
        }
    }

    /// Split into the payload or the backend's failure message.
    ///
    /// # Errors
    ///
    /// Returns the backend message for `status: "error"`.
    pub fn into_body(self) -> Result<T, String> {
        match self {
            Self::Success { body, .. } | Self::Partial { body, .. } | Self::Info { body, .. } => {
                Ok(body)
            }
            Self::Error { message } => Err(message),
        }
    }
}
