//! Session id rules and the persisted current session.

use std::fmt;

use tracing::warn;

use crate::error::{ConfigError, ConfigResult};
use crate::store::SharedStore;

/// Storage key holding the current session id.
pub const SESSION_KEY: &str = "session_id";
/// Shortest accepted session id.
pub const MIN_SESSION_LEN: usize = 6;
/// Longest accepted session id.
pub const MAX_SESSION_LEN: usize = 20;

const LENGTH_RULE: &str = "session id must be 6-20 characters";
const CHARSET_RULE: &str = "session id may only contain ASCII letters and digits";

/// A session id that passed the client-side format check.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Validate a candidate id. Surrounding whitespace is trimmed first.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSessionId`] for ids outside 6-20 characters
    /// or containing anything other than ASCII letters and digits.
    pub fn parse(candidate: &str) -> ConfigResult<Self> {
        let trimmed = candidate.trim();
        let reason = if !(MIN_SESSION_LEN..=MAX_SESSION_LEN).contains(&trimmed.chars().count()) {
            Some(LENGTH_RULE)
        } else if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            Some(CHARSET_RULE)
        } else {
            None
        };
        match reason {
            Some(reason) => Err(ConfigError::InvalidSessionId {
                value: candidate.to_string(),
                reason,
            }),
            None => Ok(Self(trimmed.to_string())),
        }
    }

    /// Borrow the id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Clamp a requested random-id length into the accepted range.
#[must_use]
pub fn clamp_session_length(requested: usize) -> u8 {
    let clamped = requested.clamp(MIN_SESSION_LEN, MAX_SESSION_LEN);
    u8::try_from(clamped).unwrap_or(u8::MAX)
}

/// A validated session together with the visibility the backend granted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Session id sent as `X-Session-ID`.
    pub id: SessionId,
    /// Whether the backend reported admin visibility.
    pub is_admin: bool,
}

/// Read/write surface for the persisted session id.
#[derive(Clone)]
pub struct SessionStore {
    store: SharedStore,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Wrap a shared backend.
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Stored session id, if one is present and well formed.
    ///
    /// A malformed stored value is removed and treated as absent.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be read or cleaned up.
    pub fn load(&self) -> ConfigResult<Option<SessionId>> {
        let Some(raw) = self.store.get(SESSION_KEY)? else {
            return Ok(None);
        };
        match SessionId::parse(&raw) {
            Ok(id) => Ok(Some(id)),
            Err(err) => {
                warn!(error = %err, "discarding malformed stored session id");
                self.clear()?;
                Ok(None)
            }
        }
    }

    /// Persist `id` as the current session.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be written.
    pub fn persist(&self, id: &SessionId) -> ConfigResult<()> {
        self.store.set(SESSION_KEY, id.as_str())
    }

    /// Forget the current session.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be written.
    pub fn clear(&self) -> ConfigResult<()> {
        self.store.remove(SESSION_KEY)
    }
}
