//! Backend payload fixtures and scratch state files.

use std::path::PathBuf;

use serde_json::{Value, json};
use tempfile::TempDir;

/// An account row as `fetch_accounts` returns it.
#[must_use]
pub fn account_row(id: u32, email: &str, activations: u32) -> Value {
    json!({
        "id": id,
        "session_id": "abc123",
        "email": email,
        "name": email.split('@').next().unwrap_or(email),
        "device_id": format!("device{id}"),
        "access_token": format!("token{id}"),
        "captcha_token": format!("captcha{id}"),
        "client_id": "YNxT9w7GMdWvEOKa",
        "invite_code": "INVITE",
        "activation_status": activations,
        "last_activation_time": null,
        "created_at": format!("2024-05-{:02} 10:00:00", id % 28 + 1),
        "updated_at": "2024-05-30 10:00:00",
    })
}

/// A proxy pool row as `proxy/list` returns it.
#[must_use]
pub fn proxy_row(id: u32, host: &str, port: u16) -> Value {
    json!({
        "id": id,
        "proxy_url": format!("http://{host}:{port}"),
        "protocol": "http",
        "host": host,
        "port": port,
        "is_active": 1,
        "last_checked": "2024-05-30 10:00:00",
        "response_time": 0.42,
        "success_count": 3,
        "fail_count": 0,
    })
}

/// A state file path inside a directory removed on drop.
#[derive(Debug)]
pub struct ScratchState {
    dir: TempDir,
}

impl ScratchState {
    /// Create an empty scratch directory.
    ///
    /// # Panics
    ///
    /// Panics when the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create scratch state directory"),
        }
    }

    /// Path of the state file; it does not exist until first written.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.path().join("storage.json")
    }

    /// Seed the state file with `entries`.
    ///
    /// # Panics
    ///
    /// Panics when the file cannot be written.
    pub fn seed(&self, entries: &Value) {
        std::fs::write(self.path(), entries.to_string()).expect("seed scratch state file");
    }
}

impl Default for ScratchState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_state_starts_empty_and_seeds() {
        let state = ScratchState::new();
        assert!(!state.path().exists());
        state.seed(&json!({"session_id": "abc123"}));
        let raw = std::fs::read_to_string(state.path()).expect("read");
        assert!(raw.contains("abc123"));
    }

    #[test]
    fn account_rows_carry_lookup_credentials() {
        let row = account_row(2, "b@x.io", 1);
        assert_eq!(row["device_id"], "device2");
        assert_eq!(row["name"], "b");
    }
}
