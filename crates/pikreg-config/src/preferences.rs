//! Saved registration preferences.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, ConfigResult};
use crate::store::SharedStore;

/// Storage key of the preference blob.
pub const CONFIG_KEY: &str = "pikpak_config";
/// Storage key that held the invite code before the blob existed.
pub const LEGACY_INVITE_KEY: &str = "savedInviteCode";

/// Preferences remembered between registration runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// Invite code pre-filled into the next run; empty when not remembered.
    pub saved_invite_code: String,
    /// Route provider traffic through a proxy.
    pub use_proxy: bool,
    /// Let the backend pick a proxy from the pool.
    pub use_proxy_pool: bool,
    /// Route mailbox traffic through the proxy as well.
    pub use_email_proxy: bool,
}

/// Partial update merged over the stored preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfigPatch {
    /// New invite code; an empty string forgets it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_invite_code: Option<String>,
    /// New proxy toggle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_proxy: Option<bool>,
    /// New pool toggle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_proxy_pool: Option<bool>,
    /// New mailbox proxy toggle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_email_proxy: Option<bool>,
}

impl AppConfigPatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.saved_invite_code.is_none()
            && self.use_proxy.is_none()
            && self.use_proxy_pool.is_none()
            && self.use_email_proxy.is_none()
    }
}

impl AppConfig {
    /// Apply `patch` in place.
    pub fn merge(&mut self, patch: AppConfigPatch) {
        if let Some(code) = patch.saved_invite_code {
            self.saved_invite_code = code;
        }
        if let Some(value) = patch.use_proxy {
            self.use_proxy = value;
        }
        if let Some(value) = patch.use_proxy_pool {
            self.use_proxy_pool = value;
        }
        if let Some(value) = patch.use_email_proxy {
            self.use_email_proxy = value;
        }
    }

    /// The remembered invite code, if any.
    #[must_use]
    pub fn invite_code(&self) -> Option<&str> {
        Some(self.saved_invite_code.trim()).filter(|code| !code.is_empty())
    }
}

/// Read/write surface for [`AppConfig`].
#[derive(Clone)]
pub struct PreferencesStore {
    store: SharedStore,
}

impl fmt::Debug for PreferencesStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferencesStore").finish_non_exhaustive()
    }
}

impl PreferencesStore {
    /// Wrap a shared backend.
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Stored preferences merged over the defaults.
    ///
    /// When no blob exists but the legacy invite-code key does, the code is
    /// migrated into a fresh blob. An unreadable blob yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be read, or cannot be written
    /// during migration.
    pub fn load(&self) -> ConfigResult<AppConfig> {
        if let Some(raw) = self.store.get(CONFIG_KEY)? {
            return Ok(serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(error = %err, "stored preferences unreadable; using defaults");
                AppConfig::default()
            }));
        }
        if let Some(code) = self.store.get(LEGACY_INVITE_KEY)?.filter(|c| !c.is_empty()) {
            let migrated = AppConfig {
                saved_invite_code: code,
                ..AppConfig::default()
            };
            self.write(&migrated)?;
            return Ok(migrated);
        }
        Ok(AppConfig::default())
    }

    /// Merge `patch` over the stored preferences and persist the result.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be read or written.
    pub fn save(&self, patch: AppConfigPatch) -> ConfigResult<AppConfig> {
        let mut config = self.load()?;
        config.merge(patch);
        self.write(&config)?;
        Ok(config)
    }

    fn write(&self, config: &AppConfig) -> ConfigResult<()> {
        let encoded = serde_json::to_string(config).map_err(|source| ConfigError::Encode { source })?;
        self.store.set(CONFIG_KEY, &encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{KeyValueStore, MemoryStore};
    use std::sync::Arc;

    #[test]
    fn missing_blob_yields_defaults() {
        let prefs = PreferencesStore::new(Arc::new(MemoryStore::new()));
        assert_eq!(prefs.load().expect("load"), AppConfig::default());
    }

    #[test]
    fn partial_blob_merges_over_defaults() {
        let backend = Arc::new(MemoryStore::with_entries([(CONFIG_KEY, r#"{"useProxy":true}"#)]));
        let config = PreferencesStore::new(backend).load().expect("load");
        assert!(config.use_proxy);
        assert!(!config.use_email_proxy);
        assert_eq!(config.invite_code(), None);
    }

    #[test]
    fn legacy_invite_code_is_migrated() {
        let backend = Arc::new(MemoryStore::with_entries([(LEGACY_INVITE_KEY, "INV42")]));
        let prefs = PreferencesStore::new(backend.clone());
        let config = prefs.load().expect("load");
        assert_eq!(config.invite_code(), Some("INV42"));

        let blob = backend.get(CONFIG_KEY).expect("get").expect("migrated blob");
        let stored: AppConfig = serde_json::from_str(&blob).expect("decode");
        assert_eq!(stored.saved_invite_code, "INV42");
    }

    #[test]
    fn save_merges_patch() {
        let prefs = PreferencesStore::new(Arc::new(MemoryStore::new()));
        prefs
            .save(AppConfigPatch {
                saved_invite_code: Some("CODE".into()),
                ..AppConfigPatch::default()
            })
            .expect("save");
        let config = prefs
            .save(AppConfigPatch {
                use_proxy_pool: Some(true),
                ..AppConfigPatch::default()
            })
            .expect("save");
        assert_eq!(config.saved_invite_code, "CODE");
        assert!(config.use_proxy_pool);
        assert_eq!(prefs.load().expect("load"), config);
    }

    #[test]
    fn unreadable_blob_falls_back_to_defaults() {
        let backend = Arc::new(MemoryStore::with_entries([(CONFIG_KEY, "not json")]));
        let config = PreferencesStore::new(backend).load().expect("load");
        assert_eq!(config, AppConfig::default());
    }
}
