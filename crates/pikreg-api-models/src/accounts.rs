//! Account listing, deletion and provider look-up bodies.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::ids::RecordId;

fn count_or_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Option::<u32>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// One stored account as returned by `GET /api/fetch_accounts`.
///
/// The backend merges the provider's account blob into the row, so fields the
/// tables do not interpret are kept in [`extra`](Self::extra).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Row id.
    pub id: RecordId,
    /// Account email.
    #[serde(default)]
    pub email: String,
    /// Provider display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Session that owns the row.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Invite code the account registered with.
    #[serde(default)]
    pub invite_code: Option<String>,
    /// Provider device id bound to the account.
    #[serde(default)]
    pub device_id: Option<String>,
    /// Number of successful activations.
    #[serde(default, deserialize_with = "count_or_null")]
    pub activation_status: u32,
    /// Timestamp of the latest activation.
    #[serde(default)]
    pub last_activation_time: Option<String>,
    /// Row creation timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Row update timestamp.
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Remaining provider fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Account {
    /// String field from the provider blob.
    #[must_use]
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }

    /// Credentials needed by the `/api/account/*` look-ups.
    ///
    /// Returns `None` when the row carries no token or no device id.
    #[must_use]
    pub fn lookup_request(&self) -> Option<AccountLookupRequest> {
        let token = self
            .extra_str("access_token")
            .or_else(|| self.extra_str("token"))?;
        let device_id = self.device_id.as_deref()?;
        Some(AccountLookupRequest {
            token: token.to_string(),
            device_id: device_id.to_string(),
            client_id: self.extra_str("client_id").map(str::to_string),
            captcha_token: self
                .extra_str("captcha_token")
                .unwrap_or_default()
                .to_string(),
        })
    }
}

/// Payload of `GET /api/fetch_accounts`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountList {
    /// Rows visible to the session.
    #[serde(default)]
    pub accounts: Vec<Account>,
    /// Whether the session sees every row.
    #[serde(default)]
    pub is_admin: bool,
}

/// `POST /api/delete_account` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeleteAccountRequest {
    /// Delete a batch.
    Batch {
        /// Rows to delete.
        ids: Vec<RecordId>,
    },
    /// Delete one row.
    Single {
        /// Row to delete.
        id: RecordId,
    },
}

/// A row the backend refused to delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteFailure {
    /// Row id.
    pub id: RecordId,
    /// Reason reported by the backend.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Per-id breakdown of a batch delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    /// Rows removed.
    #[serde(default)]
    pub success: Vec<RecordId>,
    /// Rows left in place.
    #[serde(default)]
    pub failed: Vec<DeleteFailure>,
}

/// Payload of `POST /api/delete_account`; single deletes carry no breakdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResults {
    /// Breakdown, present for batch deletes.
    #[serde(default)]
    pub results: Option<DeleteOutcome>,
}

/// `POST /api/account/{vip_info,invite_code,invite_list}` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountLookupRequest {
    /// Provider access token.
    pub token: String,
    /// Provider device id.
    pub device_id: String,
    /// Provider client id, when the row stored one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Provider captcha token.
    pub captcha_token: String,
}

/// Provider payload of an account look-up, passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderPayload {
    /// Raw provider data.
    #[serde(default)]
    pub data: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn account_keeps_provider_fields_and_defaults_counts() {
        let account: Account = serde_json::from_value(json!({
            "id": 3,
            "email": "a@x.io",
            "device_id": "dev",
            "access_token": "tok",
            "captcha_token": "cap",
            "activation_status": null,
            "created_at": "2024-05-01 10:00:00"
        }))
        .expect("account");
        assert_eq!(account.id, RecordId::from("3"));
        assert_eq!(account.activation_status, 0);
        assert_eq!(account.extra_str("access_token"), Some("tok"));

        let lookup = account.lookup_request().expect("credentials");
        assert_eq!(lookup.token, "tok");
        assert_eq!(lookup.captcha_token, "cap");
        assert_eq!(
            serde_json::to_value(&lookup).expect("json"),
            json!({"token": "tok", "device_id": "dev", "captcha_token": "cap"})
        );
    }

    #[test]
    fn lookup_requires_token_and_device() {
        let account: Account =
            serde_json::from_value(json!({"id": "9", "email": "b@x.io"})).expect("account");
        assert!(account.lookup_request().is_none());
    }

    #[test]
    fn delete_bodies_use_one_key() {
        assert_eq!(
            serde_json::to_value(DeleteAccountRequest::Single { id: "4".into() }).expect("json"),
            json!({"id": 4})
        );
        assert_eq!(
            serde_json::to_value(DeleteAccountRequest::Batch {
                ids: vec!["1".into(), "2".into()]
            })
            .expect("json"),
            json!({"ids": [1, 2]})
        );
    }

    #[test]
    fn partial_delete_breakdown_decodes() {
        let results: DeleteResults = serde_json::from_value(json!({
            "status": "partial",
            "results": {"success": ["1", 2], "failed": [{"id": 3, "reason": "denied"}]}
        }))
        .expect("results");
        let outcome = results.results.expect("breakdown");
        assert_eq!(outcome.success, vec![RecordId::from("1"), RecordId::from("2")]);
        assert_eq!(outcome.failed[0].reason.as_deref(), Some("denied"));
    }
}
