//! Bodies for the four registration steps and the proxy pre-test.
//!
//! Steps 1, 2 and 4 and the proxy pre-test are read by the backend as form
//! fields, so those types expose [`fields`](InitializeForm::fields) instead of
//! a JSON encoding. Booleans are spelled `"true"`/`"false"` because the backend
//! compares the raw field text.

use serde::{Deserialize, Serialize};

fn flag(value: bool) -> String {
    if value { "true" } else { "false" }.to_string()
}

/// Multipart body of `POST /api/initialize`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitializeForm {
    /// Invite code the new account registers under.
    pub invite_code: String,
    /// Email of the account being registered.
    pub email: String,
    /// Route provider traffic through `proxy_url`.
    pub use_proxy: bool,
    /// Let the backend pick a proxy from the pool.
    pub use_proxy_pool: bool,
    /// Route mailbox traffic through the proxy as well.
    pub use_email_proxy: bool,
    /// Explicit proxy URL, sent only when present.
    pub proxy_url: Option<String>,
}

impl InitializeForm {
    /// Field list in submission order.
    #[must_use]
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("invite_code", self.invite_code.clone()),
            ("email", self.email.clone()),
            ("use_proxy", flag(self.use_proxy)),
            ("use_proxy_pool", flag(self.use_proxy_pool)),
            ("use_email_proxy", flag(self.use_email_proxy)),
        ];
        if let Some(url) = &self.proxy_url {
            fields.push(("proxy_url", url.clone()));
        }
        fields
    }
}

/// Multipart body of `POST /api/verify_captcha`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyCaptchaForm {
    /// Account whose captcha challenge is solved.
    pub email: String,
}

impl VerifyCaptchaForm {
    /// Field list in submission order.
    #[must_use]
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![("email", self.email.clone())]
    }
}

/// JSON body of `POST /api/get_email_verification_code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailCodeRequest {
    /// Mailbox address.
    pub email: String,
    /// Mailbox password, used by the IMAP fallback.
    pub password: String,
    /// OAuth refresh token of the mailbox.
    pub token: String,
    /// OAuth client id of the mailbox.
    pub client_id: String,
}

/// Payload of a successful email-code lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailCode {
    /// The code found in the mailbox.
    #[serde(default)]
    pub verification_code: Option<String>,
}

/// Multipart body of `POST /api/register`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterForm {
    /// Account being registered.
    pub email: String,
    /// Code received by email or typed by the operator.
    pub verification_code: String,
}

impl RegisterForm {
    /// Field list in submission order.
    #[must_use]
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("email", self.email.clone()),
            ("verification_code", self.verification_code.clone()),
        ]
    }
}

/// Multipart body of `POST /api/test_proxy`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestProxyForm {
    /// Proxy to check.
    pub proxy_url: String,
}

impl TestProxyForm {
    /// Field list in submission order.
    #[must_use]
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![("proxy_url", self.proxy_url.clone())]
    }
}
