//! Backend endpoint paths, relative to the server origin.

/// `POST` session validation.
pub const SESSION_VALIDATE: &str = "/api/session/validate";
/// `POST` session generation (random length or custom id).
pub const SESSION_GENERATE: &str = "/api/session/generate";
/// `POST` single proxy connectivity check (multipart).
pub const TEST_PROXY: &str = "/api/test_proxy";
/// `POST` registration step 1 (multipart).
pub const INITIALIZE: &str = "/api/initialize";
/// `POST` registration step 2 (multipart).
pub const VERIFY_CAPTCHA: &str = "/api/verify_captcha";
/// `POST` registration step 3.
pub const EMAIL_VERIFICATION_CODE: &str = "/api/get_email_verification_code";
/// `POST` registration step 4 (multipart).
pub const REGISTER: &str = "/api/register";
/// `POST` one-shot batch activation.
pub const ACTIVATE_WITH_NAMES: &str = "/api/activate_account_with_names";
/// `POST` streamed sequential activation.
pub const ACTIVATE_SEQUENTIAL: &str = "/api/activate_account_sequential";
/// `GET` account listing.
pub const FETCH_ACCOUNTS: &str = "/api/fetch_accounts";
/// `POST` single or batch account deletion.
pub const DELETE_ACCOUNT: &str = "/api/delete_account";
/// `GET` proxy pool listing.
pub const PROXY_LIST: &str = "/api/proxy/list";
/// `POST` proxy pool insert.
pub const PROXY_ADD: &str = "/api/proxy/add";
/// `POST` proxy pool removal.
pub const PROXY_REMOVE: &str = "/api/proxy/remove";
/// `POST` proxy pool single test.
pub const PROXY_TEST: &str = "/api/proxy/test";
/// `POST` proxy pool full test.
pub const PROXY_TEST_ALL: &str = "/api/proxy/test-all";
/// `POST` provider VIP lookup.
pub const ACCOUNT_VIP_INFO: &str = "/api/account/vip_info";
/// `POST` provider invite code lookup.
pub const ACCOUNT_INVITE_CODE: &str = "/api/account/invite_code";
/// `POST` provider invite history lookup.
pub const ACCOUNT_INVITE_LIST: &str = "/api/account/invite_list";
