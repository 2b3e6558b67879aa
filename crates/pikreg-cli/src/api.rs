//! One function per backend endpoint.
//!
//! Every call attaches the active session header, decodes the `status`
//! envelope into an [`ApiOutcome`] and leaves interpretation to the caller.

use anyhow::anyhow;
use pikreg_api_models::{
    AccountList, AccountLookupRequest, Ack, ActivateRequest, ActivationSummary, ApiOutcome,
    DeleteAccountRequest, DeleteResults, EmailCode, EmailCodeRequest, GenerateSessionRequest,
    GeneratedSession, InitializeForm, ProviderPayload, ProxyBatchReply, ProxyList,
    ProxyRemoveRequest, ProxyTestReply, ProxyUrlRequest, RegisterForm, SessionValidation,
    TestProxyForm, ValidateSessionRequest, VerifyCaptchaForm, paths,
};
use reqwest::multipart::Form;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::client::{AppContext, CliError, CliResult, decode_outcome};

async fn post_json<B, T>(ctx: &AppContext, path: &str, body: &B) -> CliResult<ApiOutcome<T>>
where
    B: Serialize + Sync + ?Sized,
    T: DeserializeOwned,
{
    let url = ctx.endpoint(path)?;
    debug!(endpoint = path, "sending JSON request");
    let response = ctx
        .authorize(ctx.client.post(url))
        .json(body)
        .send()
        .await
        .map_err(|err| CliError::failure(anyhow!("request to {path} failed: {err}")))?;
    decode_outcome(response, path).await
}

async fn post_form<T>(
    ctx: &AppContext,
    path: &str,
    fields: Vec<(&'static str, String)>,
) -> CliResult<ApiOutcome<T>>
where
    T: DeserializeOwned,
{
    let url = ctx.endpoint(path)?;
    debug!(endpoint = path, fields = fields.len(), "sending form request");
    let form = fields
        .into_iter()
        .fold(Form::new(), |form, (name, value)| form.text(name, value));
    let response = ctx
        .authorize(ctx.client.post(url))
        .multipart(form)
        .send()
        .await
        .map_err(|err| CliError::failure(anyhow!("request to {path} failed: {err}")))?;
    decode_outcome(response, path).await
}

async fn get_json<T>(ctx: &AppContext, path: &str) -> CliResult<ApiOutcome<T>>
where
    T: DeserializeOwned,
{
    let url = ctx.endpoint(path)?;
    debug!(endpoint = path, "sending GET request");
    let response = ctx
        .authorize(ctx.client.get(url))
        .send()
        .await
        .map_err(|err| CliError::failure(anyhow!("request to {path} failed: {err}")))?;
    decode_outcome(response, path).await
}

pub(crate) async fn validate_session(
    ctx: &AppContext,
    session_id: &str,
) -> CliResult<ApiOutcome<SessionValidation>> {
    let body = ValidateSessionRequest {
        session_id: session_id.to_string(),
    };
    post_json(ctx, paths::SESSION_VALIDATE, &body).await
}

pub(crate) async fn generate_session(
    ctx: &AppContext,
    request: &GenerateSessionRequest,
) -> CliResult<ApiOutcome<GeneratedSession>> {
    post_json(ctx, paths::SESSION_GENERATE, request).await
}

pub(crate) async fn test_proxy(ctx: &AppContext, form: &TestProxyForm) -> CliResult<ApiOutcome<Ack>> {
    post_form(ctx, paths::TEST_PROXY, form.fields()).await
}

pub(crate) async fn initialize(ctx: &AppContext, form: &InitializeForm) -> CliResult<ApiOutcome<Ack>> {
    post_form(ctx, paths::INITIALIZE, form.fields()).await
}

pub(crate) async fn verify_captcha(
    ctx: &AppContext,
    form: &VerifyCaptchaForm,
) -> CliResult<ApiOutcome<Ack>> {
    post_form(ctx, paths::VERIFY_CAPTCHA, form.fields()).await
}

pub(crate) async fn email_verification_code(
    ctx: &AppContext,
    request: &EmailCodeRequest,
) -> CliResult<ApiOutcome<EmailCode>> {
    post_json(ctx, paths::EMAIL_VERIFICATION_CODE, request).await
}

pub(crate) async fn register(ctx: &AppContext, form: &RegisterForm) -> CliResult<ApiOutcome<Ack>> {
    post_form(ctx, paths::REGISTER, form.fields()).await
}

pub(crate) async fn activate_with_names(
    ctx: &AppContext,
    request: &ActivateRequest,
) -> CliResult<ApiOutcome<ActivationSummary>> {
    post_json(ctx, paths::ACTIVATE_WITH_NAMES, request).await
}

pub(crate) async fn fetch_accounts(ctx: &AppContext) -> CliResult<ApiOutcome<AccountList>> {
    get_json(ctx, paths::FETCH_ACCOUNTS).await
}

pub(crate) async fn delete_accounts(
    ctx: &AppContext,
    request: &DeleteAccountRequest,
) -> CliResult<ApiOutcome<DeleteResults>> {
    post_json(ctx, paths::DELETE_ACCOUNT, request).await
}

pub(crate) async fn list_proxies(ctx: &AppContext) -> CliResult<ApiOutcome<ProxyList>> {
    get_json(ctx, paths::PROXY_LIST).await
}

pub(crate) async fn add_proxy(ctx: &AppContext, proxy_url: &str) -> CliResult<ApiOutcome<Ack>> {
    let body = ProxyUrlRequest {
        proxy_url: proxy_url.to_string(),
    };
    post_json(ctx, paths::PROXY_ADD, &body).await
}

pub(crate) async fn remove_proxy(
    ctx: &AppContext,
    request: &ProxyRemoveRequest,
) -> CliResult<ApiOutcome<Ack>> {
    post_json(ctx, paths::PROXY_REMOVE, request).await
}

pub(crate) async fn check_proxy(
    ctx: &AppContext,
    proxy_url: &str,
) -> CliResult<ApiOutcome<ProxyTestReply>> {
    let body = ProxyUrlRequest {
        proxy_url: proxy_url.to_string(),
    };
    post_json(ctx, paths::PROXY_TEST, &body).await
}

pub(crate) async fn check_all_proxies(ctx: &AppContext) -> CliResult<ApiOutcome<ProxyBatchReply>> {
    post_json(ctx, paths::PROXY_TEST_ALL, &serde_json::json!({})).await
}

/// Provider look-ups share one body shape; `path` picks the endpoint.
pub(crate) async fn account_lookup(
    ctx: &AppContext,
    path: &str,
    request: &AccountLookupRequest,
) -> CliResult<ApiOutcome<ProviderPayload>> {
    post_json(ctx, path, request).await
}
