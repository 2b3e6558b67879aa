//! Shared client utilities, error types and response classification for the CLI.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use anyhow::anyhow;
use pikreg_api_models::ApiOutcome;
use pikreg_config::{PreferencesStore, SessionId, SessionStore, SharedStore};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub(crate) const HEADER_SESSION_ID: &str = "X-Session-ID";
pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Command failure, split by whether the operator or the backend is at fault.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Result of a command handler.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<pikreg_config::ConfigError> for CliError {
    fn from(err: pikreg_config::ConfigError) -> Self {
        match err {
            pikreg_config::ConfigError::InvalidSessionId { reason, .. } => Self::validation(reason),
            other => Self::failure(other),
        }
    }
}

impl From<pikreg_core::CoreError> for CliError {
    fn from(err: pikreg_core::CoreError) -> Self {
        match err {
            pikreg_core::CoreError::IllegalTransition { .. }
            | pikreg_core::CoreError::BatchFinished => Self::failure(err),
            other => Self::validation(other.to_string()),
        }
    }
}

/// HTTP clients constructed from CLI options.
#[derive(Clone)]
pub(crate) struct CliDependencies {
    pub(crate) client: Client,
    pub(crate) stream_client: Client,
}

impl CliDependencies {
    /// Build the request client (with the overall timeout) and the stream
    /// client (connect timeout only, since activation runs outlast any ceiling).
    pub(crate) fn new(timeout_secs: u64, trace_id: &str) -> CliResult<Self> {
        let mut default_headers = HeaderMap::new();
        let request_id = HeaderValue::from_str(trace_id).map_err(|_| {
            CliError::failure(anyhow!("trace id {trace_id:?} is not a valid header value"))
        })?;
        default_headers.insert(HEADER_REQUEST_ID, request_id);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .default_headers(default_headers.clone())
            .build()
            .map_err(|err| CliError::failure(anyhow!("request client setup failed: {err}")))?;
        let stream_client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .default_headers(default_headers)
            .build()
            .map_err(|err| CliError::failure(anyhow!("stream client setup failed: {err}")))?;

        Ok(Self {
            client,
            stream_client,
        })
    }
}

/// Clients, backend location and local state shared by every handler.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) client: Client,
    pub(crate) stream_client: Client,
    pub(crate) base_url: Url,
    pub(crate) session: Option<SessionId>,
    pub(crate) sessions: SessionStore,
    pub(crate) preferences: PreferencesStore,
}

impl AppContext {
    pub(crate) fn new(deps: &CliDependencies, base_url: Url, store: &SharedStore) -> Self {
        Self {
            client: deps.client.clone(),
            stream_client: deps.stream_client.clone(),
            base_url,
            session: None,
            sessions: SessionStore::new(store.clone()),
            preferences: PreferencesStore::new(store.clone()),
        }
    }

    /// Resolve an endpoint path against the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> CliResult<Url> {
        self.base_url
            .join(path)
            .map_err(|err| CliError::failure(anyhow!("invalid base URL: {err}")))
    }

    /// Attach the session header when a session is active.
    pub(crate) fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.session {
            Some(session) => builder.header(HEADER_SESSION_ID, session.as_str()),
            None => builder,
        }
    }
}

/// Parse `--api-url`.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))
}

fn problem_message(body: &Value) -> Option<String> {
    ["message", "msg", "error"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .map(str::to_string)
}

/// Classify a non-2xx HTTP response into a CLI error.
pub(crate) async fn classify_problem(response: reqwest::Response) -> CliError {
    let status = response.status();
    let bytes = response.bytes().await.unwrap_or_default();

    let body_text = String::from_utf8_lossy(&bytes).trim().to_string();
    let message = serde_json::from_slice::<Value>(&bytes)
        .ok()
        .as_ref()
        .and_then(problem_message)
        .unwrap_or_else(|| body_text.clone());

    if matches!(
        status,
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY
    ) && !message.is_empty()
    {
        CliError::validation(message)
    } else if message.is_empty() {
        CliError::failure(anyhow!("request failed with status {status}"))
    } else {
        CliError::failure(anyhow!("{message} (status {status})"))
    }
}

/// Decode a response into the tagged outcome, classifying HTTP failures.
pub(crate) async fn decode_outcome<T: DeserializeOwned>(
    response: reqwest::Response,
    endpoint: &str,
) -> CliResult<ApiOutcome<T>> {
    if !response.status().is_success() {
        return Err(classify_problem(response).await);
    }
    let body: Value = response.json().await.map_err(|err| {
        CliError::failure(anyhow!("{endpoint} returned an unreadable body: {err}"))
    })?;
    ApiOutcome::from_value(body).map_err(|err| {
        CliError::failure(anyhow!("{endpoint} returned an unexpected payload: {err}"))
    })
}

/// Unwrap a successful outcome, turning a backend-reported failure into an error.
pub(crate) fn require_success<T>(outcome: ApiOutcome<T>) -> CliResult<(Option<String>, T)> {
    match outcome {
        ApiOutcome::Success { message, body }
        | ApiOutcome::Partial { message, body }
        | ApiOutcome::Info { message, body } => Ok((message, body)),
        ApiOutcome::Error { message } => Err(CliError::failure(anyhow!(message))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use pikreg_api_models::Ack;
    use serde_json::json;

    async fn fetch(server: &MockServer, path: &str) -> reqwest::Response {
        Client::new()
            .get(server.url(path))
            .send()
            .await
            .expect("request")
    }

    #[tokio::test]
    async fn unprocessable_response_is_validation() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/bad");
            then.status(422).json_body(json!({"status": "error", "message": "bad id"}));
        });
        let err = classify_problem(fetch(&server, "/bad").await).await;
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.display_message(), "bad id");
    }

    #[tokio::test]
    async fn server_error_reads_msg_field() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/boom");
            then.status(500).json_body(json!({"status": "error", "msg": "mailbox down"}));
        });
        let err = classify_problem(fetch(&server, "/boom").await).await;
        assert_eq!(err.exit_code(), 3);
        assert!(err.display_message().contains("mailbox down"));
    }

    #[tokio::test]
    async fn empty_error_body_reports_status() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/empty");
            then.status(502);
        });
        let err = classify_problem(fetch(&server, "/empty").await).await;
        assert!(err.display_message().contains("502"));
    }

    #[tokio::test]
    async fn logical_failure_surfaces_payload_message() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/logical");
            then.status(200)
                .json_body(json!({"status": "error", "message": "invite code used up"}));
        });
        let outcome = decode_outcome::<Ack>(fetch(&server, "/logical").await, "/logical")
            .await
            .expect("decoded");
        let err = require_success(outcome).expect_err("backend failure");
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.display_message(), "invite code used up");
    }

    #[test]
    fn invalid_session_maps_to_validation() {
        let err: CliError = pikreg_config::SessionId::parse("ab")
            .expect_err("too short")
            .into();
        assert_eq!(err.exit_code(), 2);
        assert!(err.display_message().contains("6-20"));
    }
}
