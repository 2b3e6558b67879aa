//! Session bootstrap and the validation gate.

use anyhow::anyhow;
use pikreg_api_models::{ApiOutcome, GenerateSessionRequest};
use pikreg_config::{Session, SessionId, clamp_session_length};
use tracing::{info, warn};

use crate::api;
use crate::cli::OutputFormat;
use crate::client::{AppContext, CliError, CliResult, require_success};
use crate::output::render_session;

const ONBOARDING_HINT: &str =
    "run `pikreg session generate`, `pikreg session create <id>` or `pikreg session use <id>`";

/// Resolve the session for a command that needs one.
///
/// An explicit id wins over the stored one. Either way the id is checked
/// against the backend first; a rejection or an unreachable backend clears
/// the stored id when it was the one being checked.
pub(crate) async fn gate_session(ctx: &AppContext, explicit: Option<&str>) -> CliResult<Session> {
    let id = match explicit {
        Some(raw) => SessionId::parse(raw)?,
        None => ctx
            .sessions
            .load()?
            .ok_or_else(|| CliError::validation(format!("no session stored; {ONBOARDING_HINT}")))?,
    };
    confirm(ctx, &id).await
}

async fn confirm(ctx: &AppContext, id: &SessionId) -> CliResult<Session> {
    let verdict = match api::validate_session(ctx, id.as_str()).await {
        Ok(ApiOutcome::Success { body, .. }) if body.is_valid => Ok(Session {
            id: id.clone(),
            is_admin: body.is_admin,
        }),
        Ok(outcome) => Err(CliError::validation(format!(
            "session {id} was rejected: {}; {ONBOARDING_HINT}",
            outcome.message().unwrap_or("not valid")
        ))),
        Err(err) => Err(CliError::failure(anyhow!(
            "could not validate session {id}: {}; {ONBOARDING_HINT}",
            err.display_message()
        ))),
    };

    match verdict {
        Ok(session) => {
            ctx.sessions.persist(&session.id)?;
            info!(admin = session.is_admin, "session validated");
            Ok(session)
        }
        Err(err) => {
            if ctx.sessions.load()?.as_ref() == Some(id) {
                ctx.sessions.clear()?;
                warn!("session validation failed; stored session cleared");
            } else {
                warn!("session validation failed; stored session kept");
            }
            Err(err)
        }
    }
}

pub(crate) async fn handle_session_show(
    ctx: &AppContext,
    explicit: Option<&str>,
    format: OutputFormat,
) -> CliResult<()> {
    let session = gate_session(ctx, explicit).await?;
    render_session(&session, format)
}

pub(crate) async fn handle_session_use(ctx: &AppContext, raw: &str) -> CliResult<()> {
    let id = SessionId::parse(raw)?;
    let session = confirm(ctx, &id).await?;
    let admin = if session.is_admin { " (admin)" } else { "" };
    println!("using session {}{admin}", session.id);
    Ok(())
}

pub(crate) async fn handle_session_generate(ctx: &AppContext, length: usize) -> CliResult<()> {
    let request = GenerateSessionRequest::Random {
        length: clamp_session_length(length),
    };
    let (_, generated) = require_success(api::generate_session(ctx, &request).await?)?;
    let id = SessionId::parse(&generated.session_id).map_err(|err| {
        CliError::failure(anyhow!("backend generated an unusable session id: {err}"))
    })?;
    ctx.sessions.persist(&id)?;
    info!("session generated");
    println!("created session {id}");
    println!("keep this id to see the same accounts later");
    Ok(())
}

pub(crate) async fn handle_session_create(ctx: &AppContext, raw: &str) -> CliResult<()> {
    let id = SessionId::parse(raw)?;
    let request = GenerateSessionRequest::Custom {
        custom_id: id.as_str().to_string(),
    };
    require_success(api::generate_session(ctx, &request).await?)?;
    ctx.sessions.persist(&id)?;
    info!("custom session registered");
    println!("created session {id}");
    Ok(())
}

pub(crate) fn handle_session_clear(ctx: &AppContext) -> CliResult<()> {
    ctx.sessions.clear()?;
    println!("session cleared");
    Ok(())
}
