//! Batch and streamed sequential activation.

use std::future::Future;

use anyhow::anyhow;
use pikreg_api_models::ActivateRequest;
use pikreg_core::{ActivationSelection, RunSignal, RunStatus, SequentialProgress, SequentialRun};
use pikreg_events::ActivationEvent;
use tracing::{info, warn};

use crate::api;
use crate::cli::{ActivateArgs, OutputFormat};
use crate::client::{AppContext, CliError, CliResult, require_success};
use crate::output::{progress_line, render_activation, render_sequential};
use crate::stream::ActivationStream;

pub(crate) async fn handle_activate(
    ctx: &AppContext,
    args: ActivateArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let selection = ActivationSelection {
        key: args.key,
        names: args
            .names
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect(),
        all: args.all,
        delay_min: args.delay_min,
        delay_max: args.delay_max,
    };
    selection.validate()?;

    if args.sequential {
        run_sequential(ctx, &selection, format).await
    } else {
        run_batch(ctx, &selection, format).await
    }
}

async fn run_batch(
    ctx: &AppContext,
    selection: &ActivationSelection,
    format: OutputFormat,
) -> CliResult<()> {
    let request = ActivateRequest {
        key: selection.key.trim().to_string(),
        names: selection.names.clone(),
        all: selection.all,
    };
    let (message, summary) = require_success(api::activate_with_names(ctx, &request).await?)?;
    info!(results = summary.results.len(), "batch activation finished");
    render_activation(&summary.results, message.as_deref(), format)
}

async fn run_sequential(
    ctx: &AppContext,
    selection: &ActivationSelection,
    format: OutputFormat,
) -> CliResult<()> {
    let mut run = SequentialRun::new();
    run.start();
    let stream = ActivationStream::open(ctx, &selection.to_request()).await?;
    let cancel = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "interrupt handler unavailable; run cannot be cancelled");
            std::future::pending::<()>().await;
        }
    };
    drive(&mut run, stream, cancel).await;

    let progress = run.into_progress();
    render_sequential(&progress, format)?;
    match progress.status {
        RunStatus::Cancelled => {
            eprintln!("run cancelled; the backend may keep processing the batch");
            Ok(())
        }
        RunStatus::Error => Err(CliError::failure(anyhow!(
            "{}",
            progress
                .error
                .unwrap_or_else(|| "activation run failed".to_string())
        ))),
        _ => Ok(()),
    }
}

enum Step {
    Cancelled,
    Next(CliResult<Option<ActivationEvent>>),
}

/// Feed stream events into `run` until it settles or `cancel` fires.
///
/// The stream handle is dropped before the terminal event's effects are
/// reported, so nothing read afterwards can reach the run.
async fn drive<C>(run: &mut SequentialRun, stream: ActivationStream, cancel: C)
where
    C: Future<Output = ()>,
{
    tokio::pin!(cancel);
    let mut stream = Some(stream);

    while let Some(active) = stream.as_mut() {
        let step = tokio::select! {
            biased;
            () = &mut cancel => Step::Cancelled,
            next = active.next_event() => Step::Next(next),
        };

        match step {
            Step::Cancelled => {
                if let Some(mut closed) = stream.take() {
                    closed.close();
                }
                run.cancel();
                info!("activation run cancelled by operator");
            }
            Step::Next(Ok(Some(event))) => {
                if run.apply(&event) == RunSignal::Close
                    && let Some(mut closed) = stream.take()
                {
                    closed.close();
                }
                report(&event, run.progress());
            }
            Step::Next(Ok(None)) => {
                stream = None;
                if !run.stream_ended() {
                    run.fail_transport("activation stream ended before the run completed");
                }
            }
            Step::Next(Err(err)) => {
                stream = None;
                run.fail_transport(format!(
                    "{}; rerun the command to start over",
                    err.display_message()
                ));
            }
        }
    }
}

fn report(event: &ActivationEvent, progress: &SequentialProgress) {
    match event {
        ActivationEvent::Init { .. } => eprintln!("connected; waiting for the batch to start"),
        ActivationEvent::Start { total, .. } => eprintln!("activating {total} account(s)"),
        ActivationEvent::Processing { .. } | ActivationEvent::Delay { .. } => {
            eprintln!("{}", progress_line(progress));
        }
        ActivationEvent::Result { account_result, .. } => eprintln!(
            "{} {}: {}",
            progress_line(progress),
            account_result.account,
            account_result
                .message
                .as_deref()
                .unwrap_or(account_result.status.as_str())
        ),
        ActivationEvent::Complete { .. } | ActivationEvent::Error { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::context_with;
    use httpmock::prelude::*;
    use pikreg_api_models::paths;
    use pikreg_test_support::sse::{frame, sse_body, successful_run};
    use serde_json::json;

    fn args(names: &[&str], sequential: bool) -> ActivateArgs {
        ActivateArgs {
            key: "K-1".into(),
            names: names.iter().map(ToString::to_string).collect(),
            all: false,
            sequential,
            delay_min: 10,
            delay_max: 30,
        }
    }

    fn selection(names: &[&str]) -> ActivationSelection {
        ActivationSelection {
            key: "K-1".into(),
            names: names.iter().map(ToString::to_string).collect(),
            all: false,
            delay_min: 10,
            delay_max: 30,
        }
    }

    fn mock_stream(server: &MockServer, body: String) {
        server.mock(|when, then| {
            when.method(POST).path(paths::ACTIVATE_SEQUENTIAL);
            then.status(200)
                .header("content-type", "text/event-stream")
                .body(body);
        });
    }

    async fn driven(server: &MockServer, names: &[&str], cancel_now: bool) -> SequentialProgress {
        let ctx = context_with(server);
        let mut run = SequentialRun::new();
        run.start();
        let stream = ActivationStream::open(&ctx, &selection(names).to_request())
            .await
            .expect("stream");
        if cancel_now {
            drive(&mut run, stream, std::future::ready(())).await;
        } else {
            drive(&mut run, stream, std::future::pending()).await;
        }
        run.into_progress()
    }

    #[tokio::test]
    async fn three_account_run_completes_with_all_results() {
        let server = MockServer::start_async().await;
        mock_stream(&server, sse_body(&successful_run(&["a", "b", "c"])));

        let progress = driven(&server, &["a", "b", "c"], false).await;
        assert_eq!(progress.status, RunStatus::Completed);
        assert_eq!(progress.percent, 100);
        assert_eq!(progress.results.len(), 3);
        assert!(progress.results.iter().all(|result| result.is_success()));
        assert_eq!(progress.summary.as_deref(), Some("done"));
    }

    #[tokio::test]
    async fn cancel_stops_before_any_result() {
        let server = MockServer::start_async().await;
        mock_stream(&server, sse_body(&successful_run(&["a", "b"])));

        let progress = driven(&server, &["a", "b"], true).await;
        assert_eq!(progress.status, RunStatus::Cancelled);
        assert!(progress.results.is_empty());
    }

    #[tokio::test]
    async fn server_error_keeps_partial_results() {
        let server = MockServer::start_async().await;
        let mut events = successful_run(&["a", "b"]);
        events.truncate(4);
        events.push(json!({"status": "error", "message": "key exhausted"}));
        events.push(json!({"status": "result", "current": 2, "account_result": {"account": "b", "status": "success"}}));
        mock_stream(&server, sse_body(&events));

        let progress = driven(&server, &["a", "b"], false).await;
        assert_eq!(progress.status, RunStatus::Error);
        assert_eq!(progress.error.as_deref(), Some("key exhausted"));
        assert_eq!(progress.results.len(), 1);
    }

    #[tokio::test]
    async fn read_failure_mid_stream_keeps_results_and_offers_rerun() {
        use futures_util::{StreamExt, stream};

        let events = successful_run(&["a", "b"]);
        let body: String = events[..4].iter().map(frame).collect();
        let read_failure = reqwest::Client::new()
            .get("not a url")
            .build()
            .expect_err("invalid url");
        let chunks: Vec<reqwest::Result<Vec<u8>>> =
            vec![Ok(body.into_bytes()), Err(read_failure)];
        let stream = ActivationStream::from_chunks(stream::iter(chunks).boxed());

        let mut run = SequentialRun::new();
        run.start();
        drive(&mut run, stream, std::future::pending()).await;
        let progress = run.into_progress();
        assert_eq!(progress.status, RunStatus::Error);
        assert_eq!(progress.results.len(), 1);
        let error = progress.error.expect("error recorded");
        assert!(error.contains("activation stream interrupted"), "{error}");
        assert!(error.contains("rerun the command to start over"), "{error}");
    }

    #[tokio::test]
    async fn truncated_stream_is_reported_as_interrupted() {
        let server = MockServer::start_async().await;
        let events = successful_run(&["a", "b"]);
        let body: String = events[..4].iter().map(frame).collect();
        mock_stream(&server, body);

        let progress = driven(&server, &["a", "b"], false).await;
        assert_eq!(progress.status, RunStatus::Error);
        assert_eq!(progress.results.len(), 1);
    }

    #[tokio::test]
    async fn sequential_handler_fails_when_backend_aborts() {
        let server = MockServer::start_async().await;
        mock_stream(
            &server,
            sse_body(&[
                json!({"status": "init"}),
                json!({"status": "error", "message": "invalid key"}),
            ]),
        );
        let err = handle_activate(&context_with(&server), args(&["a"], true), OutputFormat::Json)
            .await
            .expect_err("aborted");
        assert_eq!(err.exit_code(), 3);
        assert!(err.display_message().contains("invalid key"));
    }

    #[tokio::test]
    async fn batch_mode_posts_names_and_renders_results() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path(paths::ACTIVATE_WITH_NAMES)
                .header("X-Session-ID", "abc123")
                .json_body(json!({"key": "K-1", "names": ["a", "b"], "all": false}));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "status": "partial",
                    "message": "1 of 2 activated",
                    "results": [
                        {"account": "a", "status": "success", "updated": true},
                        {"account": "b", "status": "error", "message": "banned"}
                    ]
                }));
        });
        handle_activate(&context_with(&server), args(&["a", " b "], false), OutputFormat::Table)
            .await
            .expect("activated");
        mock.assert();
    }

    #[tokio::test]
    async fn empty_selection_is_rejected_locally() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path(paths::ACTIVATE_WITH_NAMES);
            then.status(200);
        });
        let err = handle_activate(&context_with(&server), args(&[" "], false), OutputFormat::Table)
            .await
            .expect_err("nothing selected");
        assert_eq!(err.exit_code(), 2);
        mock.assert_hits(0);
    }
}
