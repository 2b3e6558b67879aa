//! Output renderers and formatting helpers for CLI commands.
//!
//! Table output goes to stdout; progress lines of long-running commands go to
//! stderr so `--output json` stays machine readable.

use anyhow::anyhow;
use pikreg_api_models::{
    Account, ActivationResult, DeleteFailure, Proxy, ProxyBatchReport, ProxyCheck, RecordId,
};
use pikreg_config::{AppConfig, Session};
use pikreg_core::{ResultTally, SequentialProgress, Wizard, WizardSummary};
use serde::Serialize;
use serde_json::{Value, json};

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

pub(crate) fn render_session(session: &Session, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&json!({
            "session_id": session.id.as_str(),
            "is_admin": session.is_admin,
        })),
        OutputFormat::Table => {
            println!("session: {}", session.id);
            println!("admin: {}", yes_no(session.is_admin));
            Ok(())
        }
    }
}

pub(crate) fn render_config(config: &AppConfig, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(config),
        OutputFormat::Table => {
            println!(
                "invite code: {}",
                config.invite_code().unwrap_or("<not saved>")
            );
            println!("use proxy: {}", yes_no(config.use_proxy));
            println!("use proxy pool: {}", yes_no(config.use_proxy_pool));
            println!("use email proxy: {}", yes_no(config.use_email_proxy));
            Ok(())
        }
    }
}

pub(crate) fn render_accounts(
    accounts: &[&Account],
    is_admin: bool,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&json!({
            "is_admin": is_admin,
            "accounts": accounts,
        })),
        OutputFormat::Table => {
            if is_admin {
                println!(
                    "{:<6} {:<36} {:<12} {:>5} {:<20} CREATED",
                    "ID", "EMAIL", "SESSION", "ACT", "LAST ACTIVATION"
                );
            } else {
                println!(
                    "{:<6} {:<36} {:>5} {:<20} CREATED",
                    "ID", "EMAIL", "ACT", "LAST ACTIVATION"
                );
            }
            for account in accounts {
                let last = account.last_activation_time.as_deref().unwrap_or("-");
                let created = account.created_at.as_deref().unwrap_or("-");
                if is_admin {
                    println!(
                        "{:<6} {:<36} {:<12} {:>5} {:<20} {}",
                        account.id,
                        account.email,
                        account.session_id.as_deref().unwrap_or("-"),
                        account.activation_status,
                        last,
                        created
                    );
                } else {
                    println!(
                        "{:<6} {:<36} {:>5} {:<20} {}",
                        account.id, account.email, account.activation_status, last, created
                    );
                }
            }
            println!("{} account(s)", accounts.len());
            Ok(())
        }
    }
}

pub(crate) fn render_deletion(
    removed: &[RecordId],
    failed: &[DeleteFailure],
    message: Option<&str>,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&json!({
            "message": message,
            "removed": removed,
            "failed": failed,
        })),
        OutputFormat::Table => {
            if let Some(message) = message {
                println!("{message}");
            }
            for id in removed {
                println!("deleted {id}");
            }
            for failure in failed {
                println!(
                    "kept {}: {}",
                    failure.id,
                    failure.reason.as_deref().unwrap_or("no reason given")
                );
            }
            Ok(())
        }
    }
}

pub(crate) fn render_provider_payload(payload: &Value, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(payload),
        OutputFormat::Table => {
            match payload {
                Value::Object(map) => {
                    for (key, value) in map {
                        println!("{key}: {}", scalar_text(value));
                    }
                }
                other => println!("{}", scalar_text(other)),
            }
            Ok(())
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

pub(crate) fn render_proxies(proxies: &[Proxy], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&json!({ "proxies": proxies })),
        OutputFormat::Table => {
            println!(
                "{:<6} {:<8} {:<7} {:>9} {:>7} URL",
                "ID", "PROTO", "ACTIVE", "LATENCY", "OK/FAIL"
            );
            for proxy in proxies {
                let latency = proxy
                    .response_time
                    .map_or_else(|| "-".to_string(), format_seconds);
                println!(
                    "{:<6} {:<8} {:<7} {:>9} {:>7} {}",
                    proxy.id,
                    proxy.protocol,
                    yes_no(proxy.is_active),
                    latency,
                    format!("{}/{}", proxy.success_count, proxy.fail_count),
                    proxy.proxy_url
                );
            }
            Ok(())
        }
    }
}

pub(crate) fn render_check(check: &ProxyCheck, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(check),
        OutputFormat::Table => {
            println!("reachable: {}", yes_no(check.success));
            if let Some(seconds) = check.response_time {
                println!("response time: {}", format_seconds(seconds));
            }
            if let Some(code) = check.status_code {
                println!("status code: {code}");
            }
            if let Some(error) = &check.error {
                println!("error: {error}");
            }
            Ok(())
        }
    }
}

pub(crate) fn render_check_batch(report: &ProxyBatchReport, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Table => {
            println!(
                "{}/{} proxies reachable ({} tested, {} failed)",
                report.success, report.total, report.tested, report.failed
            );
            Ok(())
        }
    }
}

pub(crate) fn render_activation(
    results: &[ActivationResult],
    message: Option<&str>,
    format: OutputFormat,
) -> CliResult<()> {
    let tally = ResultTally::of(results);
    match format {
        OutputFormat::Json => print_json(&json!({
            "message": message,
            "succeeded": tally.succeeded,
            "failed": tally.failed,
            "results": results,
        })),
        OutputFormat::Table => {
            println!("{:<36} {:<8} MESSAGE", "ACCOUNT", "STATUS");
            for result in results {
                println!(
                    "{:<36} {:<8} {}",
                    result.account,
                    result.status.as_str(),
                    result.message.as_deref().unwrap_or("")
                );
            }
            if let Some(message) = message {
                println!("{message}");
            }
            println!("{} succeeded, {} failed", tally.succeeded, tally.failed);
            Ok(())
        }
    }
}

/// One progress line for a sequential run, written to stderr.
pub(crate) fn progress_line(progress: &SequentialProgress) -> String {
    let mut line = format!(
        "[{:>3}%] {}/{}",
        progress.percent, progress.current, progress.total
    );
    if let Some(account) = &progress.current_account {
        line.push(' ');
        line.push_str(account);
    }
    if let Some(seconds) = progress.delay_seconds {
        line.push_str(&format!(" (next in {})", format_seconds(seconds)));
    }
    line
}

pub(crate) fn render_sequential(
    progress: &SequentialProgress,
    format: OutputFormat,
) -> CliResult<()> {
    let message = progress.summary.as_deref().or(progress.error.as_deref());
    match format {
        OutputFormat::Json => {
            let tally = ResultTally::of(&progress.results);
            print_json(&json!({
                "status": progress.status.as_str(),
                "total": progress.total,
                "percent": progress.percent,
                "message": message,
                "succeeded": tally.succeeded,
                "failed": tally.failed,
                "results": progress.results,
            }))
        }
        OutputFormat::Table => {
            println!("run {}", progress.status.as_str());
            render_activation(&progress.results, message, format)
        }
    }
}

pub(crate) fn render_wizard(wizard: &Wizard, format: OutputFormat) -> CliResult<()> {
    let summary = wizard.summary();
    match format {
        OutputFormat::Json => {
            let accounts: Vec<Value> = wizard
                .entries()
                .iter()
                .map(|entry| {
                    json!({
                        "email": entry.account.email,
                        "state": entry.state.label(),
                        "skipped": entry.skipped,
                    })
                })
                .collect();
            print_json(&json!({
                "succeeded": summary.succeeded,
                "failed": summary.failed,
                "skipped": summary.skipped,
                "remaining": summary.remaining,
                "accounts": accounts,
            }))
        }
        OutputFormat::Table => {
            println!("{:<36} STATE", "ACCOUNT");
            for entry in wizard.entries() {
                let label = if entry.skipped {
                    "skipped"
                } else {
                    entry.state.label()
                };
                println!("{:<36} {label}", entry.account.email);
            }
            println!("{}", summary_line(summary, wizard.is_finished()));
            Ok(())
        }
    }
}

pub(crate) fn summary_line(summary: WizardSummary, finished: bool) -> String {
    if finished {
        format!(
            "all processed: {} registered, {} failed, {} skipped",
            summary.succeeded,
            summary.failed.saturating_sub(summary.skipped),
            summary.skipped
        )
    } else {
        format!(
            "stopped: {} registered, {} failed, {} skipped, {} not attempted",
            summary.succeeded,
            summary.failed.saturating_sub(summary.skipped),
            summary.skipped,
            summary.remaining
        )
    }
}

const fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

pub(crate) fn format_seconds(seconds: f64) -> String {
    if seconds < 1.0 {
        format!("{:.0}ms", seconds * 1000.0)
    } else {
        format!("{seconds:.1}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pikreg_core::RunStatus;

    #[test]
    fn format_seconds_switches_units() {
        assert_eq!(format_seconds(0.25), "250ms");
        assert_eq!(format_seconds(12.0), "12.0s");
    }

    #[test]
    fn progress_line_includes_account_and_delay() {
        let progress = SequentialProgress {
            total: 3,
            current: 2,
            current_account: Some("beta".into()),
            status: RunStatus::Running,
            delay_seconds: Some(2.5),
            percent: 61,
            ..SequentialProgress::default()
        };
        assert_eq!(progress_line(&progress), "[ 61%] 2/3 beta (next in 2.5s)");
    }

    #[test]
    fn summary_line_distinguishes_finished_batches() {
        let done = WizardSummary {
            succeeded: 2,
            failed: 1,
            skipped: 1,
            remaining: 0,
        };
        assert_eq!(
            summary_line(done, true),
            "all processed: 2 registered, 0 failed, 1 skipped"
        );
        let stopped = WizardSummary {
            failed: 2,
            remaining: 2,
            ..done
        };
        assert_eq!(
            summary_line(stopped, false),
            "stopped: 2 registered, 1 failed, 1 skipped, 2 not attempted"
        );
    }
}
