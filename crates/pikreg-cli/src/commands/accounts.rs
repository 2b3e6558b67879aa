//! Account listing, deletion and provider lookups.

use pikreg_api_models::{DeleteAccountRequest, DeleteFailure, RecordId, paths};
use pikreg_core::{AccountQuery, apply_query, reconcile_deletion};
use tracing::info;

use crate::api;
use crate::cli::{AccountDeleteArgs, AccountListArgs, LookupKind, OutputFormat};
use crate::client::{AppContext, CliError, CliResult, require_success};
use crate::output::{render_accounts, render_deletion, render_provider_payload};

pub(crate) async fn handle_accounts_list(
    ctx: &AppContext,
    args: AccountListArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let (_, list) = require_success(api::fetch_accounts(ctx).await?)?;
    let query = AccountQuery {
        direction: args.direction(),
        search: args.search,
        sort: args.sort.into(),
    };
    let rows = apply_query(&list.accounts, &query);
    render_accounts(&rows, list.is_admin, format)
}

pub(crate) async fn handle_accounts_delete(
    ctx: &AppContext,
    args: AccountDeleteArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let requested: Vec<RecordId> = args
        .ids
        .iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .map(RecordId::from)
        .collect();
    let request = match requested.as_slice() {
        [] => return Err(CliError::validation("select at least one account to delete")),
        [id] => DeleteAccountRequest::Single { id: id.clone() },
        _ => DeleteAccountRequest::Batch {
            ids: requested.clone(),
        },
    };

    let outcome = api::delete_accounts(ctx, &request).await?;
    let removed = reconcile_deletion(&requested, &outcome);
    let (message, body) = require_success(outcome)?;
    let mut failed: Vec<DeleteFailure> = body
        .results
        .map(|breakdown| breakdown.failed)
        .unwrap_or_default();
    for id in &requested {
        if !removed.contains(id) && !failed.iter().any(|failure| &failure.id == id) {
            failed.push(DeleteFailure {
                id: id.clone(),
                reason: None,
            });
        }
    }
    info!(removed = removed.len(), kept = failed.len(), "accounts deleted");
    render_deletion(&removed, &failed, message.as_deref(), format)
}

pub(crate) async fn handle_accounts_lookup(
    ctx: &AppContext,
    kind: LookupKind,
    raw_id: &str,
    format: OutputFormat,
) -> CliResult<()> {
    let id = RecordId::from(raw_id.trim());
    let (_, list) = require_success(api::fetch_accounts(ctx).await?)?;
    let account = list
        .accounts
        .iter()
        .find(|account| account.id == id)
        .ok_or_else(|| {
            CliError::validation(format!("account {id} is not visible to this session"))
        })?;
    let request = account.lookup_request().ok_or_else(|| {
        CliError::validation(format!("account {id} has no stored token or device id"))
    })?;

    let path = match kind {
        LookupKind::VipInfo => paths::ACCOUNT_VIP_INFO,
        LookupKind::InviteCode => paths::ACCOUNT_INVITE_CODE,
        LookupKind::InviteList => paths::ACCOUNT_INVITE_LIST,
    };
    let (_, payload) = require_success(api::account_lookup(ctx, path, &request).await?)?;
    render_provider_payload(&payload.data, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::context_with;
    use crate::cli::SortArg;
    use httpmock::prelude::*;
    use pikreg_test_support::fixtures::account_row;
    use serde_json::json;

    fn delete_args(ids: &[&str]) -> AccountDeleteArgs {
        AccountDeleteArgs {
            ids: ids.iter().map(ToString::to_string).collect(),
        }
    }

    #[tokio::test]
    async fn list_filters_rows_by_email() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path(paths::FETCH_ACCOUNTS)
                .header("X-Session-ID", "abc123");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "status": "success",
                    "accounts": [account_row(1, "alpha@example.com", 2), account_row(2, "beta@example.com", 5)]
                }));
        });
        let args = AccountListArgs {
            search: Some("ALPHA".into()),
            sort: SortArg::Created,
            asc: true,
            desc: false,
        };
        handle_accounts_list(&context_with(&server), args, OutputFormat::Table)
            .await
            .expect("listed");
        mock.assert();
    }

    #[tokio::test]
    async fn empty_account_list_is_not_an_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path(paths::FETCH_ACCOUNTS);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"status": "info", "message": "no accounts", "accounts": []}));
        });
        handle_accounts_list(
            &context_with(&server),
            AccountListArgs::default(),
            OutputFormat::Json,
        )
        .await
        .expect("listed");
    }

    #[tokio::test]
    async fn single_delete_posts_one_id() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path(paths::DELETE_ACCOUNT)
                .json_body(json!({"id": 4}));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"status": "success", "message": "deleted"}));
        });
        handle_accounts_delete(&context_with(&server), delete_args(&["4"]), OutputFormat::Table)
            .await
            .expect("deleted");
        mock.assert();
    }

    #[tokio::test]
    async fn partial_batch_delete_succeeds_with_breakdown() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path(paths::DELETE_ACCOUNT)
                .json_body(json!({"ids": [1, 2, 3]}));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "status": "partial",
                    "message": "2 of 3 deleted",
                    "results": {"success": ["1", "2"], "failed": [{"id": "3", "reason": "not owned"}]}
                }));
        });
        handle_accounts_delete(
            &context_with(&server),
            delete_args(&["1", "2", "3"]),
            OutputFormat::Json,
        )
        .await
        .expect("partial delete");
        mock.assert();
    }

    #[tokio::test]
    async fn failed_delete_reports_backend_message() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path(paths::DELETE_ACCOUNT);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"status": "error", "message": "nothing deleted"}));
        });
        let err = handle_accounts_delete(
            &context_with(&server),
            delete_args(&["1", "2"]),
            OutputFormat::Table,
        )
        .await
        .expect_err("refused");
        assert_eq!(err.display_message(), "nothing deleted");
    }

    #[tokio::test]
    async fn blank_ids_are_rejected_locally() {
        let server = MockServer::start_async().await;
        let err = handle_accounts_delete(&context_with(&server), delete_args(&[" "]), OutputFormat::Table)
            .await
            .expect_err("blank");
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn lookup_sends_stored_credentials() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path(paths::FETCH_ACCOUNTS);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"status": "success", "accounts": [account_row(9, "vip@example.com", 1)]}));
        });
        let lookup = server.mock(|when, then| {
            when.method(POST)
                .path(paths::ACCOUNT_VIP_INFO)
                .json_body(json!({
                    "token": "token9",
                    "device_id": "device9",
                    "client_id": "YNxT9w7GMdWvEOKa",
                    "captcha_token": "captcha9"
                }));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"status": "success", "data": {"type": "platinum", "expire": "2025-01-01"}}));
        });
        handle_accounts_lookup(
            &context_with(&server),
            LookupKind::VipInfo,
            "9",
            OutputFormat::Table,
        )
        .await
        .expect("looked up");
        lookup.assert();
    }

    #[tokio::test]
    async fn lookup_of_unknown_account_is_a_validation_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path(paths::FETCH_ACCOUNTS);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"status": "success", "accounts": [account_row(9, "vip@example.com", 1)]}));
        });
        let err = handle_accounts_lookup(
            &context_with(&server),
            LookupKind::InviteCode,
            "10",
            OutputFormat::Table,
        )
        .await
        .expect_err("unknown");
        assert_eq!(err.exit_code(), 2);
    }
}
