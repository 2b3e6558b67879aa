//! Proxy pool management and connectivity checks.

use pikreg_api_models::{ProxyRemoveRequest, RecordId, TestProxyForm};
use tracing::{info, warn};

use crate::api;
use crate::cli::OutputFormat;
use crate::client::{AppContext, CliError, CliResult, require_success};
use crate::output::{render_check, render_check_batch, render_proxies};

fn proxy_url_arg(raw: &str) -> CliResult<String> {
    let url = raw.trim();
    if url.is_empty() {
        return Err(CliError::validation("proxy URL must not be empty"));
    }
    Ok(url.to_string())
}

/// Whether the URL names a scheme the registration proxy check understands.
fn has_http_scheme(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Pre-registration reachability check for a proxy.
pub(crate) async fn handle_test_proxy(ctx: &AppContext, raw: &str) -> CliResult<()> {
    let proxy_url = proxy_url_arg(raw)?;
    if !has_http_scheme(&proxy_url) {
        warn!(proxy = %proxy_url, "proxy URL has no http(s) scheme");
        eprintln!("warning: proxy URL should start with http:// or https://");
    }
    let form = TestProxyForm { proxy_url };
    let (message, _) = require_success(api::test_proxy(ctx, &form).await?)?;
    println!("{}", message.as_deref().unwrap_or("proxy is reachable"));
    Ok(())
}

pub(crate) async fn handle_proxy_list(ctx: &AppContext, format: OutputFormat) -> CliResult<()> {
    let (_, list) = require_success(api::list_proxies(ctx).await?)?;
    render_proxies(&list.proxies, format)
}

pub(crate) async fn handle_proxy_add(ctx: &AppContext, raw: &str) -> CliResult<()> {
    let proxy_url = proxy_url_arg(raw)?;
    let (message, _) = require_success(api::add_proxy(ctx, &proxy_url).await?)?;
    info!("proxy added");
    println!("{}", message.as_deref().unwrap_or("proxy added"));
    Ok(())
}

pub(crate) async fn handle_proxy_remove(ctx: &AppContext, raw: &str) -> CliResult<()> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(CliError::validation("proxy id must not be empty"));
    }
    let request = ProxyRemoveRequest {
        proxy_id: RecordId::from(id),
    };
    let (message, _) = require_success(api::remove_proxy(ctx, &request).await?)?;
    info!(proxy_id = %request.proxy_id, "proxy removed");
    println!("{}", message.as_deref().unwrap_or("proxy removed"));
    Ok(())
}

pub(crate) async fn handle_proxy_test(
    ctx: &AppContext,
    raw: &str,
    format: OutputFormat,
) -> CliResult<()> {
    let proxy_url = proxy_url_arg(raw)?;
    let (_, reply) = require_success(api::check_proxy(ctx, &proxy_url).await?)?;
    render_check(&reply.test_result, format)
}

pub(crate) async fn handle_proxy_test_all(ctx: &AppContext, format: OutputFormat) -> CliResult<()> {
    let (_, reply) = require_success(api::check_all_proxies(ctx).await?)?;
    render_check_batch(&reply.results, format)
}
