//! Saved preference display and updates.

use pikreg_config::AppConfigPatch;
use tracing::info;

use crate::cli::{ConfigSetArgs, OutputFormat};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_config;

pub(crate) fn handle_config_show(ctx: &AppContext, format: OutputFormat) -> CliResult<()> {
    let config = ctx.preferences.load()?;
    render_config(&config, format)
}

pub(crate) fn handle_config_set(
    ctx: &AppContext,
    args: ConfigSetArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let saved_invite_code = if args.clear_invite {
        Some(String::new())
    } else {
        args.invite_code.map(|code| code.trim().to_string())
    };
    let patch = AppConfigPatch {
        saved_invite_code,
        use_proxy: args.use_proxy,
        use_proxy_pool: args.use_proxy_pool,
        use_email_proxy: args.use_email_proxy,
    };
    if patch.is_empty() {
        return Err(CliError::validation(
            "nothing to change; pass at least one setting",
        ));
    }
    let config = ctx.preferences.save(patch)?;
    info!("preferences saved");
    render_config(&config, format)
}
