//! Subscriber installation.
//!
//! Logs go to stderr so stdout stays reserved for command output that may be
//! piped into other tools.

use once_cell::sync::OnceCell;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Result, TelemetryError};

/// Level used when neither `RUST_LOG` nor `--log-level` says otherwise.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

static INSTALLED_SHA: OnceCell<String> = OnceCell::new();

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Human-readable lines.
    Pretty,
}

impl LogFormat {
    /// Pretty in debug builds, JSON in release builds.
    #[must_use]
    pub const fn infer() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }

    /// Parse `json` or `pretty`; anything else falls back to [`infer`](Self::infer).
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "pretty" => Self::Pretty,
            _ => Self::infer(),
        }
    }
}

/// Settings for [`init_logging`].
#[derive(Debug, Clone)]
pub struct LoggingConfig<'a> {
    /// Filter directive, e.g. `warn` or `pikreg_cli=debug`.
    pub level: &'a str,
    /// Line rendering.
    pub format: LogFormat,
    /// Build identifier attached to the invocation span.
    pub build_sha: &'a str,
}

impl Default for LoggingConfig<'_> {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL,
            format: LogFormat::infer(),
            build_sha: build_sha(),
        }
    }
}

/// Build identifier recorded by [`init_logging`], or `dev` before that.
#[must_use]
pub fn build_sha() -> &'static str {
    INSTALLED_SHA.get().map_or("dev", String::as_str)
}

/// Install the process-wide subscriber.
///
/// `RUST_LOG`, when set and valid, overrides `config.level`.
///
/// # Errors
///
/// Fails when the level directive does not parse or a subscriber is already
/// installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let _ = INSTALLED_SHA.set(config.build_sha.to_string());

    let filter = level_filter(config.level)?;
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false);
    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.format {
        LogFormat::Json => registry.with(stderr_layer.json()).try_init(),
        LogFormat::Pretty => registry.with(stderr_layer).try_init(),
    };
    installed.map_err(|source| TelemetryError::SubscriberInstall { source })
}

fn level_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level).map_err(|source| TelemetryError::InvalidLevel {
        level: level.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names_parse() {
        assert_eq!(LogFormat::from_name("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::from_name(" pretty "), LogFormat::Pretty);
        assert_eq!(LogFormat::from_name("fancy"), LogFormat::infer());
    }

    #[test]
    fn second_install_is_refused() {
        let settings = LoggingConfig {
            level: "info",
            format: LogFormat::Pretty,
            build_sha: "dev",
        };
        let _ = init_logging(&settings);
        assert!(matches!(
            init_logging(&settings),
            Err(TelemetryError::SubscriberInstall { .. })
        ));
    }
}
