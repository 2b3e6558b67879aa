//! Per-invocation tracing context.

use tracing::span::EnteredSpan;
use uuid::Uuid;

use crate::init::build_sha;

/// Fresh identifier for one CLI invocation, sent as `x-request-id`.
#[must_use]
pub fn new_trace_id() -> String {
    Uuid::new_v4().to_string()
}

/// Keeps the invocation span entered until dropped.
#[derive(Debug)]
pub struct InvocationGuard {
    _span: EnteredSpan,
}

impl InvocationGuard {
    /// Enter a root span tagged with the command name and trace id.
    #[must_use]
    pub fn new(command: &str, trace_id: &str) -> Self {
        let span = tracing::info_span!(
            "invocation",
            command = %command,
            trace_id = %trace_id,
            build_sha = %build_sha()
        );
        Self {
            _span: span.entered(),
        }
    }
}
