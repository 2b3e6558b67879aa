#![forbid(unsafe_code)]
#![warn(
    unused,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]

//! Logging setup shared by the console binaries.
//! Layout: init.rs (subscriber installation), context.rs (per-invocation span), error.rs.

pub mod context;
pub mod error;
pub mod init;

pub use context::{InvocationGuard, new_trace_id};
pub use error::{Result, TelemetryError};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging};
