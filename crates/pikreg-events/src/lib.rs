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

//! Event payloads streamed by the sequential activation endpoint.
//!
//! The backend answers `POST /api/activate_account_sequential` with a
//! `text/event-stream` body. Each `data: ` line carries one JSON record with a
//! `status` discriminator. This crate owns the typed records and the
//! incremental decoder that turns raw response chunks into those records.
//!
//! Layout: `payloads.rs` (typed events), `frame.rs` (restartable line decoder),
//! `error.rs` (per-frame decode failures).

pub mod error;
pub mod frame;
pub mod payloads;

pub use error::{FrameError, FrameResult};
pub use frame::FrameDecoder;
pub use payloads::{ActivationEvent, ActivationResult, ResultStatus};
