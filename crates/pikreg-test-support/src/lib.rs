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

//! Shared test helpers used across suites.
//! Layout: fixtures.rs (backend payloads and scratch state files), sse.rs (event-stream bodies).

pub mod fixtures;
pub mod sse;
