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

//! Network-free state for the provisioning console.
//!
//! Everything here is driven by values the caller feeds in: decoded stream
//! events, step outcomes, fetched rows. Nothing performs I/O, so the same
//! machines back the interactive CLI and the scenario tests.
//!
//! Layout: `activation.rs` (sequential activation run and batch tallies),
//! `wizard.rs` (per-account registration state machine and the batch cursor),
//! `accounts.rs` (account batch input parsing), `tables.rs` (filter, sort and
//! delete reconciliation for the table views).

pub mod accounts;
pub mod activation;
pub mod error;
pub mod tables;
pub mod wizard;

pub use accounts::{AccountLine, parse_account_lines};
pub use activation::{
    ActivationSelection, ResultTally, RunSignal, RunStatus, SequentialProgress, SequentialRun,
};
pub use error::{CoreError, CoreResult};
pub use tables::{
    AccountQuery, AccountSort, Keyed, SortDirection, apply_query, parse_timestamp,
    reconcile_deletion, remove_rows,
};
pub use wizard::{AccountState, RegistrationEntry, Wizard, WizardEvent, WizardStep, WizardSummary};
