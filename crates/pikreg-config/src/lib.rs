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

//! Client-side persistence for the provisioning console.
//!
//! Layout: `store.rs` (the injected key/value backend, file or memory),
//! `session.rs` (session id rules and the session store), `preferences.rs`
//! (saved registration preferences with legacy migration).
//!
//! Storage keys mirror the ones the browser console used so an exported
//! local-storage dump can be dropped in as a state file.

pub mod error;
pub mod preferences;
pub mod session;
pub mod store;

pub use error::{ConfigError, ConfigResult};
pub use preferences::{AppConfig, AppConfigPatch, CONFIG_KEY, LEGACY_INVITE_KEY, PreferencesStore};
pub use session::{
    MAX_SESSION_LEN, MIN_SESSION_LEN, SESSION_KEY, Session, SessionId, SessionStore,
    clamp_session_length,
};
pub use store::{FileStore, KeyValueStore, MemoryStore, SharedStore, default_state_path};
