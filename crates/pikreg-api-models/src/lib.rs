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
//! Shared HTTP DTOs for the provisioning backend.
//!
//! Every endpoint answers with a JSON object carrying a `status` field. The
//! [`ApiOutcome`] wrapper reads that discriminator once so callers match on
//! variants instead of probing optional fields. Request types serialise to the
//! exact bodies the backend reads, including the multipart field lists used by
//! the registration steps.

pub mod accounts;
pub mod activation;
pub mod ids;
pub mod outcome;
pub mod paths;
pub mod proxies;
pub mod registration;
pub mod session;

pub use accounts::{
    Account, AccountList, AccountLookupRequest, DeleteAccountRequest, DeleteFailure,
    DeleteOutcome, DeleteResults, ProviderPayload,
};
pub use activation::{ActivateRequest, ActivationSummary, SequentialActivateRequest};
pub use ids::RecordId;
pub use outcome::{Ack, ApiOutcome, ApiStatus};
pub use pikreg_events::{ActivationEvent, ActivationResult, ResultStatus};
pub use proxies::{
    Proxy, ProxyBatchReply, ProxyBatchReport, ProxyList, ProxyCheck, ProxyRemoveRequest,
    ProxyTestReply, ProxyUrlRequest,
};
pub use registration::{
    EmailCode, EmailCodeRequest, InitializeForm, RegisterForm, TestProxyForm, VerifyCaptchaForm,
};
pub use session::{
    GenerateSessionRequest, GeneratedSession, SessionValidation, ValidateSessionRequest,
};
