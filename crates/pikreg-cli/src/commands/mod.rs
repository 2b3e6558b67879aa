//! Command handlers, one module per command group.

pub(crate) mod accounts;
pub(crate) mod activate;
pub(crate) mod config;
pub(crate) mod proxy;
pub(crate) mod register;
pub(crate) mod session;
