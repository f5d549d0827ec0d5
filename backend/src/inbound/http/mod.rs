//! HTTP inbound adapter: the account pages, probes, and session plumbing.

pub mod accounts;
pub mod error;
pub mod forms;
pub mod health;
pub mod redirect;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;
