//! Driving port for the login and registration use-cases.
//!
//! Inbound adapters depend on this trait rather than on
//! [`crate::domain::AccountService`], so handler tests can substitute a
//! double without wiring a store or a hasher.

use async_trait::async_trait;

use crate::domain::{
    Error, FormErrors, LoginSubmission, SessionClaims, SignupSubmission, User,
};

/// Result of a login attempt that reached a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials matched; the caller should establish a session.
    Authenticated(SessionClaims),
    /// Validation or credential failure to redisplay.
    Rejected(FormErrors),
}

/// Result of a registration attempt that reached a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The account was created. No session is established.
    Registered(User),
    /// Validation failure or an already registered identity.
    Rejected(FormErrors),
}

/// Account use-cases exposed to inbound adapters.
///
/// `Err` is reserved for infrastructure failures; every user-facing
/// rejection is an `Ok(..Rejected)` value.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    async fn login(&self, submission: LoginSubmission) -> Result<LoginOutcome, Error>;

    async fn register(&self, submission: SignupSubmission) -> Result<RegisterOutcome, Error>;
}
