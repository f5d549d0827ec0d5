//! Driven port for one-way password hashing.

use async_trait::async_trait;

use crate::domain::{Password, PasswordHash, UserId};

use super::define_port_error;

define_port_error! {
    /// Failures raised while producing a new hash.
    pub enum PasswordHashError {
        /// The hashing primitive rejected its input or parameters.
        Hashing { message: String } => "password hashing failed: {message}",
        /// The blocking worker running the hash did not complete.
        Worker { message: String } => "password hashing worker failed: {message}",
    }
}

/// Tri-state verification result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordVerification {
    /// The password does not match, or the stored hash is unusable.
    Failed,
    /// The password matches under current parameters.
    Success,
    /// The password matches but the stored hash uses outdated parameters.
    SuccessRehashNeeded,
}

impl PasswordVerification {
    /// True for either success variant.
    pub fn is_success(self) -> bool {
        !matches!(self, Self::Failed)
    }
}

/// Hashes new passwords and verifies attempts against stored hashes.
///
/// Comparison must be constant-time with respect to the password.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Produce a salted, encoded hash of `password`.
    async fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHashError>;

    /// Check `password` against `stored`.
    ///
    /// `subject` identifies the owner of the hash for diagnostics only.
    async fn verify(
        &self,
        stored: &PasswordHash,
        password: &Password,
        subject: &UserId,
    ) -> PasswordVerification;
}
