//! Driven port for user credential persistence.
//!
//! Every lookup takes values that are already normalized; the store compares
//! them byte-for-byte. Uniqueness of user names and emails is the store's
//! responsibility, so a racing registration surfaces as
//! [`CredentialStoreError::Duplicate`] rather than a second record.

use async_trait::async_trait;

use crate::domain::identifier::normalize;
use crate::domain::{EmailAddress, NewUser, PasswordHash, User, UserId, UserName};

use super::define_port_error;

define_port_error! {
    /// Failures raised by credential store adapters.
    pub enum CredentialStoreError {
        /// The backing store could not be reached.
        Connection { message: String } => "credential store connection failed: {message}",
        /// A query or mutation failed during execution.
        Query { message: String } => "credential store query failed: {message}",
        /// The operation did not finish within the configured bound.
        Timeout { operation: String } => "credential store timed out during {operation}",
        /// A user with the same user name or email already exists.
        Duplicate { message: String } => "credential already registered: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetch the user with the given normalized email.
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, CredentialStoreError>;

    /// Fetch the user with the given normalized user name.
    async fn get_by_user_name(&self, user_name: &str)
    -> Result<Option<User>, CredentialStoreError>;

    /// Resolve a login identifier, trying the email column first.
    ///
    /// The identifier is normalized again so callers that skip validation
    /// still match stored values.
    async fn get_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, CredentialStoreError> {
        let identifier = normalize(identifier);
        if let Some(user) = self.get_by_email(&identifier).await? {
            return Ok(Some(user));
        }
        self.get_by_user_name(&identifier).await
    }

    /// True when either value already belongs to a stored user.
    async fn exists_by_email_or_user_name(
        &self,
        email: &EmailAddress,
        user_name: &UserName,
    ) -> Result<bool, CredentialStoreError>;

    /// Persist a new user, assigning its identifier.
    async fn create_user(&self, new_user: NewUser) -> Result<User, CredentialStoreError>;

    /// Replace the stored hash for `id` after a parameter upgrade.
    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: &PasswordHash,
    ) -> Result<(), CredentialStoreError>;
}
