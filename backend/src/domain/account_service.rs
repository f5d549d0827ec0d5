//! Login and registration orchestration.
//!
//! The service validates the active submission, resolves the user through
//! the [`CredentialStore`], delegates hashing to the [`PasswordHasher`], and
//! turns success into [`SessionClaims`]. Establishing the cookie is left to
//! the inbound adapter.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    AccountCommand, CredentialStore, CredentialStoreError, LoginOutcome, PasswordHashError,
    PasswordHasher, PasswordVerification, RegisterOutcome,
};
use crate::domain::{
    Error, FormErrors, LoginSubmission, NewUser, Password, SessionClaims, SignupSubmission, User,
    normalize, validate_login, validate_signup,
};

/// Single message for every credential mismatch.
///
/// Unknown identifiers and wrong passwords must be indistinguishable.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password.";
/// Message shown when the user name or email is already taken.
pub const DUPLICATE_REGISTRATION_MESSAGE: &str = "Username or email already registered.";
/// Default sliding session window.
pub const DEFAULT_SESSION_WINDOW_MINUTES: i64 = 60;

/// Domain service implementing [`AccountCommand`].
pub struct AccountService<S: ?Sized, H: ?Sized> {
    store: Arc<S>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
    session_window: Duration,
}

impl<S: ?Sized, H: ?Sized> Clone for AccountService<S, H> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            hasher: Arc::clone(&self.hasher),
            clock: Arc::clone(&self.clock),
            session_window: self.session_window,
        }
    }
}

impl<S: ?Sized, H: ?Sized> AccountService<S, H> {
    /// Create a service using the default session window.
    pub fn new(store: Arc<S>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            hasher,
            clock,
            session_window: Duration::minutes(DEFAULT_SESSION_WINDOW_MINUTES),
        }
    }

    /// Override the window used for issued claims.
    #[must_use]
    pub fn with_session_window(mut self, window: Duration) -> Self {
        self.session_window = window;
        self
    }

    /// Window applied to issued claims.
    pub fn session_window(&self) -> Duration {
        self.session_window
    }
}

impl<S, H> AccountService<S, H>
where
    S: CredentialStore + ?Sized,
    H: PasswordHasher + ?Sized,
{
    fn rejected_login() -> LoginOutcome {
        LoginOutcome::Rejected(FormErrors::form(INVALID_CREDENTIALS_MESSAGE))
    }

    fn rejected_registration() -> RegisterOutcome {
        RegisterOutcome::Rejected(FormErrors::form(DUPLICATE_REGISTRATION_MESSAGE))
    }

    fn authenticated(&self, user: &User) -> LoginOutcome {
        LoginOutcome::Authenticated(SessionClaims::for_user(
            user,
            self.clock.utc(),
            self.session_window,
        ))
    }

    /// Best-effort upgrade of an outdated hash; failures are logged only.
    async fn upgrade_hash(&self, user: &User, password: &Password) {
        let upgraded = match self.hasher.hash(password).await {
            Ok(hash) => hash,
            Err(err) => {
                warn!(user_id = %user.id(), error = %err, "password rehash failed");
                return;
            }
        };
        match self.store.update_password_hash(user.id(), &upgraded).await {
            Ok(()) => info!(user_id = %user.id(), "password hash upgraded"),
            Err(err) => {
                warn!(user_id = %user.id(), error = %err, "failed to persist upgraded password hash");
            }
        }
    }
}

#[async_trait]
impl<S, H> AccountCommand for AccountService<S, H>
where
    S: CredentialStore + ?Sized,
    H: PasswordHasher + ?Sized,
{
    async fn login(&self, submission: LoginSubmission) -> Result<LoginOutcome, Error> {
        let credentials = match validate_login(&submission) {
            Ok(credentials) => credentials,
            Err(errors) => return Ok(LoginOutcome::Rejected(errors)),
        };
        let identifier = normalize(credentials.identifier());

        let user = self
            .store
            .get_by_identifier(&identifier)
            .await
            .map_err(map_store_error)?;
        let Some(user) = user else {
            info!(identifier = %identifier, found = false, "login rejected");
            return Ok(Self::rejected_login());
        };

        let verification = self
            .hasher
            .verify(user.password_hash(), credentials.password(), user.id())
            .await;
        match verification {
            PasswordVerification::Failed => {
                info!(identifier = %identifier, found = true, "login rejected");
                Ok(Self::rejected_login())
            }
            PasswordVerification::Success => {
                info!(user_id = %user.id(), "login succeeded");
                Ok(self.authenticated(&user))
            }
            PasswordVerification::SuccessRehashNeeded => {
                info!(user_id = %user.id(), "login succeeded; hash parameters outdated");
                self.upgrade_hash(&user, credentials.password()).await;
                Ok(self.authenticated(&user))
            }
        }
    }

    async fn register(&self, submission: SignupSubmission) -> Result<RegisterOutcome, Error> {
        let details = match validate_signup(&submission) {
            Ok(details) => details,
            Err(errors) => return Ok(RegisterOutcome::Rejected(errors)),
        };

        let taken = self
            .store
            .exists_by_email_or_user_name(details.email(), details.user_name())
            .await
            .map_err(map_store_error)?;
        if taken {
            debug!(user_name = %details.user_name(), "registration rejected: identity taken");
            return Ok(Self::rejected_registration());
        }

        let password_hash = self
            .hasher
            .hash(details.password())
            .await
            .map_err(map_hash_error)?;
        let new_user = NewUser {
            user_name: details.user_name().clone(),
            email: details.email().clone(),
            password_hash,
            created_at: self.clock.utc(),
        };

        match self.store.create_user(new_user).await {
            Ok(user) => {
                info!(user_id = %user.id(), "user registered");
                Ok(RegisterOutcome::Registered(user))
            }
            Err(CredentialStoreError::Duplicate { message }) => {
                debug!(%message, "registration lost uniqueness race");
                Ok(Self::rejected_registration())
            }
            Err(err) => Err(map_store_error(err)),
        }
    }
}

fn map_store_error(error: CredentialStoreError) -> Error {
    match error {
        CredentialStoreError::Connection { message } => {
            Error::service_unavailable(format!("credential store unavailable: {message}"))
        }
        CredentialStoreError::Timeout { operation } => {
            Error::service_unavailable(format!("credential store timed out during {operation}"))
        }
        CredentialStoreError::Query { message } => {
            Error::internal(format!("credential store error: {message}"))
        }
        CredentialStoreError::Duplicate { message } => {
            Error::conflict(format!("credential already registered: {message}"))
        }
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
