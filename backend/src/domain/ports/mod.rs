//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports ([`CredentialStore`], [`PasswordHasher`]) describe what the
//! domain needs from infrastructure. The driving port [`AccountCommand`] is
//! what inbound adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod credential_store;
mod password_hasher;

#[cfg(test)]
pub use account_command::MockAccountCommand;
pub use account_command::{AccountCommand, LoginOutcome, RegisterOutcome};
#[cfg(test)]
pub use credential_store::MockCredentialStore;
pub use credential_store::{CredentialStore, CredentialStoreError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher, PasswordVerification};
