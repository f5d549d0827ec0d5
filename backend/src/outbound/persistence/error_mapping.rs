//! Diesel and pool failures mapped onto [`CredentialStoreError`].

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::CredentialStoreError;

use super::pool::PoolError;

/// Checkout and build failures mean the database is unreachable.
pub(super) fn map_pool_error(error: PoolError) -> CredentialStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            CredentialStoreError::connection(message)
        }
    }
}

/// Classify a Diesel error raised while running `operation`.
pub(super) fn map_diesel_error(error: DieselError, operation: &str) -> CredentialStoreError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), %operation, "diesel operation failed");
        }
        _ => debug!(error = %error, %operation, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            CredentialStoreError::duplicate(
                info.constraint_name()
                    .unwrap_or("unique constraint")
                    .to_owned(),
            )
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            CredentialStoreError::connection("database connection closed")
        }
        DieselError::NotFound => CredentialStoreError::query("record not found"),
        _ => CredentialStoreError::query(format!("{operation} failed")),
    }
}
