//! Credential persistence adapters.
//!
//! [`DieselCredentialStore`] talks to PostgreSQL through `diesel-async` and a
//! `bb8` pool; [`InMemoryCredentialStore`] keeps users in process memory for
//! development and tests. Both enforce user name and email uniqueness at the
//! point of insertion.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use orderdesk::outbound::persistence::{DbPool, DieselCredentialStore, PoolConfig, TableName};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/orders")).await?;
//! let store = DieselCredentialStore::new(pool, &TableName::default(), Duration::from_secs(5));
//! store.ensure_schema().await?;
//! ```

mod diesel_credential_store;
mod error_mapping;
mod memory_credential_store;
mod pool;
mod table_name;

pub use diesel_credential_store::DieselCredentialStore;
pub use memory_credential_store::InMemoryCredentialStore;
pub use pool::{DbPool, PoolConfig, PoolError};
pub use table_name::{TABLE_NAME_MAX, TableName, TableNameError};
