//! bb8 pool of async Diesel PostgreSQL connections.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

/// Errors raised while building or using the pool.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("failed to get connection from pool: {message}")]
    Checkout { message: String },
    #[error("failed to build connection pool: {message}")]
    Build { message: String },
}

impl PoolError {
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }
}

/// Pool sizing and checkout limits.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
    min_idle: Option<u32>,
    checkout_timeout: Duration,
}

impl PoolConfig {
    /// Defaults: 10 connections, 1 idle, checkout bounded by 5 seconds.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: 10,
            min_idle: Some(1),
            checkout_timeout: Duration::from_secs(5),
        }
    }

    #[must_use]
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    /// Checkout never waits longer than the store's own operation bound.
    #[must_use]
    pub fn with_checkout_timeout(mut self, timeout: Duration) -> Self {
        self.checkout_timeout = timeout;
        self
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

/// Shared handle to the connection pool.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Build the pool. Connections are established lazily beyond `min_idle`.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.database_url);
        let inner = Pool::builder()
            .max_size(config.max_size)
            .min_idle(config.min_idle)
            .connection_timeout(config.checkout_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;
        Ok(Self { inner })
    }

    /// Check out a connection.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn config_defaults() {
        let config = PoolConfig::new("postgres://localhost/orders");

        assert_eq!(config.database_url(), "postgres://localhost/orders");
        assert_eq!(config.max_size, 10);
        assert_eq!(config.min_idle, Some(1));
        assert_eq!(config.checkout_timeout, Duration::from_secs(5));
    }

    #[rstest]
    fn config_overrides() {
        let config = PoolConfig::new("postgres://localhost/orders")
            .with_max_size(4)
            .with_checkout_timeout(Duration::from_millis(250));

        assert_eq!(config.max_size, 4);
        assert_eq!(config.checkout_timeout, Duration::from_millis(250));
    }
}
