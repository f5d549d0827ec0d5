//! Builders for the credential store and the HTTP state.

use std::sync::Arc;

use mockable::Clock;
use tracing::{info, warn};

use crate::domain::AccountService;
use crate::domain::ports::{CredentialStore, PasswordHashError};
use crate::inbound::http::state::HttpState;
use crate::outbound::password::Argon2PasswordHasher;
use crate::outbound::persistence::{
    DbPool, DieselCredentialStore, InMemoryCredentialStore, PoolConfig,
};
use crate::settings::AppSettings;

use super::{ServerConfig, StartupError};

/// Pick the credential store from settings.
///
/// A configured database URL yields the PostgreSQL store with its schema
/// ensured; otherwise an in-memory store is used and a warning is logged.
pub async fn build_credential_store(
    settings: &AppSettings,
) -> Result<Arc<dyn CredentialStore>, StartupError> {
    let Some(url) = settings.database_url()? else {
        warn!("no database configured; credentials are kept in memory and lost on restart");
        return Ok(Arc::new(InMemoryCredentialStore::new()));
    };
    let table = settings.users_table()?;
    let timeout = settings.store_timeout();
    let pool = DbPool::new(PoolConfig::new(url.as_str()).with_checkout_timeout(timeout)).await?;
    let store = DieselCredentialStore::new(pool, &table, timeout);
    store.ensure_schema().await?;
    info!(
        host = url.host_str().unwrap_or_default(),
        table = table.as_str(),
        "using PostgreSQL credential store"
    );
    Ok(Arc::new(store))
}

/// Assemble the account service and the state handlers share.
pub fn build_http_state(
    config: &ServerConfig,
    clock: Arc<dyn Clock>,
) -> Result<HttpState, PasswordHashError> {
    let window = config.cookie_policy.window;
    let hasher = Arc::new(Argon2PasswordHasher::new(config.argon2)?);
    let service = AccountService::new(config.store.clone(), hasher, clock.clone())
        .with_session_window(window);
    Ok(HttpState::new(Arc::new(service), clock)
        .with_routes(config.routes.clone())
        .with_session_window(window))
}
