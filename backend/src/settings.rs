//! Application settings loaded via OrthoConfig.
//!
//! Every value can come from `ORDERDESK_*` environment variables, a config
//! file, or CLI flags. Unset values fall back to the defaults below through
//! the accessor methods.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::inbound::http::redirect::is_local_path;
use crate::inbound::http::session_config::SessionCookiePolicy;
use crate::inbound::http::state::AuthRoutes;
use crate::outbound::password::Argon2Costs;
use crate::outbound::persistence::{TableName, TableNameError};

const DEFAULT_USERS_TABLE: &str = "users";
const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_SESSION_TTL_MINUTES: i64 = 60;
const DEFAULT_COOKIE_NAME: &str = "session";
const DEFAULT_LOGIN_PATH: &str = "/login";
const DEFAULT_LANDING_PATH: &str = "/";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Errors raised when settings values are present but unusable.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid database URL: {0}")]
    DatabaseUrl(#[from] url::ParseError),
    #[error("database URL cannot carry a database name: {url}")]
    DatabaseUrlWithoutPath { url: String },
    #[error("invalid users table: {0}")]
    UsersTable(#[from] TableNameError),
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("{name} must be a local path starting with '/', got '{value}'")]
    Path { name: &'static str, value: String },
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: i64 },
}

/// Process-wide configuration.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ORDERDESK")]
pub struct AppSettings {
    /// PostgreSQL URL. Without it the in-memory store is used.
    pub database_url: Option<String>,
    /// Replaces the path component of `database_url` when set.
    pub database_name: Option<String>,
    /// Table holding user credentials.
    pub users_table: Option<String>,
    /// Upper bound on each credential store call, in milliseconds.
    pub store_timeout_ms: Option<u64>,
    /// Sliding session window in minutes.
    pub session_ttl_minutes: Option<i64>,
    pub session_cookie_name: Option<String>,
    /// Where unauthenticated requests are redirected.
    pub login_path: Option<String>,
    /// Default destination after login.
    pub landing_path: Option<String>,
    pub bind_addr: Option<String>,
    /// Argon2 memory cost in KiB.
    pub argon2_memory_kib: Option<u32>,
    pub argon2_iterations: Option<u32>,
    pub argon2_parallelism: Option<u32>,
}

impl AppSettings {
    /// Database URL with `database_name` applied, if a URL is configured.
    ///
    /// # Examples
    /// ```
    /// use orderdesk::settings::AppSettings;
    ///
    /// let settings = AppSettings {
    ///     database_url: Some("postgres://app@db:5432/postgres".into()),
    ///     database_name: Some("orders".into()),
    ///     ..AppSettings::default()
    /// };
    /// let url = settings.database_url().expect("valid").expect("configured");
    /// assert_eq!(url.as_str(), "postgres://app@db:5432/orders");
    /// ```
    pub fn database_url(&self) -> Result<Option<Url>, SettingsError> {
        let Some(raw) = self.database_url.as_deref() else {
            return Ok(None);
        };
        let mut url = Url::parse(raw)?;
        if let Some(name) = self.database_name.as_deref() {
            if url.cannot_be_a_base() {
                return Err(SettingsError::DatabaseUrlWithoutPath {
                    url: url.to_string(),
                });
            }
            url.set_path(&format!("/{}", name.trim_start_matches('/')));
        }
        Ok(Some(url))
    }

    pub fn users_table(&self) -> Result<TableName, SettingsError> {
        let raw = self.users_table.as_deref().unwrap_or(DEFAULT_USERS_TABLE);
        Ok(TableName::new(raw)?)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms.unwrap_or(DEFAULT_STORE_TIMEOUT_MS))
    }

    pub fn session_window(&self) -> Result<chrono::Duration, SettingsError> {
        let minutes = self
            .session_ttl_minutes
            .unwrap_or(DEFAULT_SESSION_TTL_MINUTES);
        if minutes <= 0 {
            return Err(SettingsError::NonPositive {
                name: "session_ttl_minutes",
                value: minutes,
            });
        }
        Ok(chrono::Duration::minutes(minutes))
    }

    pub fn cookie_policy(&self) -> Result<SessionCookiePolicy, SettingsError> {
        Ok(SessionCookiePolicy {
            cookie_name: self
                .session_cookie_name
                .clone()
                .unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_owned()),
            window: self.session_window()?,
        })
    }

    pub fn auth_routes(&self) -> Result<AuthRoutes, SettingsError> {
        Ok(AuthRoutes {
            login_path: local_path("login_path", self.login_path.as_deref(), DEFAULT_LOGIN_PATH)?,
            landing_path: local_path(
                "landing_path",
                self.landing_path.as_deref(),
                DEFAULT_LANDING_PATH,
            )?,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Argon2 costs, each unset value taking the library default.
    pub fn argon2_costs(&self) -> Argon2Costs {
        let defaults = Argon2Costs::default();
        Argon2Costs {
            memory_kib: self.argon2_memory_kib.unwrap_or(defaults.memory_kib),
            iterations: self.argon2_iterations.unwrap_or(defaults.iterations),
            parallelism: self.argon2_parallelism.unwrap_or(defaults.parallelism),
        }
    }
}

fn local_path(
    name: &'static str,
    value: Option<&str>,
    default: &str,
) -> Result<String, SettingsError> {
    let value = value.unwrap_or(default);
    if is_local_path(value) {
        Ok(value.to_owned())
    } else {
        Err(SettingsError::Path {
            name,
            value: value.to_owned(),
        })
    }
}
