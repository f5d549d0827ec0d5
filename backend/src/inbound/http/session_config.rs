//! Session cookie configuration.
//!
//! Security toggles come from the process environment through
//! [`mockable::Env`] so they can be exercised without touching real
//! variables. Debug builds fall back to permissive defaults with a warning;
//! release builds refuse to start on anything missing or malformed.
//!
//! | Variable                  | Values              | Debug default |
//! |---------------------------|---------------------|---------------|
//! | `SESSION_KEY_FILE`        | path                | ephemeral key |
//! | `SESSION_COOKIE_SECURE`   | boolean             | `true`        |
//! | `SESSION_SAMESITE`        | `Strict|Lax|None`   | `Lax`         |
//! | `SESSION_ALLOW_EPHEMERAL` | boolean             | `false`       |

use std::path::PathBuf;

use actix_session::config::{CookieContentSecurity, PersistentSession, TtlExtensionPolicy};
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Key, SameSite, time};
use mockable::Env;
use tracing::{info, warn};
use zeroize::Zeroize;

pub mod fingerprint;

use self::fingerprint::key_fingerprint;

const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
const SESSION_KEY_MIN_LEN: usize = 64;
const DEBUG_KEY_MIN_LEN: usize = 32;
const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
const SAMESITE_ENV: &str = "SESSION_SAMESITE";
const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Missing or invalid toggles are warned about and defaulted.
    Debug,
    /// Missing or invalid toggles are errors.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use orderdesk::inbound::http::session_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// assert_eq!(mode == BuildMode::Debug, cfg!(debug_assertions));
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Cookie attributes that come from application settings rather than the
/// security toggles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionCookiePolicy {
    /// Cookie name, `session` unless configured.
    pub cookie_name: String,
    /// Sliding inactivity window.
    pub window: chrono::Duration,
}

impl Default for SessionCookiePolicy {
    fn default() -> Self {
        Self {
            cookie_name: "session".to_owned(),
            window: chrono::Duration::minutes(crate::domain::DEFAULT_SESSION_WINDOW_MINUTES),
        }
    }
}

/// Validated session security settings.
#[derive(Clone)]
pub struct SessionSettings {
    /// Signing and encryption key for cookie sessions.
    pub key: Key,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
    /// `SameSite` policy for session cookies.
    pub same_site: SameSite,
}

impl SessionSettings {
    /// Truncated SHA-256 of the signing key, safe to log.
    pub fn fingerprint(&self) -> String {
        key_fingerprint(&self.key)
    }

    /// Build the cookie session middleware.
    ///
    /// Content is private (encrypted and signed), `HttpOnly`, and the cookie
    /// lifetime is refreshed on every request so it tracks the sliding
    /// window carried in the session claims.
    pub fn middleware(&self, policy: &SessionCookiePolicy) -> SessionMiddleware<CookieSessionStore> {
        let ttl = time::Duration::seconds(policy.window.num_seconds());
        SessionMiddleware::builder(CookieSessionStore::default(), self.key.clone())
            .cookie_name(policy.cookie_name.clone())
            .cookie_content_security(CookieContentSecurity::Private)
            .cookie_http_only(true)
            .cookie_secure(self.cookie_secure)
            .cookie_same_site(self.same_site)
            .cookie_path("/".to_owned())
            .session_lifecycle(
                PersistentSession::default()
                    .session_ttl(ttl)
                    .session_ttl_extension_policy(TtlExtensionPolicy::OnEveryRequest),
            )
            .build()
    }
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Reading the session key file failed.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The session key file is shorter than release builds accept.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// `SameSite=None` without a secure cookie in a release build.
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    /// Release builds must not allow ephemeral session keys.
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Build session settings from environment variables and build mode.
///
/// # Examples
///
/// ```rust
/// use mockable::MockEnv;
/// use orderdesk::inbound::http::session_config::{BuildMode, session_settings_from_env};
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|_| None);
///
/// let settings = session_settings_from_env(&env, BuildMode::Debug)
///     .expect("debug builds default every toggle");
/// assert!(settings.cookie_secure);
/// ```
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let toggles = Toggles { env, mode };
    let cookie_secure = toggles.read(COOKIE_SECURE_ENV, parse_bool, true, BOOL_EXPECTED)?;
    let default_same_site = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };
    let same_site = toggles.read(
        SAMESITE_ENV,
        parse_same_site,
        default_same_site,
        SAMESITE_EXPECTED,
    )?;
    if same_site == SameSite::None && !cookie_secure {
        if !mode.is_debug() {
            return Err(SessionConfigError::InsecureSameSiteNone);
        }
        warn!("SESSION_SAMESITE=None without a secure cookie; browsers may reject it");
    }
    let allow_ephemeral = toggles.read(ALLOW_EPHEMERAL_ENV, parse_bool, false, BOOL_EXPECTED)?;
    if allow_ephemeral && !mode.is_debug() {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }
    let key = load_key(env, mode, allow_ephemeral)?;
    let settings = SessionSettings {
        key,
        cookie_secure,
        same_site,
    };
    info!(fingerprint = %settings.fingerprint(), "session key loaded");
    Ok(settings)
}

struct Toggles<'a, E> {
    env: &'a E,
    mode: BuildMode,
}

impl<E: Env> Toggles<'_, E> {
    /// Read and parse one toggle, defaulting in debug builds only.
    fn read<T: Copy + std::fmt::Debug>(
        &self,
        name: &'static str,
        parse: fn(&str) -> Option<T>,
        debug_default: T,
        expected: &'static str,
    ) -> Result<T, SessionConfigError> {
        let Some(value) = self.env.string(name) else {
            if self.mode.is_debug() {
                warn!(variable = name, default = ?debug_default, "session toggle not set");
                return Ok(debug_default);
            }
            return Err(SessionConfigError::MissingEnv { name });
        };
        match parse(&value) {
            Some(parsed) => Ok(parsed),
            None if self.mode.is_debug() => {
                warn!(
                    variable = name,
                    value = %value,
                    default = ?debug_default,
                    "invalid session toggle"
                );
                Ok(debug_default)
            }
            None => Err(SessionConfigError::InvalidEnv {
                name,
                value,
                expected,
            }),
        }
    }
}

fn load_key<E: Env>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| SESSION_KEY_DEFAULT_PATH.to_owned()),
    );
    match std::fs::read(&path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            let min_len = if mode.is_debug() {
                DEBUG_KEY_MIN_LEN
            } else {
                SESSION_KEY_MIN_LEN
            };
            let key = (length >= min_len).then(|| Key::derive_from(&bytes));
            bytes.zeroize();
            key.ok_or(SessionConfigError::KeyTooShort {
                path,
                length,
                min_len,
            })
        }
        Err(_) if mode.is_debug() || allow_ephemeral => {
            warn!(path = %path.display(), "using temporary session key (dev only)");
            Ok(Key::generate())
        }
        Err(source) => Err(SessionConfigError::KeyRead { path, source }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

fn parse_same_site(value: &str) -> Option<SameSite> {
    match value.trim().to_ascii_lowercase().as_str() {
        "strict" => Some(SameSite::Strict),
        "lax" => Some(SameSite::Lax),
        "none" => Some(SameSite::None),
        _ => None,
    }
}

#[cfg(test)]
mod tests;
