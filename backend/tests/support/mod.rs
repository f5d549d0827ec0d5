//! Shared helpers for the account flow integration tests.

use std::sync::Arc;

use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::dev::ServiceResponse;
use actix_web::http::header;
use actix_web::web;
use mockable::DefaultClock;
use orderdesk::inbound::http::health::HealthState;
use orderdesk::inbound::http::session_config::{SessionCookiePolicy, SessionSettings};
use orderdesk::outbound::password::Argon2Costs;
use orderdesk::outbound::persistence::InMemoryCredentialStore;
use orderdesk::server::{AppDependencies, ServerConfig, build_http_state};

/// Application inputs plus a handle on the store behind them.
pub struct Harness {
    pub store: Arc<InMemoryCredentialStore>,
    pub deps: AppDependencies,
}

/// Full application over an empty in-memory store with cheap hashing.
pub fn harness() -> Harness {
    let store = Arc::new(InMemoryCredentialStore::new());
    let session = SessionSettings {
        key: Key::generate(),
        cookie_secure: false,
        same_site: SameSite::Lax,
    };
    let config = ServerConfig::new(
        session.clone(),
        "127.0.0.1:0".parse().expect("socket addr"),
        store.clone(),
    )
    .with_argon2_costs(Argon2Costs::minimal());
    let http_state = build_http_state(&config, Arc::new(DefaultClock)).expect("http state");
    Harness {
        store,
        deps: AppDependencies {
            health_state: web::Data::new(HealthState::new()),
            http_state: web::Data::new(http_state),
            session,
            cookie_policy: SessionCookiePolicy::default(),
        },
    }
}

pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

pub fn location<B>(res: &ServiceResponse<B>) -> Option<String> {
    res.headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}
