//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;
pub use state_builders::{build_credential_store, build_http_state};

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::DefaultClock;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ports::{CredentialStoreError, PasswordHashError};
use crate::inbound::http::accounts;
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::session_config::{
    SessionConfigError, SessionCookiePolicy, SessionSettings,
};
use crate::inbound::http::state::HttpState;
use crate::middleware::Trace;
use crate::outbound::persistence::PoolError;
use crate::settings::SettingsError;

/// Failures that stop the process before it starts serving.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Session(#[from] SessionConfigError),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Store(#[from] CredentialStoreError),
    #[error(transparent)]
    Hasher(#[from] PasswordHashError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Per-worker inputs for [`build_app`].
#[derive(Clone)]
pub struct AppDependencies {
    pub health_state: web::Data<HealthState>,
    pub http_state: web::Data<HttpState>,
    pub session: SessionSettings,
    pub cookie_policy: SessionCookiePolicy,
}

/// Build the application: trace middleware outermost, then the session.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        session,
        cookie_policy,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(session.middleware(&cookie_policy))
        .wrap(Trace)
        .configure(accounts::configure)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Bind and start the HTTP server. Readiness flips once bound.
///
/// # Errors
/// Returns [`StartupError`] when the hasher rejects its costs or the socket
/// cannot be bound.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> Result<Server, StartupError> {
    let http_state = web::Data::new(build_http_state(&config, Arc::new(DefaultClock))?);
    let ServerConfig {
        session,
        cookie_policy,
        bind_addr,
        ..
    } = config;
    let deps = AppDependencies {
        health_state: health_state.clone(),
        http_state,
        session,
        cookie_policy,
    };

    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(bind_addr)?
        .run();

    health_state.mark_ready();
    Ok(server)
}
