//! Backend entry-point: loads settings, picks the credential store, serves.

use std::io;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use orderdesk::inbound::http::health::HealthState;
use orderdesk::inbound::http::session_config::{BuildMode, session_settings_from_env};
use orderdesk::server::{ServerConfig, StartupError, build_credential_store, create_server};
use orderdesk::settings::AppSettings;

#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|err| io::Error::other(err.to_string()))?;
    run(settings).await.map_err(io::Error::other)
}

async fn run(settings: AppSettings) -> Result<(), StartupError> {
    let session =
        session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())?;
    let store = build_credential_store(&settings).await?;
    let config = ServerConfig::new(session, settings.bind_addr()?, store)
        .with_cookie_policy(settings.cookie_policy()?)
        .with_routes(settings.auth_routes()?)
        .with_argon2_costs(settings.argon2_costs());
    let bind_addr = config.bind_addr();

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "listening");
    server.await?;
    Ok(())
}
