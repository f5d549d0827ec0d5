//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the account flow handlers, the health probes, and
//! the wire shapes they exchange. The document backs Swagger UI in debug
//! builds and is exported via `cargo run --bin openapi-dump` for tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, FieldError, FieldErrorCode, FormMode, SessionClaims};
use crate::inbound::http::accounts::LandingView;
use crate::inbound::http::forms::{FormValues, FormView, LoginForm, LogoutForm, SignupForm};

/// Adds the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Private session cookie issued by POST /login.",
            ))),
        );
    }
}

/// OpenAPI document for the HTTP interface.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Orderdesk API",
        description = "Login, registration, and session handling for the order desk."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::accounts::login_page,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::register_page,
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::logout,
        crate::inbound::http::accounts::landing,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        FormView,
        FormValues,
        FormMode,
        FieldError,
        FieldErrorCode,
        LoginForm,
        SignupForm,
        LogoutForm,
        LandingView,
        SessionClaims,
        Error,
        ErrorCode
    )),
    tags(
        (name = "accounts", description = "Login, registration, and logout"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
