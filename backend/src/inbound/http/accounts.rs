//! Account flow handlers.
//!
//! ```text
//! GET  /login?returnUrl=/orders   combined page, login mode
//! POST /login                     loginIdentifier, loginPassword, returnUrl
//! GET  /register                  combined page, register mode
//! POST /register                  signupUserName, signupEmail, signupPassword
//! POST /logout                    ends the session
//! GET  /                          landing page for signed-in users
//! ```
//!
//! Every page carries the session's anti-forgery token and every `POST`
//! must echo it back as `csrfToken`; a mismatch is a `403`.
//!
//! Rejections re-render the page (`200` with a [`FormView`]); only store
//! failures become error responses.

use actix_web::http::header;
use actix_web::{HttpResponse, get, post, web};
use serde::Serialize;
use tracing::info;
use utoipa::ToSchema;

use crate::domain::ports::{LoginOutcome, RegisterOutcome};
use crate::domain::{Error, FormMode, SessionClaims};

use super::ApiResult;
use super::forms::{FormValues, FormView, LoginForm, LogoutForm, ReturnQuery, SignupForm};
use super::redirect::post_login_target;
use super::session::{AuthenticatedUser, SessionContext};
use super::state::HttpState;

/// Notice shown on the login page after a successful registration.
pub const REGISTRATION_NOTICE: &str = "Registration successful. Please login.";

const NO_STORE: &str = "no-store";

/// Landing payload: the session claims plus the token `POST /logout` needs.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LandingView {
    #[serde(flatten)]
    pub claims: SessionClaims,
    pub csrf_token: String,
}

fn found(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.to_owned()))
        .insert_header((header::CACHE_CONTROL, NO_STORE))
        .finish()
}

fn render(view: FormView) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, NO_STORE))
        .json(view)
}

/// Show the combined page in login mode.
#[utoipa::path(
    get,
    path = "/login",
    params(ReturnQuery),
    responses(
        (status = 200, description = "Login form", body = FormView)
    ),
    tags = ["accounts"],
    operation_id = "loginPage",
    security([])
)]
#[get("/login")]
pub async fn login_page(
    session: SessionContext,
    query: web::Query<ReturnQuery>,
) -> ApiResult<HttpResponse> {
    let view = FormView::blank(FormMode::Login, session.csrf_token()?)
        .with_notice(session.take_notice())
        .with_return_url(query.into_inner().return_url);
    Ok(render(view))
}

/// Authenticate and start a session.
#[utoipa::path(
    post,
    path = "/login",
    params(ReturnQuery),
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Login rejected; form re-rendered", body = FormView),
        (status = 302, description = "Logged in", headers(
            ("Location" = String, description = "Return URL or landing page"),
            ("Set-Cookie" = String, description = "Session cookie")
        )),
        (status = 403, description = "Missing or stale anti-forgery token", body = Error),
        (status = 500, description = "Internal server error", body = Error),
        (status = 503, description = "Credential store unavailable", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ReturnQuery>,
    form: web::Form<LoginForm>,
) -> ApiResult<HttpResponse> {
    let form = form.into_inner();
    session.verify_csrf(&form.csrf_token)?;
    let (submission, body_return_url) = form.into_parts();
    let return_url = body_return_url.or(query.into_inner().return_url);
    let typed_identifier = submission.identifier.clone();
    match state.accounts.login(submission).await? {
        LoginOutcome::Authenticated(claims) => {
            session.establish(&claims)?;
            let target = post_login_target(return_url.as_deref(), &state.routes.landing_path);
            Ok(found(target))
        }
        LoginOutcome::Rejected(errors) => {
            let view = FormView::blank(FormMode::Login, session.csrf_token()?)
                .with_errors(errors)
                .with_return_url(return_url)
                .with_values(FormValues {
                    login_identifier: typed_identifier,
                    ..FormValues::default()
                });
            Ok(render(view))
        }
    }
}

/// Show the combined page in register mode.
#[utoipa::path(
    get,
    path = "/register",
    responses(
        (status = 200, description = "Registration form", body = FormView)
    ),
    tags = ["accounts"],
    operation_id = "registerPage",
    security([])
)]
#[get("/register")]
pub async fn register_page(session: SessionContext) -> ApiResult<HttpResponse> {
    Ok(render(FormView::blank(
        FormMode::Register,
        session.csrf_token()?,
    )))
}

/// Create an account. No session is started.
#[utoipa::path(
    post,
    path = "/register",
    request_body(content = SignupForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Registration rejected; form re-rendered", body = FormView),
        (status = 302, description = "Registered; continue to login", headers(
            ("Location" = String, description = "Login page")
        )),
        (status = 403, description = "Missing or stale anti-forgery token", body = Error),
        (status = 500, description = "Internal server error", body = Error),
        (status = 503, description = "Credential store unavailable", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<SignupForm>,
) -> ApiResult<HttpResponse> {
    let form = form.into_inner();
    session.verify_csrf(&form.csrf_token)?;
    let values = FormValues {
        signup_user_name: form.user_name.clone(),
        signup_email: form.email.clone(),
        ..FormValues::default()
    };
    match state.accounts.register(form.into()).await? {
        RegisterOutcome::Registered(user) => {
            info!(user_id = %user.id(), "account registered");
            session.set_notice(REGISTRATION_NOTICE)?;
            Ok(found(&state.routes.login_path))
        }
        RegisterOutcome::Rejected(errors) => {
            let view = FormView::blank(FormMode::Register, session.csrf_token()?)
                .with_errors(errors)
                .with_values(values);
            Ok(render(view))
        }
    }
}

/// End the current session.
#[utoipa::path(
    post,
    path = "/logout",
    request_body(content = LogoutForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 302, description = "Logged out; session cookie removed", headers(
            ("Location" = String, description = "Login page"),
            ("Set-Cookie" = String, description = "Expired session cookie")
        )),
        (status = 403, description = "Missing or stale anti-forgery token", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    form: web::Form<LogoutForm>,
) -> ApiResult<HttpResponse> {
    let session = user.session();
    session.verify_csrf(&form.csrf_token)?;
    info!(user_id = %user.claims().user_id(), "logging out");
    session.invalidate();
    Ok(found(&state.routes.login_path))
}

/// Landing page for signed-in users; returns the session claims.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Current session", body = LandingView),
        (status = 302, description = "Not signed in; redirected to login")
    ),
    tags = ["accounts"],
    operation_id = "landing"
)]
#[get("/")]
pub async fn landing(user: AuthenticatedUser) -> ApiResult<HttpResponse> {
    let view = LandingView {
        claims: user.claims().clone(),
        csrf_token: user.session().csrf_token()?,
    };
    Ok(HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, NO_STORE))
        .json(view))
}

/// Register every account route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(login_page)
        .service(login)
        .service(register_page)
        .service(register)
        .service(logout)
        .service(landing);
}

#[cfg(test)]
#[path = "accounts_tests.rs"]
mod tests;
