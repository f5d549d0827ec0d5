//! Session issuing and reading for HTTP handlers.
//!
//! Wraps the Actix cookie session so handlers deal in [`SessionClaims`]
//! rather than raw keys. The cookie is private (encrypted and signed);
//! tampered cookies never reach this module because the session middleware
//! discards them.

use actix_session::{Session, SessionExt};
use actix_web::error::InternalError;
use actix_web::http::{Method, header};
use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, web};
use chrono::{DateTime, Duration, Utc};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::{Error, SessionClaims};

use super::redirect::login_redirect;
use super::state::HttpState;

pub(crate) const CLAIMS_KEY: &str = "claims";
pub(crate) const NOTICE_KEY: &str = "notice";
pub(crate) const CSRF_KEY: &str = "csrf";

/// Message returned when a form post carries no valid anti-forgery token.
pub const INVALID_CSRF_MESSAGE: &str = "Invalid anti-forgery token.";

fn tokens_match(expected: &str, presented: &str) -> bool {
    expected.len() == presented.len()
        && expected
            .bytes()
            .zip(presented.bytes())
            .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

/// Newtype exposing account-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Start an authenticated session.
    ///
    /// The session is renewed first so a fresh cookie replaces whatever the
    /// client presented before logging in.
    pub fn establish(&self, claims: &SessionClaims) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(CLAIMS_KEY, claims)
            .map_err(|err| Error::internal(format!("failed to persist session: {err}")))?;
        self.regenerate_csrf().map(drop)
    }

    /// End the session. The response carries a removal cookie.
    pub fn invalidate(&self) {
        self.0.purge();
    }

    /// Claims for the current request, sliding the window when still valid.
    ///
    /// Returns `None` for absent, undecodable, or expired claims. The last
    /// two are also removed from the session.
    pub fn current_claims(
        &self,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Result<Option<SessionClaims>, Error> {
        let claims = match self.0.get::<SessionClaims>(CLAIMS_KEY) {
            Ok(Some(claims)) => claims,
            Ok(None) => return Ok(None),
            Err(err) => {
                warn!(error = %err, "discarding undecodable session claims");
                self.0.remove(CLAIMS_KEY);
                return Ok(None);
            }
        };
        if claims.is_expired(now) {
            debug!(user_id = %claims.user_id(), "session expired");
            self.0.remove(CLAIMS_KEY);
            return Ok(None);
        }
        let slid = claims.slide(now, window);
        self.0
            .insert(CLAIMS_KEY, &slid)
            .map_err(|err| Error::internal(format!("failed to refresh session: {err}")))?;
        Ok(Some(slid))
    }

    /// Store a message to show once on the next form render.
    pub fn set_notice(&self, message: &str) -> Result<(), Error> {
        self.0
            .insert(NOTICE_KEY, message)
            .map_err(|err| Error::internal(format!("failed to persist notice: {err}")))
    }

    /// Anti-forgery token for this session, issuing one when absent.
    pub fn csrf_token(&self) -> Result<String, Error> {
        match self.0.get::<String>(CSRF_KEY) {
            Ok(Some(token)) => Ok(token),
            Ok(None) => self.regenerate_csrf(),
            Err(err) => {
                warn!(error = %err, "replacing undecodable anti-forgery token");
                self.regenerate_csrf()
            }
        }
    }

    /// Replace the anti-forgery token and return the new value.
    pub fn regenerate_csrf(&self) -> Result<String, Error> {
        let token = Uuid::new_v4().simple().to_string();
        self.0
            .insert(CSRF_KEY, &token)
            .map_err(|err| Error::internal(format!("failed to persist token: {err}")))?;
        Ok(token)
    }

    /// Reject form posts whose token does not match the session's.
    ///
    /// A session without a token never verifies.
    pub fn verify_csrf(&self, presented: &str) -> Result<(), Error> {
        let expected = self.0.get::<String>(CSRF_KEY).ok().flatten();
        match expected {
            Some(expected) if tokens_match(&expected, presented) => Ok(()),
            _ => {
                warn!("form post rejected: anti-forgery token mismatch");
                Err(Error::forbidden(INVALID_CSRF_MESSAGE))
            }
        }
    }

    /// Remove and return the pending notice, if any.
    pub fn take_notice(&self) -> Option<String> {
        match self.0.remove_as::<String>(NOTICE_KEY)? {
            Ok(notice) => Some(notice),
            Err(raw) => {
                warn!(raw_len = raw.len(), "discarding undecodable notice");
                None
            }
        }
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

/// Extractor for routes that require a signed-in user.
///
/// Without valid claims the request short-circuits with `302 Found` to the
/// login path. `GET` requests carry their original path as `returnUrl`.
#[derive(Clone)]
pub struct AuthenticatedUser {
    claims: SessionClaims,
    session: Session,
}

impl AuthenticatedUser {
    pub fn claims(&self) -> &SessionClaims {
        &self.claims
    }

    pub fn session(&self) -> SessionContext {
        SessionContext::new(self.session.clone())
    }

    fn resolve(req: &HttpRequest) -> Result<Self, actix_web::Error> {
        let state = req
            .app_data::<web::Data<HttpState>>()
            .ok_or_else(|| Error::internal("HTTP state is not configured"))?;
        let session = req.get_session();
        let now = state.clock.utc();
        let claims = SessionContext::new(session.clone()).current_claims(now, state.session_window)?;
        match claims {
            Some(claims) => Ok(Self { claims, session }),
            None => {
                let location = if req.method() == Method::GET {
                    let original = req
                        .uri()
                        .path_and_query()
                        .map_or_else(|| req.path().to_owned(), |pq| pq.as_str().to_owned());
                    login_redirect(&state.routes.login_path, &original)
                } else {
                    state.routes.login_path.clone()
                };
                let response = HttpResponse::Found()
                    .insert_header((header::LOCATION, location))
                    .finish();
                Err(InternalError::from_response("login required", response).into())
            }
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = std::future::Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        std::future::ready(Self::resolve(req))
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
