//! Domain primitives, services, and ports.
//!
//! Purpose: hold the account model and the login/registration rules without
//! depending on HTTP or persistence crates. Inbound adapters drive the domain
//! through [`ports::AccountCommand`]; outbound adapters implement
//! [`ports::CredentialStore`] and [`ports::PasswordHasher`].
//!
//! Public surface:
//! - [`normalize`] canonicalizes user names, emails, and login identifiers.
//! - [`User`] and its value types ([`UserId`], [`UserName`], [`EmailAddress`],
//!   [`PasswordHash`]).
//! - Submission shapes and their validators ([`validate_login`],
//!   [`validate_signup`], [`FormErrors`]).
//! - [`SessionClaims`] issued on successful login.
//! - [`AccountService`] implementing the account use-cases.
//! - [`Error`] and [`ErrorCode`] for API failures.

pub mod account_service;
pub mod auth;
pub mod error;
pub mod identifier;
pub mod ports;
pub mod session_claims;
pub mod trace_id;
pub mod user;

pub use self::account_service::{
    AccountService, DEFAULT_SESSION_WINDOW_MINUTES, DUPLICATE_REGISTRATION_MESSAGE,
    INVALID_CREDENTIALS_MESSAGE,
};
pub use self::auth::{
    FieldError, FieldErrorCode, FormErrors, FormMode, LoginCredentials, LoginSubmission,
    Password, SignupDetails, SignupSubmission, fields, validate_login, validate_signup,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::identifier::normalize;
pub use self::session_claims::SessionClaims;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EmailAddress, NewUser, PasswordHash, User, UserId, UserName, UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use orderdesk::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
