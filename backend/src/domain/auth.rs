//! Login and signup submissions and their validation.
//!
//! One page hosts both forms, but each endpoint parses only its own half:
//! `POST /login` yields a [`LoginSubmission`] and `POST /register` a
//! [`SignupSubmission`]. Each validator sees exactly one shape, so errors
//! from the inactive form cannot appear.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use zeroize::Zeroizing;

use super::identifier::normalize;
use super::user::{EMAIL_MAX, EmailAddress, UserName, UserValidationError};

/// Minimum password length accepted at signup.
pub const PASSWORD_MIN: usize = 5;
/// Maximum password length accepted at signup.
pub const PASSWORD_MAX: usize = 128;
/// Maximum accepted login identifier length.
pub const IDENTIFIER_MAX: usize = EMAIL_MAX;

/// Wire field names, shared with the HTTP form payload.
pub mod fields {
    pub const LOGIN_IDENTIFIER: &str = "loginIdentifier";
    pub const LOGIN_PASSWORD: &str = "loginPassword";
    pub const SIGNUP_USER_NAME: &str = "signupUserName";
    pub const SIGNUP_EMAIL: &str = "signupEmail";
    pub const SIGNUP_PASSWORD: &str = "signupPassword";
}

/// Plaintext password, wiped from memory on drop.
///
/// Whitespace is preserved as typed.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Wrap a caller-provided password.
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    /// Borrow the plaintext for hashing or verification.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl<'de> Deserialize<'de> for Password {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Which half of the combined form a request is acting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FormMode {
    Login,
    Register,
}

/// Raw login half of the combined form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginSubmission {
    pub identifier: String,
    pub password: Password,
}

/// Raw signup half of the combined form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupSubmission {
    pub user_name: String,
    pub email: String,
    pub password: Password,
}

/// Stable validation failure codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorCode {
    Required,
    TooShort,
    TooLong,
    InvalidFormat,
}

/// A single failed rule, either scoped to a field or to the whole form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    /// Wire field name, or `None` for form-level messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, example = "signupEmail")]
    pub field: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<FieldErrorCode>,
    pub message: String,
}

/// Errors to redisplay alongside the form.
///
/// A fresh value is built per validation run; nothing carries over between
/// requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(Vec<FieldError>);

impl FormErrors {
    /// Empty error set.
    pub fn new() -> Self {
        Self::default()
    }

    /// A single form-level message with no field attribution.
    pub fn form(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push_form(message);
        errors
    }

    /// Record a field-scoped failure.
    pub fn push_field(
        &mut self,
        field: &'static str,
        code: FieldErrorCode,
        message: impl Into<String>,
    ) {
        self.0.push(FieldError {
            field: Some(field),
            code: Some(code),
            message: message.into(),
        });
    }

    /// Record a form-level failure.
    pub fn push_form(&mut self, message: impl Into<String>) {
        self.0.push(FieldError {
            field: None,
            code: None,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// Whether any error is attributed to `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|error| error.field == Some(field))
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

/// Validated login input.
///
/// ## Invariants
/// - `identifier` is normalized and non-empty.
/// - `password` is non-empty and unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    identifier: String,
    password: Password,
}

impl LoginCredentials {
    /// Normalized user name or email to look up.
    pub fn identifier(&self) -> &str {
        self.identifier.as_str()
    }

    /// Password as typed.
    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// Validated signup input with normalized identity fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupDetails {
    user_name: UserName,
    email: EmailAddress,
    password: Password,
}

impl SignupDetails {
    pub fn user_name(&self) -> &UserName {
        &self.user_name
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// Validate only the login half.
///
/// # Examples
/// ```
/// use orderdesk::domain::{LoginSubmission, Password, validate_login};
///
/// let submission = LoginSubmission {
///     identifier: "  ALICE ".into(),
///     password: Password::new("p@ss1"),
/// };
/// let creds = validate_login(&submission).expect("valid login");
/// assert_eq!(creds.identifier(), "alice");
/// ```
pub fn validate_login(submission: &LoginSubmission) -> Result<LoginCredentials, FormErrors> {
    let mut errors = FormErrors::new();
    let identifier = normalize(&submission.identifier);

    if identifier.is_empty() {
        errors.push_field(
            fields::LOGIN_IDENTIFIER,
            FieldErrorCode::Required,
            "username or email is required",
        );
    } else if identifier.chars().count() > IDENTIFIER_MAX {
        errors.push_field(
            fields::LOGIN_IDENTIFIER,
            FieldErrorCode::TooLong,
            format!("username or email must be at most {IDENTIFIER_MAX} characters"),
        );
    }

    if submission.password.is_empty() {
        errors.push_field(
            fields::LOGIN_PASSWORD,
            FieldErrorCode::Required,
            "password is required",
        );
    }

    errors.into_result(|| LoginCredentials {
        identifier,
        password: submission.password.clone(),
    })
}

/// Validate only the signup half.
pub fn validate_signup(submission: &SignupSubmission) -> Result<SignupDetails, FormErrors> {
    let mut errors = FormErrors::new();

    let user_name = UserName::new(&submission.user_name)
        .map_err(|err| push_user_error(&mut errors, fields::SIGNUP_USER_NAME, &err))
        .ok();
    let email = EmailAddress::new(&submission.email)
        .map_err(|err| push_user_error(&mut errors, fields::SIGNUP_EMAIL, &err))
        .ok();
    check_signup_password(&submission.password, &mut errors);

    match (user_name, email) {
        (Some(user_name), Some(email)) if errors.is_empty() => Ok(SignupDetails {
            user_name,
            email,
            password: submission.password.clone(),
        }),
        _ => Err(errors),
    }
}

fn check_signup_password(password: &Password, errors: &mut FormErrors) {
    if password.is_empty() {
        errors.push_field(
            fields::SIGNUP_PASSWORD,
            FieldErrorCode::Required,
            "password is required",
        );
        return;
    }
    let length = password.char_count();
    if length < PASSWORD_MIN {
        errors.push_field(
            fields::SIGNUP_PASSWORD,
            FieldErrorCode::TooShort,
            format!("password must be at least {PASSWORD_MIN} characters"),
        );
    } else if length > PASSWORD_MAX {
        errors.push_field(
            fields::SIGNUP_PASSWORD,
            FieldErrorCode::TooLong,
            format!("password must be at most {PASSWORD_MAX} characters"),
        );
    }
}

fn push_user_error(errors: &mut FormErrors, field: &'static str, err: &UserValidationError) {
    let code = match err {
        UserValidationError::EmptyUserName | UserValidationError::EmptyEmail => {
            FieldErrorCode::Required
        }
        UserValidationError::UserNameTooShort { .. } => FieldErrorCode::TooShort,
        UserValidationError::UserNameTooLong { .. } | UserValidationError::EmailTooLong { .. } => {
            FieldErrorCode::TooLong
        }
        _ => FieldErrorCode::InvalidFormat,
    };
    errors.push_field(field, code, err.to_string());
}
