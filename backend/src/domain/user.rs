//! User account data model.
//!
//! `UserName` and `EmailAddress` can only be built through [`normalize`], so
//! every value that reaches the credential store is already in canonical
//! form.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::identifier::normalize;

/// Minimum allowed length for a user name.
pub const USER_NAME_MIN: usize = 3;
/// Maximum allowed length for a user name.
pub const USER_NAME_MAX: usize = 32;
/// Maximum allowed length for an email address (RFC 5321 path limit).
pub const EMAIL_MAX: usize = 254;

/// Validation errors returned by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
    EmptyUserName,
    UserNameTooShort { min: usize },
    UserNameTooLong { max: usize },
    UserNameInvalidCharacters,
    EmptyEmail,
    EmailTooLong { max: usize },
    InvalidEmail,
    EmptyPasswordHash,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyUserName => write!(f, "user name is required"),
            Self::UserNameTooShort { min } => {
                write!(f, "user name must be at least {min} characters")
            }
            Self::UserNameTooLong { max } => {
                write!(f, "user name must be at most {max} characters")
            }
            Self::UserNameInvalidCharacters => write!(
                f,
                "user name may only contain letters, numbers, dots, dashes, or underscores",
            ),
            Self::EmptyEmail => write!(f, "email is required"),
            Self::EmailTooLong { max } => write!(f, "email must be at most {max} characters"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmptyPasswordHash => write!(f, "password hash must not be empty"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from a UUID string.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let id = id.as_ref();
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(id)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

static USER_NAME_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn user_name_regex() -> &'static Regex {
    USER_NAME_RE.get_or_init(|| {
        // Length is enforced separately; `@` is excluded so an identifier is
        // never both a valid user name and a valid email.
        Regex::new("^[a-z0-9_.-]+$")
            .unwrap_or_else(|error| panic!("user name regex failed to compile: {error}"))
    })
}

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Normalized, unique login name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Normalize and validate a raw user name.
    ///
    /// # Examples
    /// ```
    /// use orderdesk::domain::UserName;
    ///
    /// let name = UserName::new("  Alice ").expect("valid user name");
    /// assert_eq!(name.as_str(), "alice");
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let value = normalize(raw.as_ref());
        if value.is_empty() {
            return Err(UserValidationError::EmptyUserName);
        }
        let length = value.chars().count();
        if length < USER_NAME_MIN {
            return Err(UserValidationError::UserNameTooShort { min: USER_NAME_MIN });
        }
        if length > USER_NAME_MAX {
            return Err(UserValidationError::UserNameTooLong { max: USER_NAME_MAX });
        }
        if !user_name_regex().is_match(&value) {
            return Err(UserValidationError::UserNameInvalidCharacters);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Normalized, unique email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Normalize and validate a raw email address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let value = normalize(raw.as_ref());
        if value.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if value.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        if !email_regex().is_match(&value) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Opaque encoded password hash (PHC string). Never the plaintext.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an encoded hash produced by a [`crate::domain::ports::PasswordHasher`].
    pub fn new(encoded: impl Into<String>) -> Result<Self, UserValidationError> {
        let encoded = encoded.into();
        if encoded.trim().is_empty() {
            return Err(UserValidationError::EmptyPasswordHash);
        }
        Ok(Self(encoded))
    }

    /// Encoded representation for persistence and verification.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Registration data handed to the credential store.
///
/// The store assigns the identifier; everything else is decided by the
/// caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub user_name: UserName,
    pub email: EmailAddress,
    pub password_hash: PasswordHash,
    pub created_at: DateTime<Utc>,
}

/// Persisted application user.
///
/// ## Invariants
/// - `user_name` and `email` are normalized and unique across users.
/// - `id` and `created_at` never change after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    user_name: UserName,
    email: EmailAddress,
    password_hash: PasswordHash,
    created_at: DateTime<Utc>,
}

impl User {
    /// Build a stored user from a registration and its assigned identifier.
    pub fn from_new(id: UserId, new_user: NewUser) -> Self {
        let NewUser {
            user_name,
            email,
            password_hash,
            created_at,
        } = new_user;
        Self {
            id,
            user_name,
            email,
            password_hash,
            created_at,
        }
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Normalized login name.
    pub fn user_name(&self) -> &UserName {
        &self.user_name
    }

    /// Normalized email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Stored password hash.
    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Return a copy carrying a regenerated password hash.
    #[must_use]
    pub fn with_password_hash(mut self, password_hash: PasswordHash) -> Self {
        self.password_hash = password_hash;
        self
    }
}

#[cfg(test)]
mod tests;
