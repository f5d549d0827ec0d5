//! Identity claims carried by an authenticated session.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user::{EmailAddress, User, UserId, UserName};

/// Claims stored in the private session cookie.
///
/// `expires_at` implements the sliding window: it is checked on every
/// request and pushed forward by the full window while still valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    #[schema(value_type = String, format = Uuid)]
    user_id: UserId,
    #[schema(value_type = String, example = "alice")]
    user_name: UserName,
    #[schema(value_type = String, example = "alice@example.com")]
    email: EmailAddress,
    expires_at: DateTime<Utc>,
}

impl SessionClaims {
    /// Claims for `user`, valid for `window` from `now`.
    pub fn for_user(user: &User, now: DateTime<Utc>, window: Duration) -> Self {
        Self {
            user_id: *user.id(),
            user_name: user.user_name().clone(),
            email: user.email().clone(),
            expires_at: now + window,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn user_name(&self) -> &UserName {
        &self.user_name
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// True once `now` has reached the expiry instant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Renew the window from `now`.
    #[must_use]
    pub fn slide(mut self, now: DateTime<Utc>, window: Duration) -> Self {
        self.expires_at = now + window;
        self
    }
}
