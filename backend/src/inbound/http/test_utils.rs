//! Test helpers for inbound HTTP components.

use std::sync::{Arc, Mutex};

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Key, SameSite};
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;

use super::session_config::{SessionCookiePolicy, SessionSettings};

/// Session middleware with a fresh key, cookie name `session`, and the
/// `Secure` flag off for plain-HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionSettings {
        key: Key::generate(),
        cookie_secure: false,
        same_site: SameSite::Lax,
    }
    .middleware(&SessionCookiePolicy::default())
}

/// Clock that only moves when told to.
pub struct SteppingClock(Mutex<DateTime<Utc>>);

impl SteppingClock {
    pub fn starting_at_fixture() -> Arc<Self> {
        let start = Utc
            .with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
            .single()
            .expect("valid fixture timestamp");
        Arc::new(Self(Mutex::new(start)))
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock().expect("clock lock");
        *now += by;
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().expect("clock lock")
    }
}
