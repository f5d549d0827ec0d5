//! Shared HTTP adapter state.
//!
//! Handlers receive this through `actix_web::web::Data`, so they depend only
//! on the [`AccountCommand`] port and stay testable without I/O.

use std::sync::Arc;

use chrono::Duration;
use mockable::Clock;

use crate::domain::DEFAULT_SESSION_WINDOW_MINUTES;
use crate::domain::ports::AccountCommand;

/// Paths the account flow redirects between.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthRoutes {
    /// Where unauthenticated users are sent, and where logout lands.
    pub login_path: String,
    /// Default destination after login when no usable `returnUrl` is given.
    pub landing_path: String,
}

impl Default for AuthRoutes {
    fn default() -> Self {
        Self {
            login_path: "/login".to_owned(),
            landing_path: "/".to_owned(),
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
    pub clock: Arc<dyn Clock>,
    pub routes: AuthRoutes,
    /// Sliding session window applied on every authenticated request.
    pub session_window: Duration,
}

impl HttpState {
    /// Construct state with default routes and a one-hour window.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use orderdesk::domain::AccountService;
    /// use orderdesk::inbound::http::state::HttpState;
    /// use orderdesk::outbound::password::Argon2PasswordHasher;
    /// use orderdesk::outbound::persistence::InMemoryCredentialStore;
    ///
    /// let service = AccountService::new(
    ///     Arc::new(InMemoryCredentialStore::new()),
    ///     Arc::new(Argon2PasswordHasher::default()),
    ///     Arc::new(DefaultClock),
    /// );
    /// let state = HttpState::new(Arc::new(service), Arc::new(DefaultClock));
    /// assert_eq!(state.routes.login_path, "/login");
    /// ```
    pub fn new(accounts: Arc<dyn AccountCommand>, clock: Arc<dyn Clock>) -> Self {
        Self {
            accounts,
            clock,
            routes: AuthRoutes::default(),
            session_window: Duration::minutes(DEFAULT_SESSION_WINDOW_MINUTES),
        }
    }

    pub fn with_routes(mut self, routes: AuthRoutes) -> Self {
        self.routes = routes;
        self
    }

    pub fn with_session_window(mut self, window: Duration) -> Self {
        self.session_window = window;
        self
    }
}
