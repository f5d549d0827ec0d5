//! HTTP server configuration object.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::domain::ports::CredentialStore;
use crate::inbound::http::session_config::{SessionCookiePolicy, SessionSettings};
use crate::inbound::http::state::AuthRoutes;
use crate::outbound::password::Argon2Costs;

/// Everything needed to assemble the application.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) cookie_policy: SessionCookiePolicy,
    pub(crate) routes: AuthRoutes,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) store: Arc<dyn CredentialStore>,
    pub(crate) argon2: Argon2Costs,
}

impl ServerConfig {
    /// Configuration with default cookie policy, routes, and Argon2 costs.
    #[must_use]
    pub fn new(
        session: SessionSettings,
        bind_addr: SocketAddr,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            session,
            cookie_policy: SessionCookiePolicy::default(),
            routes: AuthRoutes::default(),
            bind_addr,
            store,
            argon2: Argon2Costs::default(),
        }
    }

    #[must_use]
    pub fn with_cookie_policy(mut self, policy: SessionCookiePolicy) -> Self {
        self.cookie_policy = policy;
        self
    }

    #[must_use]
    pub fn with_routes(mut self, routes: AuthRoutes) -> Self {
        self.routes = routes;
        self
    }

    #[must_use]
    pub fn with_argon2_costs(mut self, costs: Argon2Costs) -> Self {
        self.argon2 = costs;
        self
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
