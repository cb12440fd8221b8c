//! Server settings and the shared state handed to every handler.

use crate::{api::edge::EdgePolicy, auth::SessionVerifier, config::ConfigStore};

pub const DEFAULT_ADMIN_COOKIE_TTL_SECONDS: i64 = 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct AppConfig {
    secure_cookies: bool,
    admin_cookie_ttl_seconds: i64,
    edge_policy: EdgePolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            secure_cookies: false,
            admin_cookie_ttl_seconds: DEFAULT_ADMIN_COOKIE_TTL_SECONDS,
            edge_policy: EdgePolicy::PassThrough,
        }
    }

    #[must_use]
    pub const fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    #[must_use]
    pub const fn with_admin_cookie_ttl_seconds(mut self, seconds: i64) -> Self {
        self.admin_cookie_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub const fn with_edge_policy(mut self, policy: EdgePolicy) -> Self {
        self.edge_policy = policy;
        self
    }

    #[must_use]
    pub const fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    #[must_use]
    pub const fn admin_cookie_ttl_seconds(&self) -> i64 {
        self.admin_cookie_ttl_seconds
    }

    #[must_use]
    pub const fn edge_policy(&self) -> EdgePolicy {
        self.edge_policy
    }
}

/// Read-only state shared across requests.
#[derive(Debug)]
pub struct AppState {
    config: AppConfig,
    store: ConfigStore,
    sessions: SessionVerifier,
}

impl AppState {
    #[must_use]
    pub const fn new(config: AppConfig, store: ConfigStore, sessions: SessionVerifier) -> Self {
        Self {
            config,
            store,
            sessions,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub const fn store(&self) -> &ConfigStore {
        &self.store
    }

    #[must_use]
    pub const fn sessions(&self) -> &SessionVerifier {
        &self.sessions
    }
}
