use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One browser tab's authentication attempt inside a root session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationSession {
    pub tab_id: String,
    pub client_id: String,
    /// Id of the owning root session. A back-reference only.
    pub root_session_id: String,
    pub realm: String,
}

/// Browser-level authentication context shared by all tabs of one login
/// attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootAuthenticationSession {
    pub id: String,
    pub realm: String,
    /// Last activity, seconds since the epoch.
    pub timestamp: i64,
    pub tabs: HashMap<String, AuthenticationSession>,
}

impl RootAuthenticationSession {
    /// The tab `tab_id`, provided it was started by `client_id`.
    pub fn authentication_session(
        &self,
        client_id: &str,
        tab_id: &str,
    ) -> Option<&AuthenticationSession> {
        self.tabs
            .get(tab_id)
            .filter(|tab| tab.client_id == client_id)
    }

    pub fn is_expired(&self, now: i64, lifespan: i64) -> bool {
        self.timestamp + lifespan <= now
    }
}

/// A fully authenticated session. Shares its id space with root
/// authentication sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub id: String,
    pub realm: String,
    pub user_id: String,
    pub started: i64,
    pub last_session_refresh: i64,
}

/// Outcome of removing one tab, decided in a single atomic store step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabRemoval {
    /// Other tabs remain; the root session is kept.
    TabsRemaining(usize),
    /// No tabs were left, and the root session was deleted by this call.
    RootRemoved,
    /// There is no root session with that id.
    RootNotFound,
}
