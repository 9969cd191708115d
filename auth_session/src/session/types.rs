use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;

use crate::cookie::CookieStore;
use crate::realm::{ClientConnection, Realm};
use crate::session_id::{RouteSuffixEncoder, StickySessionEncoder};
use crate::storage::AuthSessionStore;
use crate::token::TokenCodec;

/// Source of "now", in seconds since the epoch.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// Collaborators shared by every request: the session store, the sticky
/// routing strategy, the token signer and the clock.
#[derive(Clone)]
pub struct SessionServices {
    pub(crate) store: Arc<dyn AuthSessionStore>,
    pub(crate) encoder: Arc<dyn StickySessionEncoder>,
    pub(crate) tokens: TokenCodec,
    pub(crate) clock: Arc<dyn Clock>,
}

impl SessionServices {
    pub fn new(
        store: Arc<dyn AuthSessionStore>,
        encoder: Arc<dyn StickySessionEncoder>,
        tokens: TokenCodec,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            encoder,
            tokens,
            clock,
        }
    }

    /// Services configured from the environment around the given store.
    pub fn from_env(store: Arc<dyn AuthSessionStore>) -> Self {
        Self::new(
            store,
            Arc::new(RouteSuffixEncoder::from_env()),
            TokenCodec::from_env(),
            Arc::new(SystemClock),
        )
    }

    pub fn store(&self) -> &Arc<dyn AuthSessionStore> {
        &self.store
    }

    pub fn now(&self) -> i64 {
        self.clock.now()
    }
}

impl fmt::Debug for SessionServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionServices")
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

/// Everything one request contributes: its realm, where it came from, its
/// cookies and its query string.
///
/// `detached_auth_session` is the signal for the page renderer: once set, the
/// page being produced has no live authentication session behind it.
pub struct RequestContext<'a> {
    pub realm: &'a Realm,
    pub connection: ClientConnection,
    pub cookies: &'a mut dyn CookieStore,
    query: HashMap<String, String>,
    detached_auth_session: bool,
}

impl<'a> RequestContext<'a> {
    pub fn new(
        realm: &'a Realm,
        connection: ClientConnection,
        cookies: &'a mut dyn CookieStore,
    ) -> Self {
        Self {
            realm,
            connection,
            cookies,
            query: HashMap::new(),
            detached_auth_session: false,
        }
    }

    pub fn with_query(mut self, query: HashMap<String, String>) -> Self {
        self.query = query;
        self
    }

    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Whether cookies issued for this request must be `Secure`.
    pub fn secure_only(&self) -> bool {
        self.realm.ssl_required.is_required(&self.connection)
    }

    pub fn set_detached_auth_session(&mut self) {
        self.detached_auth_session = true;
    }

    pub fn is_detached_auth_session(&self) -> bool {
        self.detached_auth_session
    }
}
