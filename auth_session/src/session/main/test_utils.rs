//! Test utilities for session module tests

use async_trait::async_trait;
use http::header::{COOKIE, HeaderMap, HeaderValue};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::cookie::HeaderCookieJar;
use crate::realm::Realm;
use crate::session::config::AUTH_SESSION_COOKIE_NAME;
use crate::session::types::{Clock, SessionServices};
use crate::session_id::RouteSuffixEncoder;
use crate::storage::{
    AuthSessionStore, AuthenticationSession, InMemoryAuthSessionStore, RootAuthenticationSession,
    StorageError, TabRemoval, UserSession,
};
use crate::token::TokenCodec;

pub(crate) const FIXED_NOW: i64 = 1_700_000_000;

pub(crate) struct FixedClock(pub(crate) i64);

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0
    }
}

/// In-memory services with a frozen clock at [`FIXED_NOW`].
pub(crate) fn fixed_services(route: Option<&str>) -> SessionServices {
    SessionServices::new(
        Arc::new(InMemoryAuthSessionStore::new()),
        Arc::new(RouteSuffixEncoder::new(route.map(str::to_string))),
        TokenCodec::new(b"test-secret"),
        Arc::new(FixedClock(FIXED_NOW)),
    )
}

impl SessionServices {
    pub(crate) fn with_store(mut self, store: Arc<dyn AuthSessionStore>) -> Self {
        self.store = store;
        self
    }

    pub(crate) fn with_clock_at(&self, now: i64) -> Self {
        let mut services = self.clone();
        services.clock = Arc::new(FixedClock(now));
        services
    }

    pub(crate) fn with_secret(mut self, secret: &[u8]) -> Self {
        self.tokens = TokenCodec::new(secret);
        self
    }
}

pub(crate) fn jar_with_cookie(name: &str, value: &str) -> HeaderCookieJar {
    let mut headers = HeaderMap::new();
    headers.insert(
        COOKIE,
        HeaderValue::from_str(&format!("{name}={value}")).unwrap(),
    );
    HeaderCookieJar::from_headers(&headers)
}

/// A jar presenting each value as its own auth session cookie, in order.
pub(crate) fn jar_with_auth_cookies(values: &[&str]) -> HeaderCookieJar {
    let header = values
        .iter()
        .map(|value| format!("{}={value}", *AUTH_SESSION_COOKIE_NAME))
        .collect::<Vec<_>>()
        .join("; ");
    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, HeaderValue::from_str(&header).unwrap());
    HeaderCookieJar::from_headers(&headers)
}

pub(crate) fn user_session_for(realm: &Realm, id: &str) -> UserSession {
    UserSession {
        id: id.to_string(),
        realm: realm.name.clone(),
        user_id: "user-1".to_string(),
        started: FIXED_NOW,
        last_session_refresh: FIXED_NOW,
    }
}

/// Create a root session at the services' "now" with `count` tabs for the
/// `account` client.
pub(crate) async fn root_with_tabs(
    services: &SessionServices,
    realm: &Realm,
    count: usize,
) -> (RootAuthenticationSession, Vec<AuthenticationSession>) {
    let root = services
        .store
        .create_root_session(realm, services.now())
        .await
        .unwrap();
    let mut tabs = Vec::with_capacity(count);
    for _ in 0..count {
        let tab = services
            .store
            .create_tab(realm, &root.id, "account")
            .await
            .unwrap()
            .unwrap();
        tabs.push(tab);
    }
    (root, tabs)
}

/// Store wrapper counting root session lookups.
pub(crate) struct CountingStore<S> {
    inner: S,
    root_lookups: AtomicUsize,
}

impl<S> CountingStore<S> {
    pub(crate) fn new(inner: S) -> Self {
        Self {
            inner,
            root_lookups: AtomicUsize::new(0),
        }
    }

    pub(crate) fn root_lookups(&self) -> usize {
        self.root_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: AuthSessionStore> AuthSessionStore for CountingStore<S> {
    async fn init(&self) -> Result<(), StorageError> {
        self.inner.init().await
    }

    async fn create_root_session(
        &self,
        realm: &Realm,
        timestamp: i64,
    ) -> Result<RootAuthenticationSession, StorageError> {
        self.inner.create_root_session(realm, timestamp).await
    }

    async fn get_root_session(
        &self,
        realm: &Realm,
        id: &str,
    ) -> Result<Option<RootAuthenticationSession>, StorageError> {
        self.root_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.get_root_session(realm, id).await
    }

    async fn remove_root_session(&self, realm: &Realm, id: &str) -> Result<(), StorageError> {
        self.inner.remove_root_session(realm, id).await
    }

    async fn create_tab(
        &self,
        realm: &Realm,
        root_id: &str,
        client_id: &str,
    ) -> Result<Option<AuthenticationSession>, StorageError> {
        self.inner.create_tab(realm, root_id, client_id).await
    }

    async fn remove_tab(
        &self,
        realm: &Realm,
        root_id: &str,
        tab_id: &str,
    ) -> Result<TabRemoval, StorageError> {
        self.inner.remove_tab(realm, root_id, tab_id).await
    }

    async fn set_timestamp(
        &self,
        realm: &Realm,
        root_id: &str,
        timestamp: i64,
    ) -> Result<bool, StorageError> {
        self.inner.set_timestamp(realm, root_id, timestamp).await
    }

    async fn get_user_session(
        &self,
        realm: &Realm,
        id: &str,
    ) -> Result<Option<UserSession>, StorageError> {
        self.inner.get_user_session(realm, id).await
    }

    async fn put_user_session(&self, session: UserSession) -> Result<(), StorageError> {
        self.inner.put_user_session(session).await
    }

    async fn remove_expired(&self, realm: &Realm, now: i64) -> Result<usize, StorageError> {
        self.inner.remove_expired(realm, now).await
    }
}
