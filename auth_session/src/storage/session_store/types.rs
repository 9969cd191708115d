use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::realm::Realm;
use crate::storage::errors::StorageError;
use crate::storage::types::{
    AuthenticationSession, RootAuthenticationSession, TabRemoval, UserSession,
};

pub struct InMemoryAuthSessionStore {
    pub(super) roots: Mutex<HashMap<String, RootAuthenticationSession>>,
    pub(super) user_sessions: Mutex<HashMap<String, UserSession>>,
}

pub struct RedisAuthSessionStore {
    pub(super) client: redis::Client,
}

/// Durable home of root authentication sessions and user sessions.
///
/// Shared by every request; implementations must make each method a single
/// atomic step with respect to the root session it touches.
#[async_trait]
pub trait AuthSessionStore: Send + Sync + 'static {
    /// Initialize the store. This is called when the store is created.
    async fn init(&self) -> Result<(), StorageError>;

    /// Create an empty root session with a fresh id.
    async fn create_root_session(
        &self,
        realm: &Realm,
        timestamp: i64,
    ) -> Result<RootAuthenticationSession, StorageError>;

    async fn get_root_session(
        &self,
        realm: &Realm,
        id: &str,
    ) -> Result<Option<RootAuthenticationSession>, StorageError>;

    /// Delete a root session and all of its tabs. Missing ids are not an error.
    async fn remove_root_session(&self, realm: &Realm, id: &str) -> Result<(), StorageError>;

    /// Add a tab for `client_id`. `None` when the root session does not exist.
    async fn create_tab(
        &self,
        realm: &Realm,
        root_id: &str,
        client_id: &str,
    ) -> Result<Option<AuthenticationSession>, StorageError>;

    /// Remove a tab and, when none are left, the root session with it.
    async fn remove_tab(
        &self,
        realm: &Realm,
        root_id: &str,
        tab_id: &str,
    ) -> Result<TabRemoval, StorageError>;

    /// Overwrite the last-activity timestamp. `false` when the root is gone.
    async fn set_timestamp(
        &self,
        realm: &Realm,
        root_id: &str,
        timestamp: i64,
    ) -> Result<bool, StorageError>;

    async fn get_user_session(
        &self,
        realm: &Realm,
        id: &str,
    ) -> Result<Option<UserSession>, StorageError>;

    async fn put_user_session(&self, session: UserSession) -> Result<(), StorageError>;

    /// Evict root sessions whose timestamp plus the realm's auth session
    /// lifespan has passed. Returns how many were evicted.
    async fn remove_expired(&self, realm: &Realm, now: i64) -> Result<usize, StorageError>;
}
