use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::realm::Realm;
use crate::storage::errors::StorageError;
use crate::storage::types::{
    AuthenticationSession, RootAuthenticationSession, TabRemoval, UserSession,
};
use crate::utils::gen_random_string;

use super::types::{AuthSessionStore, InMemoryAuthSessionStore};

impl InMemoryAuthSessionStore {
    pub fn new() -> Self {
        tracing::info!("Creating new in-memory auth session store");
        Self {
            roots: Mutex::new(HashMap::new()),
            user_sessions: Mutex::new(HashMap::new()),
        }
    }

    fn make_key(realm: &str, id: &str) -> String {
        format!("{realm}:{id}")
    }
}

impl Default for InMemoryAuthSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthSessionStore for InMemoryAuthSessionStore {
    async fn init(&self) -> Result<(), StorageError> {
        Ok(()) // Nothing to initialize for in-memory store
    }

    async fn create_root_session(
        &self,
        realm: &Realm,
        timestamp: i64,
    ) -> Result<RootAuthenticationSession, StorageError> {
        let root = RootAuthenticationSession {
            id: Uuid::new_v4().to_string(),
            realm: realm.name.clone(),
            timestamp,
            tabs: HashMap::new(),
        };
        self.roots
            .lock()
            .await
            .insert(Self::make_key(&realm.name, &root.id), root.clone());
        Ok(root)
    }

    async fn get_root_session(
        &self,
        realm: &Realm,
        id: &str,
    ) -> Result<Option<RootAuthenticationSession>, StorageError> {
        let key = Self::make_key(&realm.name, id);
        Ok(self.roots.lock().await.get(&key).cloned())
    }

    async fn remove_root_session(&self, realm: &Realm, id: &str) -> Result<(), StorageError> {
        let key = Self::make_key(&realm.name, id);
        self.roots.lock().await.remove(&key);
        Ok(())
    }

    async fn create_tab(
        &self,
        realm: &Realm,
        root_id: &str,
        client_id: &str,
    ) -> Result<Option<AuthenticationSession>, StorageError> {
        let key = Self::make_key(&realm.name, root_id);
        let mut roots = self.roots.lock().await;
        let Some(root) = roots.get_mut(&key) else {
            return Ok(None);
        };

        let mut tab_id = gen_random_string(8)?;
        while root.tabs.contains_key(&tab_id) {
            tab_id = gen_random_string(8)?;
        }

        let tab = AuthenticationSession {
            tab_id: tab_id.clone(),
            client_id: client_id.to_string(),
            root_session_id: root.id.clone(),
            realm: realm.name.clone(),
        };
        root.tabs.insert(tab_id, tab.clone());
        Ok(Some(tab))
    }

    async fn remove_tab(
        &self,
        realm: &Realm,
        root_id: &str,
        tab_id: &str,
    ) -> Result<TabRemoval, StorageError> {
        let key = Self::make_key(&realm.name, root_id);
        let mut roots = self.roots.lock().await;
        let Some(root) = roots.get_mut(&key) else {
            return Ok(TabRemoval::RootNotFound);
        };

        root.tabs.remove(tab_id);
        let remaining = root.tabs.len();
        if remaining == 0 {
            roots.remove(&key);
            return Ok(TabRemoval::RootRemoved);
        }
        Ok(TabRemoval::TabsRemaining(remaining))
    }

    async fn set_timestamp(
        &self,
        realm: &Realm,
        root_id: &str,
        timestamp: i64,
    ) -> Result<bool, StorageError> {
        let key = Self::make_key(&realm.name, root_id);
        match self.roots.lock().await.get_mut(&key) {
            Some(root) => {
                root.timestamp = timestamp;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get_user_session(
        &self,
        realm: &Realm,
        id: &str,
    ) -> Result<Option<UserSession>, StorageError> {
        let key = Self::make_key(&realm.name, id);
        Ok(self.user_sessions.lock().await.get(&key).cloned())
    }

    async fn put_user_session(&self, session: UserSession) -> Result<(), StorageError> {
        let key = Self::make_key(&session.realm, &session.id);
        self.user_sessions.lock().await.insert(key, session);
        Ok(())
    }

    async fn remove_expired(&self, realm: &Realm, now: i64) -> Result<usize, StorageError> {
        let lifespan = realm.auth_session_lifespan();
        let mut roots = self.roots.lock().await;
        let before = roots.len();
        roots.retain(|_, root| root.realm != realm.name || !root.is_expired(now, lifespan));
        Ok(before - roots.len())
    }
}
