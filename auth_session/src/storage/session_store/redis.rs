use async_trait::async_trait;
use redis::{self, AsyncCommands};
use std::collections::HashMap;
use std::sync::LazyLock;
use uuid::Uuid;

use crate::realm::Realm;
use crate::storage::errors::StorageError;
use crate::storage::types::{
    AuthenticationSession, RootAuthenticationSession, TabRemoval, UserSession,
};
use crate::utils::gen_random_string;

use super::types::{AuthSessionStore, RedisAuthSessionStore};

const KEY_PREFIX: &str = "auth_session";

// KEYS[1] root hash, KEYS[2] tabs hash, ARGV[1] tab id.
// Returns -1 when the root is missing, 0 when this call removed the root,
// otherwise the number of remaining tabs.
static REMOVE_TAB_SCRIPT: LazyLock<redis::Script> = LazyLock::new(|| {
    redis::Script::new(
        r"
        if redis.call('EXISTS', KEYS[1]) == 0 then
            return -1
        end
        redis.call('HDEL', KEYS[2], ARGV[1])
        local remaining = redis.call('HLEN', KEYS[2])
        if remaining == 0 then
            redis.call('DEL', KEYS[1], KEYS[2])
        end
        return remaining
        ",
    )
});

// KEYS[1] root hash, KEYS[2] tabs hash, ARGV[1] tab id, ARGV[2] tab json.
// The tabs hash inherits the root's remaining TTL.
static CREATE_TAB_SCRIPT: LazyLock<redis::Script> = LazyLock::new(|| {
    redis::Script::new(
        r"
        if redis.call('EXISTS', KEYS[1]) == 0 then
            return 0
        end
        if redis.call('HSETNX', KEYS[2], ARGV[1], ARGV[2]) == 0 then
            return -1
        end
        local ttl = redis.call('PTTL', KEYS[1])
        if ttl > 0 then
            redis.call('PEXPIRE', KEYS[2], ttl)
        end
        return 1
        ",
    )
});

// KEYS[1] root hash, KEYS[2] tabs hash, ARGV[1] timestamp, ARGV[2] expire-at.
static SET_TIMESTAMP_SCRIPT: LazyLock<redis::Script> = LazyLock::new(|| {
    redis::Script::new(
        r"
        if redis.call('EXISTS', KEYS[1]) == 0 then
            return 0
        end
        redis.call('HSET', KEYS[1], 'timestamp', ARGV[1])
        redis.call('EXPIREAT', KEYS[1], ARGV[2])
        redis.call('EXPIREAT', KEYS[2], ARGV[2])
        return 1
        ",
    )
});

impl RedisAuthSessionStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    fn root_key(realm: &str, id: &str) -> String {
        format!("{KEY_PREFIX}:root:{realm}:{id}")
    }

    fn tabs_key(realm: &str, id: &str) -> String {
        format!("{KEY_PREFIX}:tabs:{realm}:{id}")
    }

    fn user_session_key(realm: &str, id: &str) -> String {
        format!("{KEY_PREFIX}:user_session:{realm}:{id}")
    }
}

#[async_trait]
impl AuthSessionStore for RedisAuthSessionStore {
    async fn init(&self) -> Result<(), StorageError> {
        // Verify the connection works
        let _conn = self.client.get_multiplexed_async_connection().await?;
        Ok(())
    }

    async fn create_root_session(
        &self,
        realm: &Realm,
        timestamp: i64,
    ) -> Result<RootAuthenticationSession, StorageError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let id = Uuid::new_v4().to_string();
        let root_key = Self::root_key(&realm.name, &id);
        let expire_at = timestamp + realm.auth_session_lifespan();

        let _: () = redis::pipe()
            .atomic()
            .cmd("HSET")
            .arg(&root_key)
            .arg("id")
            .arg(&id)
            .arg("realm")
            .arg(&realm.name)
            .arg("timestamp")
            .arg(timestamp)
            .ignore()
            .cmd("EXPIREAT")
            .arg(&root_key)
            .arg(expire_at)
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(RootAuthenticationSession {
            id,
            realm: realm.name.clone(),
            timestamp,
            tabs: HashMap::new(),
        })
    }

    async fn get_root_session(
        &self,
        realm: &Realm,
        id: &str,
    ) -> Result<Option<RootAuthenticationSession>, StorageError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let (fields, stored_tabs): (HashMap<String, String>, HashMap<String, String>) =
            redis::pipe()
                .cmd("HGETALL")
                .arg(Self::root_key(&realm.name, id))
                .cmd("HGETALL")
                .arg(Self::tabs_key(&realm.name, id))
                .query_async(&mut conn)
                .await?;

        if fields.is_empty() {
            return Ok(None);
        }

        let timestamp = fields
            .get("timestamp")
            .and_then(|t| t.parse::<i64>().ok())
            .ok_or_else(|| {
                StorageError::InvalidData(format!("Root session {id} has no valid timestamp"))
            })?;

        let mut tabs = HashMap::with_capacity(stored_tabs.len());
        for (tab_id, json) in stored_tabs {
            let tab: AuthenticationSession = serde_json::from_str(&json)?;
            tabs.insert(tab_id, tab);
        }

        Ok(Some(RootAuthenticationSession {
            id: id.to_string(),
            realm: realm.name.clone(),
            timestamp,
            tabs,
        }))
    }

    async fn remove_root_session(&self, realm: &Realm, id: &str) -> Result<(), StorageError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let keys = vec![
            Self::root_key(&realm.name, id),
            Self::tabs_key(&realm.name, id),
        ];
        let _: () = conn.del(keys).await?;
        Ok(())
    }

    async fn create_tab(
        &self,
        realm: &Realm,
        root_id: &str,
        client_id: &str,
    ) -> Result<Option<AuthenticationSession>, StorageError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        loop {
            let tab = AuthenticationSession {
                tab_id: gen_random_string(8)?,
                client_id: client_id.to_string(),
                root_session_id: root_id.to_string(),
                realm: realm.name.clone(),
            };
            let json = serde_json::to_string(&tab)?;

            let created: i64 = CREATE_TAB_SCRIPT
                .key(Self::root_key(&realm.name, root_id))
                .key(Self::tabs_key(&realm.name, root_id))
                .arg(&tab.tab_id)
                .arg(json)
                .invoke_async(&mut conn)
                .await?;

            match created {
                1 => return Ok(Some(tab)),
                0 => return Ok(None),
                _ => tracing::debug!("Tab id collision in root session {}, retrying", root_id),
            }
        }
    }

    async fn remove_tab(
        &self,
        realm: &Realm,
        root_id: &str,
        tab_id: &str,
    ) -> Result<TabRemoval, StorageError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let remaining: i64 = REMOVE_TAB_SCRIPT
            .key(Self::root_key(&realm.name, root_id))
            .key(Self::tabs_key(&realm.name, root_id))
            .arg(tab_id)
            .invoke_async(&mut conn)
            .await?;

        Ok(match remaining {
            r if r < 0 => TabRemoval::RootNotFound,
            0 => TabRemoval::RootRemoved,
            r => TabRemoval::TabsRemaining(r as usize),
        })
    }

    async fn set_timestamp(
        &self,
        realm: &Realm,
        root_id: &str,
        timestamp: i64,
    ) -> Result<bool, StorageError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let updated: i64 = SET_TIMESTAMP_SCRIPT
            .key(Self::root_key(&realm.name, root_id))
            .key(Self::tabs_key(&realm.name, root_id))
            .arg(timestamp)
            .arg(timestamp + realm.auth_session_lifespan())
            .invoke_async(&mut conn)
            .await?;

        Ok(updated == 1)
    }

    async fn get_user_session(
        &self,
        realm: &Realm,
        id: &str,
    ) -> Result<Option<UserSession>, StorageError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let value: Option<String> = conn.get(Self::user_session_key(&realm.name, id)).await?;

        match value {
            Some(v) => Ok(Some(serde_json::from_str(&v)?)),
            None => Ok(None),
        }
    }

    async fn put_user_session(&self, session: UserSession) -> Result<(), StorageError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let key = Self::user_session_key(&session.realm, &session.id);
        let value = serde_json::to_string(&session)?;
        let _: () = conn.set(&key, value).await?;
        Ok(())
    }

    async fn remove_expired(&self, realm: &Realm, _now: i64) -> Result<usize, StorageError> {
        // Root and tab keys carry EXPIREAT deadlines, so redis evicts them itself.
        tracing::trace!("Skipping sweep for realm {}: redis expires keys", realm.name);
        Ok(0)
    }
}
