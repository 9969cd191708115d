use std::sync::{Arc, LazyLock};

use crate::storage::errors::StorageError;

use super::types::{AuthSessionStore, InMemoryAuthSessionStore, RedisAuthSessionStore};

/// Backend selected by `AUTH_SESSION_STORE_TYPE`: `memory` (default) or `redis`.
pub static AUTH_SESSION_STORE_TYPE: LazyLock<String> = LazyLock::new(|| {
    std::env::var("AUTH_SESSION_STORE_TYPE").unwrap_or_else(|_| "memory".to_string())
});

pub static AUTH_SESSION_STORE_URL: LazyLock<String> = LazyLock::new(|| {
    std::env::var("AUTH_SESSION_STORE_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
});

/// Build the store configured through the environment.
pub async fn store_from_env() -> Result<Arc<dyn AuthSessionStore>, StorageError> {
    create_store(&AUTH_SESSION_STORE_TYPE, &AUTH_SESSION_STORE_URL).await
}

/// Build and initialize a store. Redis connectivity is checked up front.
pub async fn create_store(
    store_type: &str,
    store_url: &str,
) -> Result<Arc<dyn AuthSessionStore>, StorageError> {
    tracing::info!(
        "Initializing auth session store with type: {}, url: {}",
        store_type,
        store_url
    );

    let store: Arc<dyn AuthSessionStore> = match store_type {
        "memory" => Arc::new(InMemoryAuthSessionStore::new()),
        "redis" => {
            let client = redis::Client::open(store_url).map_err(|e| {
                tracing::error!("Failed to create Redis client: {}", e);
                StorageError::from(e)
            })?;
            Arc::new(RedisAuthSessionStore::new(client))
        }
        t => {
            return Err(StorageError::UnsupportedStore(format!(
                "{t}. Supported types are 'memory' and 'redis'"
            )));
        }
    };

    store.init().await.inspect_err(|e| {
        tracing::error!("Failed to initialize {} store: {}", store_type, e);
    })?;

    tracing::info!("Connected to auth session store: type={}", store_type);
    Ok(store)
}
