mod config;
mod memory;
mod redis;
mod types;

pub use config::{AUTH_SESSION_STORE_TYPE, AUTH_SESSION_STORE_URL, create_store, store_from_env};
pub use types::{AuthSessionStore, InMemoryAuthSessionStore, RedisAuthSessionStore};
