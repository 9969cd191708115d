mod errors;
mod session_store;
mod types;

pub use errors::StorageError;
pub use session_store::{
    AUTH_SESSION_STORE_TYPE, AUTH_SESSION_STORE_URL, AuthSessionStore, InMemoryAuthSessionStore,
    RedisAuthSessionStore, create_store, store_from_env,
};
pub use types::{AuthenticationSession, RootAuthenticationSession, TabRemoval, UserSession};
