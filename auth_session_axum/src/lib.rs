mod config;
mod error;
mod extract;
mod handlers;
mod router;
mod state;

pub use config::{
    AUTH_SESSION_ACCESS_CODE_LIFESPAN, AUTH_SESSION_ACCESS_CODE_LIFESPAN_LOGIN,
    AUTH_SESSION_ACCESS_CODE_LIFESPAN_USER_ACTION, AUTH_SESSION_REALMS, AUTH_SESSION_SSL_REQUIRED,
    realms_from_env,
};
pub use error::IntoResponseError;
pub use extract::AuthSessionRequest;
pub use router::{auth_session_router, auth_session_router_no_trace};
pub use state::AuthSessionState;

// Re-export the core crate so applications need only this one dependency
pub use auth_session;
pub use auth_session::{SessionServices, store_from_env};
