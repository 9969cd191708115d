//! auth_session - Browser cookie to server-side authentication session
//! correlation
//!
//! This crate resolves the authentication session behind a request's
//! cookies, keeps sticky-session routes current in a cluster, manages the
//! browser tabs sharing one root session, and guards detached info pages
//! against parameter tampering.

mod cookie;
mod realm;
mod session;
mod session_id;
mod storage;
mod token;
mod utils;

pub use crate::cookie::{CookieStore, HeaderCookieJar, SameSite, SetCookie};
pub use realm::{ClientConnection, Realm, SslRequired};
pub use session_id::{AuthSessionId, RouteSuffixEncoder, StickySessionEncoder};
pub use token::TokenCodec;
pub use utils::UtilError;

pub use session::{
    AUTH_RESTART_COOKIE_NAME, AUTH_SESSION_COOKIE_LIMIT, AUTH_SESSION_COOKIE_NAME,
    AUTH_SESSION_ROUTE, AUTH_STATE_COOKIE_NAME, AuthenticationStateCookie, Clock,
    DetachedInfoStateCookie, DetachedMessage, RequestContext, STATE_CHECKER_COOKIE_NAME,
    STATE_CHECKER_PARAM, SessionError, SessionServices, SystemClock, add_tab,
    create_authentication_session, finalize_successful_tab, generate_and_set_state_checker_cookie,
    get_authentication_session_by_id_and_client, get_current_authentication_session,
    get_current_root_session, get_user_session, get_user_session_from_auth_cookie,
    remove_expired_sessions, remove_root_session, remove_tab, set_auth_session_cookie,
    verify_state_checker_parameter,
};

pub use storage::{
    AUTH_SESSION_STORE_TYPE, AUTH_SESSION_STORE_URL, AuthSessionStore, AuthenticationSession,
    InMemoryAuthSessionStore, RedisAuthSessionStore, RootAuthenticationSession, StorageError,
    TabRemoval, UserSession, create_store, store_from_env,
};
