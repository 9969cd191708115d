mod config;
mod errors;
mod main;
mod types;

pub use config::{
    AUTH_RESTART_COOKIE_NAME, AUTH_SESSION_COOKIE_LIMIT, AUTH_SESSION_COOKIE_NAME,
    AUTH_SESSION_ROUTE, AUTH_STATE_COOKIE_NAME, STATE_CHECKER_COOKIE_NAME, STATE_CHECKER_PARAM,
};
pub use errors::SessionError;
pub use main::{
    AuthenticationStateCookie, DetachedInfoStateCookie, DetachedMessage, add_tab,
    create_authentication_session, finalize_successful_tab, generate_and_set_state_checker_cookie,
    get_authentication_session_by_id_and_client, get_current_authentication_session,
    get_current_root_session, get_user_session, get_user_session_from_auth_cookie,
    remove_expired_sessions, remove_root_session, remove_tab, set_auth_session_cookie,
    verify_state_checker_parameter,
};
pub use types::{Clock, RequestContext, SessionServices, SystemClock};

pub(crate) use config::AUTH_SERVER_SECRET;
