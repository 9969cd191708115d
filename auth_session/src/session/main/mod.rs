mod auth_state;
mod lifecycle;
mod resolver;
mod state_checker;

#[cfg(test)]
pub(crate) mod test_utils;

pub use auth_state::AuthenticationStateCookie;
pub use lifecycle::{
    finalize_successful_tab, remove_expired_sessions, remove_root_session, remove_tab,
};
pub use resolver::{
    add_tab, create_authentication_session, get_authentication_session_by_id_and_client,
    get_current_authentication_session, get_current_root_session, get_user_session,
    get_user_session_from_auth_cookie, set_auth_session_cookie,
};
pub use state_checker::{
    DetachedInfoStateCookie, DetachedMessage, generate_and_set_state_checker_cookie,
    verify_state_checker_parameter,
};
