use serde::{Deserialize, Serialize};

use crate::cookie::SetCookie;
use crate::session::config::AUTH_STATE_COOKIE_NAME;
use crate::session::errors::SessionError;
use crate::session::types::{RequestContext, SessionServices};
use crate::storage::RootAuthenticationSession;
use crate::utils::sha256_base64url;

/// Payload of the script-readable cookie announcing that one tab finished
/// authenticating. Sibling tabs use it to finish on their own before the root
/// session expires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationStateCookie {
    pub remaining_time: i64,
    pub auth_session_id_hash: String,
}

pub(super) fn generate_and_set_cookie(
    services: &SessionServices,
    ctx: &mut RequestContext<'_>,
    root: &RootAuthenticationSession,
    expires_in: i64,
) -> Result<AuthenticationStateCookie, SessionError> {
    let state = AuthenticationStateCookie {
        remaining_time: expires_in,
        auth_session_id_hash: sha256_base64url(&root.id),
    };
    let encoded = services.tokens.encode(&state, services.now(), expires_in)?;

    let cookie = SetCookie::new(AUTH_STATE_COOKIE_NAME.as_str(), encoded)
        .path(ctx.realm.cookie_path())
        .max_age(expires_in)
        .secure(ctx.secure_only())
        .http_only(false);
    ctx.cookies.add_cookie(cookie);

    tracing::trace!(
        root_session = %root.id,
        expires_in,
        "Set authentication state cookie"
    );
    Ok(state)
}

pub(super) fn expire_cookie(ctx: &mut RequestContext<'_>) {
    let path = ctx.realm.cookie_path();
    ctx.cookies.expire_cookie(&AUTH_STATE_COOKIE_NAME, &path);
}
