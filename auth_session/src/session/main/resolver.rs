use crate::cookie::{CookieStore, SameSite, SetCookie};
use crate::realm::Realm;
use crate::session::config::{AUTH_SESSION_COOKIE_LIMIT, AUTH_SESSION_COOKIE_NAME};
use crate::session::errors::SessionError;
use crate::session::types::{RequestContext, SessionServices};
use crate::session_id::{AuthSessionId, StickySessionEncoder};
use crate::storage::{
    AuthSessionStore, AuthenticationSession, RootAuthenticationSession, UserSession,
};

/// Values of the auth session cookie, capped at [`AUTH_SESSION_COOKIE_LIMIT`].
/// Anything the client sends past the cap is never looked at.
pub(super) fn auth_session_cookies(cookies: &dyn CookieStore) -> Vec<String> {
    let values: Vec<String> = cookies
        .get_cookie_values(&AUTH_SESSION_COOKIE_NAME)
        .into_iter()
        .take(AUTH_SESSION_COOKIE_LIMIT)
        .collect();

    if values.is_empty() {
        tracing::debug!("No {} cookie found", *AUTH_SESSION_COOKIE_NAME);
    }
    values
}

/// Decode one cookie value and keep it only if a root session with that id
/// exists in `realm`.
///
/// User sessions share the root session id space, so a cookie is never
/// trusted before this check passes.
pub(super) async fn existing_root_session(
    store: &dyn AuthSessionStore,
    encoder: &dyn StickySessionEncoder,
    realm: &Realm,
    cookie_value: &str,
) -> Result<Option<(AuthSessionId, RootAuthenticationSession)>, SessionError> {
    let auth_session_id = AuthSessionId::decode(encoder, cookie_value);
    let root = store
        .get_root_session(realm, &auth_session_id.decoded_id)
        .await?;
    Ok(root.map(|root| (auth_session_id, root)))
}

fn reencode_auth_session_cookie(
    services: &SessionServices,
    ctx: &mut RequestContext<'_>,
    cookie_value: &str,
    auth_session_id: &AuthSessionId,
) {
    if auth_session_id.route_changed(cookie_value) {
        tracing::debug!(
            old = cookie_value,
            new = %auth_session_id.encoded_id,
            "Route changed, updating auth session cookie"
        );
        set_auth_session_cookie(services, ctx, &auth_session_id.decoded_id);
    }
}

/// Issue the auth session cookie for an undecorated root session id.
///
/// Browser-session lifetime, realm path, always `HttpOnly` and
/// `SameSite=None`. Browsers drop `SameSite=None` cookies lacking `Secure`,
/// so `Secure` is set regardless of the realm's SSL policy. Browsers accept
/// such cookies over plain HTTP only from localhost.
pub fn set_auth_session_cookie(
    services: &SessionServices,
    ctx: &mut RequestContext<'_>,
    auth_session_id: &str,
) {
    let encoded = services.encoder.encode_session_id(auth_session_id);
    let cookie = SetCookie::new(AUTH_SESSION_COOKIE_NAME.as_str(), encoded.as_str())
        .path(ctx.realm.cookie_path())
        .secure(true)
        .http_only(true)
        .same_site(SameSite::None);
    ctx.cookies.add_cookie(cookie);

    tracing::debug!(cookie_value = %encoded, "Set auth session cookie");
}

/// Create a root session. With `browser_cookie` the auth session cookie is
/// issued for it as well.
#[tracing::instrument(skip_all, fields(realm = %ctx.realm.name))]
pub async fn create_authentication_session(
    services: &SessionServices,
    ctx: &mut RequestContext<'_>,
    browser_cookie: bool,
) -> Result<RootAuthenticationSession, SessionError> {
    let root = services
        .store
        .create_root_session(ctx.realm, services.now())
        .await?;

    if browser_cookie {
        set_auth_session_cookie(services, ctx, &root.id);
    }
    Ok(root)
}

/// Start a new browser tab inside `root` for `client_id`.
pub async fn add_tab(
    services: &SessionServices,
    realm: &Realm,
    root: &RootAuthenticationSession,
    client_id: &str,
) -> Result<Option<AuthenticationSession>, SessionError> {
    let tab = services.store.create_tab(realm, &root.id, client_id).await?;
    if let Some(tab) = &tab {
        tracing::debug!(root_session = %root.id, tab_id = %tab.tab_id, "Tab created");
    }
    Ok(tab)
}

/// The root session referenced by the first usable auth session cookie.
#[tracing::instrument(skip_all, fields(realm = %ctx.realm.name))]
pub async fn get_current_root_session(
    services: &SessionServices,
    ctx: &mut RequestContext<'_>,
) -> Result<Option<RootAuthenticationSession>, SessionError> {
    for cookie_value in auth_session_cookies(&*ctx.cookies) {
        let Some((auth_session_id, root)) = existing_root_session(
            services.store.as_ref(),
            services.encoder.as_ref(),
            ctx.realm,
            &cookie_value,
        )
        .await?
        else {
            continue;
        };

        tracing::debug!(root_session = %root.id, "Cookie resolved");
        reencode_auth_session_cookie(services, ctx, &cookie_value, &auth_session_id);
        return Ok(Some(root));
    }
    Ok(None)
}

/// The user session sharing its id with the first usable auth session
/// cookie's root session.
#[tracing::instrument(skip_all, fields(realm = %ctx.realm.name))]
pub async fn get_user_session_from_auth_cookie(
    services: &SessionServices,
    ctx: &mut RequestContext<'_>,
) -> Result<Option<UserSession>, SessionError> {
    for cookie_value in auth_session_cookies(&*ctx.cookies) {
        let Some((auth_session_id, _root)) = existing_root_session(
            services.store.as_ref(),
            services.encoder.as_ref(),
            ctx.realm,
            &cookie_value,
        )
        .await?
        else {
            continue;
        };

        let user_session = services
            .store
            .get_user_session(ctx.realm, &auth_session_id.decoded_id)
            .await?;
        if let Some(user_session) = user_session {
            tracing::debug!(user_session = %user_session.id, "Cookie resolved");
            reencode_auth_session_cookie(services, ctx, &cookie_value, &auth_session_id);
            return Ok(Some(user_session));
        }
    }
    Ok(None)
}

/// The tab `tab_id` of `client_id` in the first usable auth session cookie's
/// root session.
#[tracing::instrument(skip_all, fields(realm = %ctx.realm.name, client_id = %client_id, tab_id = %tab_id))]
pub async fn get_current_authentication_session(
    services: &SessionServices,
    ctx: &mut RequestContext<'_>,
    client_id: &str,
    tab_id: &str,
) -> Result<Option<AuthenticationSession>, SessionError> {
    for cookie_value in auth_session_cookies(&*ctx.cookies) {
        let Some((auth_session_id, root)) = existing_root_session(
            services.store.as_ref(),
            services.encoder.as_ref(),
            ctx.realm,
            &cookie_value,
        )
        .await?
        else {
            continue;
        };

        if let Some(tab) = root.authentication_session(client_id, tab_id) {
            tracing::debug!(root_session = %root.id, tab_id, "Cookie resolved");
            let tab = tab.clone();
            reencode_auth_session_cookie(services, ctx, &cookie_value, &auth_session_id);
            return Ok(Some(tab));
        }
    }
    Ok(None)
}

/// Look up a tab directly by root session id. No cookies are involved.
pub async fn get_authentication_session_by_id_and_client(
    services: &SessionServices,
    realm: &Realm,
    auth_session_id: &str,
    client_id: &str,
    tab_id: &str,
) -> Result<Option<AuthenticationSession>, SessionError> {
    let root = services.store.get_root_session(realm, auth_session_id).await?;
    Ok(root.and_then(|root| root.authentication_session(client_id, tab_id).cloned()))
}

/// The user session already established under this tab's root session id.
pub async fn get_user_session(
    services: &SessionServices,
    realm: &Realm,
    auth_session: &AuthenticationSession,
) -> Result<Option<UserSession>, SessionError> {
    Ok(services
        .store
        .get_user_session(realm, &auth_session.root_session_id)
        .await?)
}
