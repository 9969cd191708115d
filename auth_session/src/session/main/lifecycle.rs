use crate::realm::Realm;
use crate::session::config::AUTH_RESTART_COOKIE_NAME;
use crate::session::errors::SessionError;
use crate::session::types::{RequestContext, SessionServices};
use crate::storage::{AuthSessionStore, AuthenticationSession, TabRemoval};

use super::auth_state;

/// Root timestamp that leaves exactly `grace` seconds before a root session
/// with the given `lifespan` counts as expired.
pub(crate) fn grace_scheduled_timestamp(now: i64, lifespan: i64, grace: i64) -> i64 {
    now - lifespan + grace
}

fn expire_auxiliary_cookies(ctx: &mut RequestContext<'_>) {
    let path = ctx.realm.cookie_path();
    ctx.cookies.expire_cookie(&AUTH_RESTART_COOKIE_NAME, &path);
    auth_state::expire_cookie(ctx);

    // Pages rendered from here on have no authentication session behind them
    ctx.set_detached_auth_session();
}

/// Delete the root session outright.
///
/// With `expire_auxiliary_cookies` the restart and authentication state
/// cookies are expired too, and the request is marked detached.
#[tracing::instrument(skip_all, fields(realm = %ctx.realm.name, root_session = %root_session_id))]
pub async fn remove_root_session(
    services: &SessionServices,
    ctx: &mut RequestContext<'_>,
    root_session_id: &str,
    expire_auxiliary: bool,
) -> Result<(), SessionError> {
    tracing::debug!(expire_auxiliary, "Removing root session");
    services
        .store
        .remove_root_session(ctx.realm, root_session_id)
        .await?;

    if expire_auxiliary {
        expire_auxiliary_cookies(ctx);
    }
    Ok(())
}

/// Remove one tab from its root session. Returns `true` when that left the
/// root without tabs and the whole root session went with it.
///
/// The store decides emptiness and deletes the root in one step, so of two
/// tabs finishing at once exactly one sees `true`.
#[tracing::instrument(skip_all, fields(realm = %ctx.realm.name, tab_id = %auth_session.tab_id))]
pub async fn remove_tab(
    services: &SessionServices,
    ctx: &mut RequestContext<'_>,
    auth_session: &AuthenticationSession,
) -> Result<bool, SessionError> {
    let outcome = services
        .store
        .remove_tab(ctx.realm, &auth_session.root_session_id, &auth_session.tab_id)
        .await?;

    tracing::debug!(
        root_session = %auth_session.root_session_id,
        outcome = ?outcome,
        "Tab removed"
    );

    match outcome {
        TabRemoval::TabsRemaining(_) => Ok(false),
        TabRemoval::RootRemoved => {
            expire_auxiliary_cookies(ctx);
            Ok(true)
        }
        // Someone else already removed it. Not ours to report.
        TabRemoval::RootNotFound => Ok(false),
    }
}

/// Called once a tab has fully authenticated.
///
/// The tab is removed. If sibling tabs remain, the root session is not
/// removed but back-dated so it expires within the realm's access code
/// lifespan, and an authentication state cookie tells the siblings to finish.
#[tracing::instrument(skip_all, fields(realm = %ctx.realm.name, tab_id = %auth_session.tab_id))]
pub async fn finalize_successful_tab(
    services: &SessionServices,
    ctx: &mut RequestContext<'_>,
    auth_session: &AuthenticationSession,
) -> Result<(), SessionError> {
    if remove_tab(services, ctx, auth_session).await? {
        return Ok(());
    }

    let realm = ctx.realm;
    let root_id = &auth_session.root_session_id;
    let Some(root) = services.store.get_root_session(realm, root_id).await? else {
        tracing::debug!(root_session = %root_id, "Root session gone before grace scheduling");
        return Ok(());
    };

    let expires_in = realm.access_code_lifespan;
    let timestamp =
        grace_scheduled_timestamp(services.now(), realm.auth_session_lifespan(), expires_in);
    if !services.store.set_timestamp(realm, root_id, timestamp).await? {
        tracing::debug!(root_session = %root_id, "Root session gone before grace scheduling");
        return Ok(());
    }

    tracing::trace!(
        root_session = %root_id,
        remaining_tabs = root.tabs.len(),
        expires_in,
        "Root session scheduled for expiration"
    );

    auth_state::generate_and_set_cookie(services, ctx, &root, expires_in)?;
    Ok(())
}

/// Evict root sessions of `realm` whose lifespan has run out.
pub async fn remove_expired_sessions(
    services: &SessionServices,
    realm: &Realm,
) -> Result<usize, SessionError> {
    let removed = services.store.remove_expired(realm, services.now()).await?;
    if removed > 0 {
        tracing::debug!(realm = %realm.name, removed, "Removed expired root sessions");
    }
    Ok(removed)
}
