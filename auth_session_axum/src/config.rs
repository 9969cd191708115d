//! Central configuration for the auth-session-axum crate

use std::sync::LazyLock;

use auth_session::{Realm, SslRequired};

/// Comma separated realm names served by the router.
/// Default: "master"
pub static AUTH_SESSION_REALMS: LazyLock<Vec<String>> = LazyLock::new(|| {
    parse_realm_names(
        &std::env::var("AUTH_SESSION_REALMS").unwrap_or_else(|_| "master".to_string()),
    )
});

/// SSL policy applied to every configured realm: `all`, `external` or `none`.
/// Default: "external"
pub static AUTH_SESSION_SSL_REQUIRED: LazyLock<SslRequired> = LazyLock::new(|| {
    std::env::var("AUTH_SESSION_SSL_REQUIRED")
        .ok()
        .and_then(|value| {
            value
                .parse()
                .inspect_err(|e| tracing::warn!("Ignoring AUTH_SESSION_SSL_REQUIRED: {}", e))
                .ok()
        })
        .unwrap_or(SslRequired::External)
});

/// Seconds a client has to redeem an access code; also the grace window after
/// one tab completes. Default: 60
pub static AUTH_SESSION_ACCESS_CODE_LIFESPAN: LazyLock<i64> =
    LazyLock::new(|| lifespan_from_env("AUTH_SESSION_ACCESS_CODE_LIFESPAN", 60));

/// Default: 300
pub static AUTH_SESSION_ACCESS_CODE_LIFESPAN_USER_ACTION: LazyLock<i64> =
    LazyLock::new(|| lifespan_from_env("AUTH_SESSION_ACCESS_CODE_LIFESPAN_USER_ACTION", 300));

/// Default: 1800
pub static AUTH_SESSION_ACCESS_CODE_LIFESPAN_LOGIN: LazyLock<i64> =
    LazyLock::new(|| lifespan_from_env("AUTH_SESSION_ACCESS_CODE_LIFESPAN_LOGIN", 1800));

fn parse_realm_names(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_lifespan(value: Option<&str>, default: i64) -> i64 {
    value
        .and_then(|v| v.parse::<i64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

fn lifespan_from_env(key: &str, default: i64) -> i64 {
    parse_lifespan(std::env::var(key).ok().as_deref(), default)
}

/// Realms built from the environment settings above.
pub fn realms_from_env() -> Vec<Realm> {
    AUTH_SESSION_REALMS
        .iter()
        .map(|name| {
            let mut realm = Realm::new(name.as_str()).with_ssl_required(*AUTH_SESSION_SSL_REQUIRED);
            realm.access_code_lifespan = *AUTH_SESSION_ACCESS_CODE_LIFESPAN;
            realm.access_code_lifespan_user_action = *AUTH_SESSION_ACCESS_CODE_LIFESPAN_USER_ACTION;
            realm.access_code_lifespan_login = *AUTH_SESSION_ACCESS_CODE_LIFESPAN_LOGIN;
            realm
        })
        .collect()
}
