use std::env;
use std::sync::LazyLock;

/// Name of the cookie carrying the (possibly route-encoded) root session id.
pub static AUTH_SESSION_COOKIE_NAME: LazyLock<String> = LazyLock::new(|| {
    env::var("AUTH_SESSION_COOKIE_NAME")
        .ok()
        .unwrap_or("AUTH_SESSION_ID".to_string())
});

/// At most this many same-named session cookies are looked at per request.
pub const AUTH_SESSION_COOKIE_LIMIT: usize = 3;

pub static AUTH_RESTART_COOKIE_NAME: LazyLock<String> = LazyLock::new(|| {
    env::var("AUTH_RESTART_COOKIE_NAME")
        .ok()
        .unwrap_or("AUTH_RESTART".to_string())
});

/// Script-readable cookie telling sibling tabs that authentication finished.
pub static AUTH_STATE_COOKIE_NAME: LazyLock<String> = LazyLock::new(|| {
    env::var("AUTH_STATE_COOKIE_NAME")
        .ok()
        .unwrap_or("AUTH_STATE".to_string())
});

pub static STATE_CHECKER_COOKIE_NAME: LazyLock<String> = LazyLock::new(|| {
    env::var("STATE_CHECKER_COOKIE_NAME")
        .ok()
        .unwrap_or("AUTH_STATE_CHECKER".to_string())
});

/// Query parameter a detached page carries back to prove it was not altered.
pub const STATE_CHECKER_PARAM: &str = "state_checker";

/// This node's sticky-session route. Unset or empty means no suffix.
pub static AUTH_SESSION_ROUTE: LazyLock<Option<String>> = LazyLock::new(|| {
    env::var("AUTH_SESSION_ROUTE")
        .ok()
        .filter(|route| !route.is_empty())
});

pub(crate) static AUTH_SERVER_SECRET: LazyLock<Vec<u8>> =
    LazyLock::new(|| match env::var("AUTH_SERVER_SECRET") {
        Ok(secret) => secret.into_bytes(),
        Err(_) => {
            tracing::warn!("AUTH_SERVER_SECRET is not set, using an insecure default");
            "default_secret_key_change_in_production"
                .to_string()
                .into_bytes()
        }
    });
