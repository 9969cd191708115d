//! Sticky-session encoding of authentication session ids
//!
//! In a cluster the session id carried by the cookie may have a route suffix
//! naming the node that owns the session, e.g.
//! `5e161e00-d426-4ea6-98e9-52eb9844e2d7.node1`.

use crate::session::AUTH_SESSION_ROUTE;

pub trait StickySessionEncoder: Send + Sync {
    /// Attach this node's route to a decoded session id.
    fn encode_session_id(&self, session_id: &str) -> String;

    /// Strip any route from an encoded session id. Input without a route is
    /// returned unchanged.
    fn decode_session_id(&self, encoded_session_id: &str) -> String;
}

/// Appends `.{route}` when this node has a route configured.
///
/// Decoding always strips everything from the first `.`, whether or not a
/// route is configured here, since a load balancer may add its own suffix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteSuffixEncoder {
    route: Option<String>,
}

impl RouteSuffixEncoder {
    pub fn new(route: Option<String>) -> Self {
        Self {
            route: route.filter(|r| !r.is_empty()),
        }
    }

    /// Route taken from `AUTH_SESSION_ROUTE`.
    pub fn from_env() -> Self {
        Self::new(AUTH_SESSION_ROUTE.clone())
    }

    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }
}

impl StickySessionEncoder for RouteSuffixEncoder {
    fn encode_session_id(&self, session_id: &str) -> String {
        match &self.route {
            Some(route) => format!("{session_id}.{route}"),
            None => session_id.to_string(),
        }
    }

    fn decode_session_id(&self, encoded_session_id: &str) -> String {
        match encoded_session_id.split_once('.') {
            Some((session_id, _route)) => session_id.to_string(),
            None => encoded_session_id.to_string(),
        }
    }
}

/// A cookie value decoded to its bare id, paired with the encoding this node
/// would issue for that id right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSessionId {
    pub decoded_id: String,
    pub encoded_id: String,
}

impl AuthSessionId {
    pub fn decode(encoder: &dyn StickySessionEncoder, encoded_auth_session_id: &str) -> Self {
        tracing::debug!(
            cookie_value = encoded_auth_session_id,
            "Found auth session cookie"
        );
        let decoded_id = encoder.decode_session_id(encoded_auth_session_id);
        let encoded_id = encoder.encode_session_id(&decoded_id);
        Self {
            decoded_id,
            encoded_id,
        }
    }

    /// Whether the cookie value differs from what this node would issue.
    pub fn route_changed(&self, cookie_value: &str) -> bool {
        self.encoded_id != cookie_value
    }
}
