//! Anti-tampering check for detached info and error pages.
//!
//! Rendering such a page stores a signed [`DetachedInfoStateCookie`] holding
//! two state values: the one already in the page URL and a freshly generated
//! one embedded in the page's own links. A later request for the page must
//! carry one of the two in the `state_checker` query parameter.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::cookie::SetCookie;
use crate::session::config::{STATE_CHECKER_COOKIE_NAME, STATE_CHECKER_PARAM};
use crate::session::errors::SessionError;
use crate::session::types::{RequestContext, SessionServices};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetachedInfoStateCookie {
    pub message_key: String,
    pub message_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_url_state: Option<String>,
    pub rendered_url_state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_parameters: Option<Vec<String>>,
}

/// What a detached page is about to show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetachedMessage {
    pub message_key: String,
    pub message_type: String,
    pub status: Option<u16>,
    pub client_id: Option<String>,
    pub parameters: Option<Vec<String>>,
}

impl DetachedMessage {
    pub fn new(message_key: impl Into<String>, message_type: impl Into<String>) -> Self {
        Self {
            message_key: message_key.into(),
            message_type: message_type.into(),
            ..Default::default()
        }
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn parameters<I, P>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Display,
    {
        self.parameters = Some(parameters.into_iter().map(|p| p.to_string()).collect());
        self
    }
}

/// Sign the state for a detached page about to be rendered and store it in
/// the state checker cookie. The returned payload carries the
/// `rendered_url_state` the page should put in its links.
#[tracing::instrument(skip_all, fields(realm = %ctx.realm.name, message_key = %message.message_key))]
pub fn generate_and_set_state_checker_cookie(
    services: &SessionServices,
    ctx: &mut RequestContext<'_>,
    message: DetachedMessage,
) -> Result<DetachedInfoStateCookie, SessionError> {
    let max_age = ctx.realm.access_code_lifespan_user_action;

    let state = DetachedInfoStateCookie {
        message_key: message.message_key,
        message_type: message.message_type,
        status: message.status,
        client_uuid: message.client_id,
        current_url_state: ctx.query_param(STATE_CHECKER_PARAM).map(str::to_string),
        rendered_url_state: Uuid::new_v4().to_string(),
        message_parameters: message.parameters,
    };
    let encoded = services.tokens.encode(&state, services.now(), max_age)?;

    let cookie = SetCookie::new(STATE_CHECKER_COOKIE_NAME.as_str(), encoded)
        .path(ctx.realm.cookie_path())
        .max_age(max_age)
        .secure(ctx.secure_only())
        .http_only(true);
    ctx.cookies.add_cookie(cookie);

    tracing::trace!(max_age, "Generated state checker cookie");
    Ok(state)
}

fn state_matches(expected: &str, actual: &str) -> bool {
    expected.as_bytes().ct_eq(actual.as_bytes()).into()
}

fn verification_failed(message: String) -> SessionError {
    tracing::warn!(reason = %message, "State verification failed");
    SessionError::StateVerification(message)
}

/// Check `state_checker_param` against the state checker cookie.
///
/// Either stored value is accepted: the URL state covers a plain refresh of
/// the page, the rendered state covers following one of the page's links.
pub fn verify_state_checker_parameter(
    services: &SessionServices,
    ctx: &RequestContext<'_>,
    state_checker_param: Option<&str>,
) -> Result<DetachedInfoStateCookie, SessionError> {
    let cookie_value = ctx
        .cookies
        .get_cookie_value(&STATE_CHECKER_COOKIE_NAME)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| verification_failed("State checker cookie is empty".to_string()))?;

    let param = state_checker_param
        .filter(|param| !param.is_empty())
        .ok_or_else(|| verification_failed("State checker parameter is empty".to_string()))?;

    let state: DetachedInfoStateCookie =
        services.tokens.decode(&cookie_value, services.now()).ok_or_else(|| {
            verification_failed("Failed to verify DetachedInfoStateCookie".to_string())
        })?;

    let matches_current = state
        .current_url_state
        .as_deref()
        .is_some_and(|current| state_matches(current, param));
    let matches_rendered = state_matches(&state.rendered_url_state, param);

    if matches_current || matches_rendered {
        return Ok(state);
    }

    Err(verification_failed(format!(
        "Failed to verify state. StateCheckerParameter: {}, cookie current state checker: {}, cookie rendered state checker: {}",
        param,
        state.current_url_state.as_deref().unwrap_or("none"),
        state.rendered_url_state
    )))
}
