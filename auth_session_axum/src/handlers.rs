use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};
use http::StatusCode;
use serde::{Deserialize, Serialize};

use auth_session::{
    DetachedMessage, STATE_CHECKER_PARAM, add_tab, create_authentication_session,
    finalize_successful_tab, generate_and_set_state_checker_cookie,
    get_current_authentication_session, get_current_root_session,
    get_user_session_from_auth_cookie, remove_tab, verify_state_checker_parameter,
};

use super::error::IntoResponseError;
use super::extract::AuthSessionRequest;
use super::state::AuthSessionState;

#[derive(Debug, Deserialize)]
pub(super) struct TabPath {
    tab_id: String,
}

#[derive(Debug, Serialize)]
pub(super) struct TabStarted {
    root_session_id: String,
    tab_id: String,
    client_id: String,
}

#[derive(Debug, Serialize)]
pub(super) struct TabRemoved {
    root_removed: bool,
    detached: bool,
}

fn required_param<'a>(
    req: &'a AuthSessionRequest,
    name: &str,
) -> Result<&'a str, (StatusCode, String)> {
    req.query_param(name)
        .filter(|value| !value.is_empty())
        .ok_or((StatusCode::BAD_REQUEST, format!("Missing {name} parameter")))
}

fn not_found(what: &str) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("No current {what}"))
}

/// Open a new tab, reusing the browser's root session when there is one.
pub(super) async fn start_tab(
    State(state): State<AuthSessionState>,
    mut req: AuthSessionRequest,
) -> Result<Response, (StatusCode, String)> {
    let client_id = required_param(&req, "client_id")?.to_string();
    let services = &state.services;

    let mut ctx = req.context();
    let root = match get_current_root_session(services, &mut ctx)
        .await
        .into_response_error()?
    {
        Some(root) => root,
        None => create_authentication_session(services, &mut ctx, true)
            .await
            .into_response_error()?,
    };
    let tab = add_tab(services, ctx.realm, &root, &client_id)
        .await
        .into_response_error()?
        .ok_or((
            StatusCode::CONFLICT,
            "Authentication session ended while opening the tab".to_string(),
        ))?;

    req.respond((
        StatusCode::CREATED,
        Json(TabStarted {
            root_session_id: root.id,
            tab_id: tab.tab_id,
            client_id: tab.client_id,
        }),
    ))
}

pub(super) async fn current_root_session(
    State(state): State<AuthSessionState>,
    mut req: AuthSessionRequest,
) -> Result<Response, (StatusCode, String)> {
    let root = get_current_root_session(&state.services, &mut req.context())
        .await
        .into_response_error()?
        .ok_or_else(|| not_found("authentication session"))?;
    req.respond(Json(root))
}

pub(super) async fn current_tab(
    State(state): State<AuthSessionState>,
    Path(path): Path<TabPath>,
    mut req: AuthSessionRequest,
) -> Result<Response, (StatusCode, String)> {
    let client_id = required_param(&req, "client_id")?.to_string();
    let tab = get_current_authentication_session(
        &state.services,
        &mut req.context(),
        &client_id,
        &path.tab_id,
    )
    .await
    .into_response_error()?
    .ok_or_else(|| not_found("tab"))?;
    req.respond(Json(tab))
}

pub(super) async fn current_user_session(
    State(state): State<AuthSessionState>,
    mut req: AuthSessionRequest,
) -> Result<Response, (StatusCode, String)> {
    let user_session = get_user_session_from_auth_cookie(&state.services, &mut req.context())
        .await
        .into_response_error()?
        .ok_or_else(|| not_found("user session"))?;
    req.respond(Json(user_session))
}

pub(super) async fn complete_tab(
    State(state): State<AuthSessionState>,
    Path(path): Path<TabPath>,
    mut req: AuthSessionRequest,
) -> Result<Response, (StatusCode, String)> {
    let client_id = required_param(&req, "client_id")?.to_string();
    let services = &state.services;

    let mut ctx = req.context();
    let tab = get_current_authentication_session(services, &mut ctx, &client_id, &path.tab_id)
        .await
        .into_response_error()?
        .ok_or_else(|| not_found("tab"))?;
    finalize_successful_tab(services, &mut ctx, &tab)
        .await
        .into_response_error()?;
    let detached = ctx.is_detached_auth_session();

    req.respond(Json(TabRemoved {
        root_removed: detached,
        detached,
    }))
}

pub(super) async fn delete_tab(
    State(state): State<AuthSessionState>,
    Path(path): Path<TabPath>,
    mut req: AuthSessionRequest,
) -> Result<Response, (StatusCode, String)> {
    let client_id = required_param(&req, "client_id")?.to_string();
    let services = &state.services;

    let mut ctx = req.context();
    let tab = get_current_authentication_session(services, &mut ctx, &client_id, &path.tab_id)
        .await
        .into_response_error()?
        .ok_or_else(|| not_found("tab"))?;
    let root_removed = remove_tab(services, &mut ctx, &tab)
        .await
        .into_response_error()?;
    let detached = ctx.is_detached_auth_session();

    req.respond(Json(TabRemoved {
        root_removed,
        detached,
    }))
}

/// Sign the state for a detached info page about to be shown.
pub(super) async fn render_detached_info(
    State(state): State<AuthSessionState>,
    mut req: AuthSessionRequest,
) -> Result<Response, (StatusCode, String)> {
    let message_key = required_param(&req, "message_key")?.to_string();
    let message_type = req.query_param("message_type").unwrap_or("info").to_string();

    let mut message = DetachedMessage::new(message_key, message_type);
    if let Some(status) = req.query_param("status") {
        let status = status
            .parse::<u16>()
            .map_err(|_| (StatusCode::BAD_REQUEST, format!("Invalid status: {status}")))?;
        message = message.status(status);
    }
    if let Some(client_id) = req.query_param("client_id") {
        message = message.client_id(client_id);
    }

    let detached = generate_and_set_state_checker_cookie(&state.services, &mut req.context(), message)
        .into_response_error()?;
    req.respond(Json(detached))
}

/// Accept a request coming from a detached info page.
pub(super) async fn verify_detached_info(
    State(state): State<AuthSessionState>,
    mut req: AuthSessionRequest,
) -> Result<Response, (StatusCode, String)> {
    let param = req.query_param(STATE_CHECKER_PARAM).map(str::to_string);
    let ctx = req.context();
    let detached = verify_state_checker_parameter(&state.services, &ctx, param.as_deref())
        .into_response_error()?;
    req.respond(Json(detached))
}
