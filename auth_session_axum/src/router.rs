//! Router exposing the auth session operations over HTTP

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::handlers;
use super::state::AuthSessionState;

fn routes() -> Router<AuthSessionState> {
    Router::new()
        .route("/realms/{realm}/auth-sessions", post(handlers::start_tab))
        .route(
            "/realms/{realm}/auth-sessions/current",
            get(handlers::current_root_session),
        )
        .route(
            "/realms/{realm}/auth-sessions/current/user-session",
            get(handlers::current_user_session),
        )
        .route(
            "/realms/{realm}/auth-sessions/current/tabs/{tab_id}",
            get(handlers::current_tab).delete(handlers::delete_tab),
        )
        .route(
            "/realms/{realm}/auth-sessions/current/tabs/{tab_id}/complete",
            post(handlers::complete_tab),
        )
        .route(
            "/realms/{realm}/detached-info",
            get(handlers::render_detached_info).post(handlers::verify_detached_info),
        )
}

/// Create the router for all auth session endpoints
///
/// The endpoints will be available at:
/// - /realms/{realm}/auth-sessions/...
/// - /realms/{realm}/detached-info
pub fn auth_session_router(state: AuthSessionState) -> Router {
    routes()
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(true),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
        .with_state(state)
}

/// Same as `auth_session_router()` but without the HTTP tracing middleware.
pub fn auth_session_router_no_trace(state: AuthSessionState) -> Router {
    routes().with_state(state)
}
