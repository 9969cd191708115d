use std::collections::HashMap;
use std::net::SocketAddr;

use axum::{
    RequestPartsExt,
    extract::{ConnectInfo, FromRequestParts, Path, Query},
    response::{IntoResponse, Response},
};
use http::{StatusCode, request::Parts};

use auth_session::{ClientConnection, HeaderCookieJar, Realm, RequestContext};

use super::error::IntoResponseError;
use super::state::AuthSessionState;

/// Per-request inputs of the session operations, taken from the path's
/// `{realm}`, the peer address, the `Cookie` headers and the query string.
///
/// Cookies queued while handling the request are written out by
/// [`AuthSessionRequest::respond`].
#[derive(Debug)]
pub struct AuthSessionRequest {
    pub realm: Realm,
    pub connection: ClientConnection,
    pub jar: HeaderCookieJar,
    pub query: HashMap<String, String>,
}

impl AuthSessionRequest {
    pub fn context(&mut self) -> RequestContext<'_> {
        RequestContext::new(&self.realm, self.connection, &mut self.jar)
            .with_query(self.query.clone())
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Attach the queued `Set-Cookie` headers to `body`'s response.
    pub fn respond(self, body: impl IntoResponse) -> Result<Response, (StatusCode, String)> {
        let headers = self.jar.into_response_headers().into_response_error()?;
        let mut response = body.into_response();
        for (name, value) in headers.iter() {
            response.headers_mut().append(name, value.clone());
        }
        Ok(response)
    }
}

impl FromRequestParts<AuthSessionState> for AuthSessionRequest {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AuthSessionState,
    ) -> Result<Self, Self::Rejection> {
        let Path(params) = parts
            .extract::<Path<HashMap<String, String>>>()
            .await
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

        let realm_name = params
            .get("realm")
            .ok_or((StatusCode::BAD_REQUEST, "Missing realm".to_string()))?;
        let realm = state.realm(realm_name).cloned().ok_or_else(|| {
            tracing::debug!("Unknown realm: {}", realm_name);
            (StatusCode::NOT_FOUND, format!("Realm not found: {realm_name}"))
        })?;

        let connection = ClientConnection::new(
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip()),
        );

        let Query(query) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

        Ok(Self {
            realm,
            connection,
            jar: HeaderCookieJar::from_headers(&parts.headers),
            query,
        })
    }
}
