use std::time::Duration;

use auth_session_axum::{AuthSessionState, SessionServices, auth_session_router, store_from_env};

mod server;

use crate::server::{init_tracing, spawn_expiry_sweeper, spawn_http_server};

const HTTP_PORT: u16 = 3001;
const SWEEP_INTERVAL: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing("demo_auth_session");

    let store = store_from_env().await?;
    let state = AuthSessionState::from_env(SessionServices::from_env(store));
    for realm in state.realms() {
        tracing::info!(
            "Serving realm {} at {} (ssl-required: {})",
            realm.name,
            realm.cookie_path(),
            realm.ssl_required
        );
    }

    let sweeper = spawn_expiry_sweeper(state.clone(), SWEEP_INTERVAL);
    let http_server = spawn_http_server(HTTP_PORT, auth_session_router(state));

    // Neither task returns unless something went wrong
    tokio::select! {
        result = http_server => {
            result?.inspect_err(|e| tracing::error!("HTTP server on port {} failed: {}", HTTP_PORT, e))?;
        }
        result = sweeper => result?,
    }
    Ok(())
}
