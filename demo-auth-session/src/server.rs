use axum::Router;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use auth_session_axum::AuthSessionState;
use auth_session_axum::auth_session::remove_expired_sessions;

pub(crate) fn spawn_http_server(port: u16, app: Router) -> JoinHandle<std::io::Result<()>> {
    tokio::spawn(async move {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("HTTP server listening on {}", addr);

        // Peer addresses feed the realms' ssl-required policy
        let service = app.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, service).await
    })
}

/// Periodically evict root sessions whose lifespan has run out, including the
/// ones back-dated after a tab finished authenticating.
pub(crate) fn spawn_expiry_sweeper(state: AuthSessionState, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            for realm in state.realms() {
                match remove_expired_sessions(&state.services, realm).await {
                    Ok(0) => {}
                    Ok(removed) => {
                        tracing::info!("Swept {} expired sessions from realm {}", removed, realm.name)
                    }
                    Err(e) => tracing::error!("Sweep of realm {} failed: {}", realm.name, e),
                }
            }
        }
    })
}

pub(crate) fn init_tracing(app_name: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        #[cfg(debug_assertions)]
        {
            format!(
                "auth_session_axum=trace,auth_session=trace,{}=trace,info",
                app_name
            )
            .into()
        }

        #[cfg(not(debug_assertions))]
        {
            "info".into()
        }
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    #[cfg(debug_assertions)]
    tracing::info!("Debug mode enabled - showing detailed logs by default");
    tracing::info!("Example: RUST_LOG=auth_session=debug ./demo-auth-session");
}
