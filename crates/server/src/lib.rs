//! Datagate server library.
//!
//! Provides a reusable server function to serve Datagate either for the
//! binary, or for tests against an in-memory router.

#![deny(missing_docs)]

mod handlers;
mod health;

use std::{net::SocketAddr, sync::Arc};

use anyhow::anyhow;
use axum::{
    Router,
    routing::{get, post},
};
use backend::{BackendClient, HttpBackend};
use clock::{Clock, SystemClock};
use config::Config;
use gateway::Dispatcher;
use tokio::net::TcpListener;

/// Configuration for serving Datagate.
pub struct ServeConfig {
    /// The socket address (IP and port) the server will bind to
    pub listen_address: SocketAddr,
    /// The deserialized Datagate TOML configuration.
    pub config: Config,
}

/// Builds the application router around a gateway core.
///
/// The clock and backend are injected so tests can drive time and stub the
/// remote service.
pub fn router(config: &Config, clock: Arc<dyn Clock>, backend: Arc<dyn BackendClient>) -> anyhow::Result<Router> {
    let dispatcher = Arc::new(Dispatcher::new(config, clock, backend)?);

    let mut app = Router::new()
        .route("/auth", post(handlers::authenticate))
        .route("/auth/revoke", post(handlers::revoke))
        .route("/tools/call", post(handlers::call_tool))
        .with_state(dispatcher);

    if config.server.health.enabled {
        let health_router = Router::new().route(&config.server.health.path, get(health::health));
        app = app.merge(health_router);

        log::debug!("Health endpoint exposed at {}", config.server.health.path);
    }

    Ok(app)
}

/// Starts and runs the Datagate server with the provided configuration.
pub async fn serve(ServeConfig { listen_address, config }: ServeConfig) -> anyhow::Result<()> {
    let backend = Arc::new(HttpBackend::new(&config.backend).map_err(|e| anyhow!("Failed to set up backend client: {e}"))?);
    let app = router(&config, Arc::new(SystemClock), backend)?;

    let listener = TcpListener::bind(listen_address)
        .await
        .map_err(|e| anyhow!("Failed to bind to {listen_address}: {e}"))?;

    log::info!(
        "Serving {} registered clients at http://{listen_address}",
        config.auth.clients.len()
    );

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow!("Failed to start HTTP server: {e}"))?;

    Ok(())
}
