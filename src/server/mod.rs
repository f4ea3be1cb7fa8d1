pub mod metrics;
mod requests_logging;
mod routes;
mod state;

pub use requests_logging::{log_requests, RequestsLoggingLevel};
pub use routes::make_app;
pub use state::ServerState;

use anyhow::Result;
use axum::{routing::get, Router};
use tracing::info;

/// Bind and serve the API, plus a bare metrics server on its own port.
pub async fn run_server(state: ServerState, port: u16, metrics_port: u16) -> Result<()> {
    let metrics_app = Router::new().route("/metrics", get(metrics::metrics_handler));
    let metrics_listener =
        tokio::net::TcpListener::bind(format!("0.0.0.0:{}", metrics_port)).await?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(metrics_listener, metrics_app).await {
            tracing::error!("Metrics server failed: {}", e);
        }
    });
    info!("Metrics available at port {}!", metrics_port);

    let app = make_app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Ready to serve at port {}!", port);
    Ok(axum::serve(listener, app).await?)
}
