//! Request logging middleware

use super::metrics::record_http_request;
use super::state::ServerState;
use axum::extract::State;
use axum::{body::Body, http::Request, middleware::Next, response::IntoResponse};
use std::time::Instant;
use tracing::info;

#[derive(PartialEq, PartialOrd, Clone, Debug, clap::ValueEnum)]
pub enum RequestsLoggingLevel {
    None,
    Path,
    Headers,
}

impl Default for RequestsLoggingLevel {
    fn default() -> Self {
        Self::Path
    }
}

impl std::fmt::Display for RequestsLoggingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub async fn log_requests(
    State(state): State<ServerState>,
    request: Request<Body>,
    next: Next,
) -> impl IntoResponse {
    let level = state.logging_level.clone();
    let start = Instant::now();

    let method = request.method().to_string();
    let uri = request.uri().to_string();
    let path = request.uri().path().to_string();

    if level > RequestsLoggingLevel::None {
        info!(">>> {} {}", method, uri);
    }

    if level >= RequestsLoggingLevel::Headers {
        info!("  Req Headers:");
        for header in request.headers().iter() {
            info!("    {:?}: {:?}", header.0, header.1);
        }
    }

    let response = next.run(request).await;

    let elapsed = start.elapsed();
    let status = response.status().as_u16();
    if level > RequestsLoggingLevel::None {
        info!("<<< {} {} {} ({:?})", status, method, uri, elapsed);
    }
    record_http_request(&method, &path, status, elapsed.as_secs_f64());

    response
}
