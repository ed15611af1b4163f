use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{Router, routing::get};

use super::health::health;
use crate::config::AppConfig;

pub struct AppState {
    /// Absolute database path, resolved once at startup. Every request
    /// opens its own connection against it; no pool, no cached state.
    pub db_path: PathBuf,
}

impl AppState {
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db_path: config.absolute_db_path(),
        }
    }
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

/// `/`, `/health`, `/ready` and `/live` all answer the same probe; anything
/// else falls through to axum's default 404.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/ready", get(health))
        .route("/live", get(health))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
