use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};

use super::dto::HealthReport;
use super::router::AppState;

pub const SERVICE_NAME: &str = "playbase";

/// Bounded wait on a locked database before the probe gives up.
const CHECK_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug)]
pub enum DbHealth {
    Healthy { detail: String },
    Unhealthy { detail: String },
}

/// Probes the database file with a fresh short-lived connection.
#[must_use]
pub fn check_database(db_path: &Path) -> DbHealth {
    if !db_path.exists() {
        return DbHealth::Unhealthy {
            detail: format!("database file not found at {}", db_path.display()),
        };
    }

    match quick_check(db_path) {
        Ok(detail) => DbHealth::Healthy { detail },
        Err(e) => DbHealth::Unhealthy {
            detail: format!("sqlite error: {e}"),
        },
    }
}

/// `PRAGMA quick_check` returns "ok" on a sound file, but an open handle
/// alone counts as alive even when the result is something else.
fn quick_check(db_path: &Path) -> rusqlite::Result<String> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(CHECK_TIMEOUT)?;

    let result: Option<String> = conn
        .query_row("PRAGMA quick_check", [], |row| row.get(0))
        .optional()?;

    Ok(match result {
        Some(s) if s.eq_ignore_ascii_case("ok") => "ok".to_string(),
        _ => "opened".to_string(),
    })
}

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (healthy, detail) = match check_database(&state.db_path) {
        DbHealth::Healthy { detail } => (true, detail),
        DbHealth::Unhealthy { detail } => (false, detail),
    };

    let code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let report = HealthReport {
        service: SERVICE_NAME,
        status: if healthy { "ok" } else { "unavailable" },
        database: "sqlite",
        detail,
        db_path: state.db_path.display().to_string(),
        time: Utc::now().timestamp(),
    };

    (code, Json(report))
}
