use serde::Serialize;

/// Body returned by every probe route, healthy or not.
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub service: &'static str,
    pub status: &'static str,
    pub database: &'static str,
    pub detail: String,
    pub db_path: String,
    /// Unix timestamp in seconds.
    pub time: i64,
}
