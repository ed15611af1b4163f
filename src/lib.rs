//! # Playbase
//!
//! Provisioning and health checks for a SQLite-backed gaming datastore,
//! usable both as a standalone binary and as a library.
//!
//! The crate has two moving parts: the schema initializer
//! ([`provision::run`]), which creates and seeds the database idempotently,
//! and the health server ([`server::create_router`]), which answers
//! liveness/readiness probes by opening a short-lived connection per
//! request.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! playbase = { version = "0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use playbase::config::AppConfig;
//! use playbase::provision;
//! use playbase::server::{AppState, create_router};
//!
//! let config = AppConfig::default();
//! let report = provision::run(&config).unwrap();
//! println!("{} tables, {} app_info rows", report.table_count, report.app_info_rows);
//!
//! let router = create_router(Arc::new(AppState::new(&config)));
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes the clap-based binary entry point. Disable
//!   with `default-features = false`.

pub mod config;
pub mod error;
pub mod provision;
pub mod server;
pub mod store;
pub mod types;
