//! Schema initializer: creates and seeds the database, then writes the
//! connection artifacts consumed by humans and the external viewer.

pub mod seed;

pub use seed::SeedCatalog;

use std::fs;
use std::io::Write;

use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::Result;
use crate::store::{SqliteStore, Store};

/// Outcome of a provisioning run. Artifact failures land in `warnings`
/// rather than failing the run; the schema and seed state were already
/// committed by the time they are attempted.
#[derive(Debug)]
pub struct ProvisionReport {
    pub table_count: i64,
    pub app_info_rows: i64,
    pub warnings: Vec<String>,
}

/// Creates the database file if needed, applies schema and seed data in one
/// transaction, and writes the auxiliary artifacts. Converges to the same
/// state on repeated runs.
pub fn run(config: &AppConfig) -> Result<ProvisionReport> {
    fs::create_dir_all(&config.data_dir)?;

    let store = SqliteStore::new(config.db_path())?;
    let stats = store.provision(&SeedCatalog::builtin())?;

    info!(
        tables = stats.table_count,
        app_info_rows = stats.app_info_rows,
        "provisioned database at {}",
        config.absolute_db_path().display()
    );

    let mut warnings = Vec::new();
    if let Err(e) = write_connection_info(config) {
        let msg = format!("could not save connection info: {e}");
        warn!("{msg}");
        warnings.push(msg);
    }
    if let Err(e) = write_viewer_env(config) {
        let msg = format!("could not save viewer environment file: {e}");
        warn!("{msg}");
        warnings.push(msg);
    }

    Ok(ProvisionReport {
        table_count: stats.table_count,
        app_info_rows: stats.app_info_rows,
        warnings,
    })
}

/// Runs the initializer only when the database file is missing or empty.
/// Returns `None` when the file already holds data.
pub fn ensure_initialized(config: &AppConfig) -> Result<Option<ProvisionReport>> {
    let needs_init = match fs::metadata(config.db_path()) {
        Ok(meta) => meta.len() == 0,
        Err(_) => true,
    };

    if !needs_init {
        return Ok(None);
    }

    run(config).map(Some)
}

fn write_connection_info(config: &AppConfig) -> std::io::Result<()> {
    let abs_path = config.absolute_db_path();
    let mut file = fs::File::create(config.connection_info_path())?;
    writeln!(file, "# SQLite connection methods:")?;
    writeln!(file, "# Connection string: sqlite:///{}", abs_path.display())?;
    writeln!(file, "# File path: {}", abs_path.display())?;
    writeln!(file, "# CLI: sqlite3 {}", abs_path.display())?;
    Ok(())
}

fn write_viewer_env(config: &AppConfig) -> std::io::Result<()> {
    let env_path = config.viewer_env_path();
    if let Some(parent) = env_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(
        env_path,
        format!(
            "export SQLITE_DB=\"{}\"\n",
            config.absolute_db_path().display()
        ),
    )
}
