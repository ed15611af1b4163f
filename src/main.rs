use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use playbase::config::AppConfig;
use playbase::provision;
use playbase::server::{AppState, create_router};

#[derive(Parser)]
#[command(name = "playbase")]
#[command(about = "SQLite-backed gaming datastore: provisioning and health checks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create and seed the database, writing connection artifacts
    Init {
        /// Data directory for the database and artifacts
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },

    /// Start the health endpoint
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to bind to
        #[arg(long, short, env = "PORT", default_value_t = 5001)]
        port: u16,

        /// Data directory for the database and artifacts
        #[arg(long, default_value = "./data")]
        data_dir: String,
    },
}

fn run_init(data_dir: String) -> anyhow::Result<()> {
    let config = AppConfig {
        data_dir: data_dir.into(),
        ..AppConfig::default()
    };

    let report = provision::run(&config)?;

    println!();
    println!("SQLite setup complete!");
    println!("Database: {}", config.absolute_db_path().display());
    println!();
    println!("Database statistics:");
    println!("  Tables: {}", report.table_count);
    println!("  App info records: {}", report.app_info_rows);
    for warning in &report.warnings {
        println!("  Warning: {warning}");
    }
    println!();
    println!(
        "To use the external viewer, run: source {}",
        config.viewer_env_path().display()
    );

    Ok(())
}

async fn run_serve(config: AppConfig) -> anyhow::Result<()> {
    // Best-effort: the listener must come up even when this fails, so
    // probes can report the database as unavailable.
    match provision::ensure_initialized(&config) {
        Ok(Some(_)) => info!("database initialized on startup"),
        Ok(None) => {}
        Err(e) => error!("database initialization failed: {e}"),
    }

    let state = Arc::new(AppState::new(&config));
    let app = create_router(state);
    let addr = config.socket_addr()?;

    info!(
        "Starting health server on {} (db: {})",
        addr,
        config.absolute_db_path().display()
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("health server shut down");
    Ok(())
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT, shutting down"); }
        () = terminate => { info!("received SIGTERM, shutting down"); }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("playbase=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { data_dir } => run_init(data_dir)?,
        Commands::Serve {
            host,
            port,
            data_dir,
        } => {
            run_serve(AppConfig {
                host,
                port,
                data_dir: data_dir.into(),
            })
            .await?;
        }
    }

    Ok(())
}
