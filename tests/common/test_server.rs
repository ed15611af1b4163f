use std::sync::Arc;

use tempfile::TempDir;

use playbase::config::AppConfig;
use playbase::provision;
use playbase::server::{AppState, create_router};

/// In-process health server bound to an ephemeral port, backed by an
/// isolated temp data directory so tests can run in parallel.
pub struct TestServer {
    pub temp_dir: TempDir,
    pub base_url: String,
    pub config: AppConfig,
}

impl TestServer {
    /// Serve against a freshly provisioned database.
    pub async fn start() -> Self {
        Self::start_inner(true).await
    }

    /// Serve with no database file present, as after deletion.
    pub async fn start_without_db() -> Self {
        Self::start_inner(false).await
    }

    async fn start_inner(provision_db: bool) -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let config = AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            data_dir: temp_dir.path().to_path_buf(),
        };

        if provision_db {
            provision::run(&config).expect("provision database");
        }

        let app = create_router(Arc::new(AppState::new(&config)));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        Self {
            temp_dir,
            base_url: format!("http://{addr}"),
            config,
        }
    }
}
