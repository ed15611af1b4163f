use std::net::SocketAddr;
use std::path::PathBuf;

pub const DB_FILE_NAME: &str = "playbase.db";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the database file and auxiliary artifacts.
    pub data_dir: PathBuf,
}

impl AppConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    /// Absolute database path, used in health payloads and artifact files.
    /// Falls back to the raw path when the current directory is unavailable.
    #[must_use]
    pub fn absolute_db_path(&self) -> PathBuf {
        std::path::absolute(self.db_path()).unwrap_or_else(|_| self.db_path())
    }

    #[must_use]
    pub fn connection_info_path(&self) -> PathBuf {
        self.data_dir.join("db_connection.txt")
    }

    #[must_use]
    pub fn viewer_env_path(&self) -> PathBuf {
        self.data_dir.join("db_visualizer").join("sqlite.env")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
            data_dir: PathBuf::from("./data"),
        }
    }
}
