// Configuration module entry point
// Loads static configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;
use std::path::PathBuf;

pub use state::AppState;
pub use types::{AdminConfig, Config};

/// Default config file when no path is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

impl Config {
    /// Load configuration from specified file path
    /// The file is optional; `PROMO_*` environment variables override it
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("PROMO").separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.admin_host", "127.0.0.1")?
            .set_default("server.admin_port", 8000)?
            .set_default("site.name", "Promociones")?
            .set_default("site.base_url", "http://127.0.0.1:8080")?
            .set_default("storage.upload_dir", "uploads")?
            .set_default("storage.url_prefix", "/uploads")?
            .set_default("storage.subdir", "promotions")?
            .set_default("storage.state_file", "state.toml")?
            .set_default("admin.username", "admin")?
            .set_default("admin.password", "")?
            .set_default("admin.token_ttl_secs", 86_400)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "promo-pdf/1.0")?
            .set_default("http.max_body_size", 20_971_520)? // 20MB
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    pub fn get_admin_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.admin_host, self.server.admin_port)
            .parse()
            .map_err(|e| format!("Invalid admin address: {e}"))
    }

    /// Directory promotion documents are written to
    pub fn document_dir(&self) -> PathBuf {
        PathBuf::from(&self.storage.upload_dir).join(&self.storage.subdir)
    }

    /// Public URL the upload directory is reachable under
    pub fn storage_base_url(&self) -> String {
        self.site.home_url(&self.storage.url_prefix)
    }
}
