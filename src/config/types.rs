// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub site: SiteConfig,
    pub storage: StorageConfig,
    pub admin: AdminConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
}

/// Listener configuration for the public and admin servers
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub admin_host: String,
    pub admin_port: u16,
    pub workers: Option<usize>,
}

/// Public identity of the site
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SiteConfig {
    /// Shown in page titles
    pub name: String,
    /// Public origin, e.g. `https://example.com`
    pub base_url: String,
}

impl SiteConfig {
    /// Public URL of a path on the site, e.g. `home_url("playas")`
    pub fn home_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Where uploaded documents and the settings record live
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    pub upload_dir: String,
    /// URL path the upload directory is published under
    pub url_prefix: String,
    /// Sub-directory of `upload_dir` holding promotion documents
    pub subdir: String,
    pub state_file: String,
}

/// Admin credentials and forgery-token lifetime
#[derive(Deserialize, Clone)]
pub struct AdminConfig {
    pub username: String,
    /// Empty password disables the admin surface entirely
    #[serde(default)]
    pub password: String,
    pub token_ttl_secs: u64,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub max_body_size: u64,
}
