// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 9009;
pub const DEFAULT_ROOT: &str = "html";
pub const DEFAULT_ACCESS_LOG_FORMAT: &str = "common";
pub const DEFAULT_HEADER_READ_TIMEOUT: u32 = 30;
pub const DEFAULT_CONNECTION_TIMEOUT: u32 = 300;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub files: FilesConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
}

/// Listener configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Tokio worker threads, CPU count when unset
    #[serde(default)]
    pub workers: Option<usize>,
    /// Value of the `Server` response header
    #[serde(default = "default_server_name")]
    pub server_name: String,
}

/// Document root configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct FilesConfig {
    /// Document root, resolved against the working directory
    pub root: String,
    /// Index file candidates tried in order for directory requests
    #[serde(default = "default_index_files")]
    pub index_files: Vec<String>,
    pub directory_listing: bool,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub access_log: bool,
    /// Access log format (common, combined, json, or custom pattern)
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// Connection handling configuration, timeouts in seconds
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    pub header_read_timeout: u64,
    /// Upper bound on a connection's lifetime, 0 disables it
    pub connection_timeout: u64,
}

fn default_server_name() -> String {
    format!("isolated_httpd/{}", env!("CARGO_PKG_VERSION"))
}

fn default_index_files() -> Vec<String> {
    vec!["index.html".to_string(), "index.htm".to_string()]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            workers: None,
            server_name: default_server_name(),
        }
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            root: DEFAULT_ROOT.to_string(),
            index_files: default_index_files(),
            directory_listing: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            access_log: true,
            access_log_format: DEFAULT_ACCESS_LOG_FORMAT.to_string(),
            access_log_file: None,
            error_log_file: None,
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            keep_alive: true,
            header_read_timeout: u64::from(DEFAULT_HEADER_READ_TIMEOUT),
            connection_timeout: u64::from(DEFAULT_CONNECTION_TIMEOUT),
        }
    }
}
