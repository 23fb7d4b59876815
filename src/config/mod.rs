// Configuration module entry point
// Loads the server configuration from defaults, an optional file and the environment

mod state;
mod types;

use std::net::SocketAddr;

use crate::error::ServerError;

// Re-export public types
pub use state::ServerState;
pub use types::{
    Config, FilesConfig, LoggingConfig, PerformanceConfig, ServerConfig, DEFAULT_HOST,
    DEFAULT_PORT, DEFAULT_ROOT,
};

use types::{DEFAULT_ACCESS_LOG_FORMAT, DEFAULT_CONNECTION_TIMEOUT, DEFAULT_HEADER_READ_TIMEOUT};

/// Default configuration file name (without extension)
pub const DEFAULT_CONFIG_FILE: &str = "httpd";

/// Environment variable prefix, e.g. `HTTPD_SERVER__PORT=8080`
pub const ENV_PREFIX: &str = "HTTPD";

impl Config {
    /// Load configuration from `httpd.toml` (if present) and `HTTPD_*` variables
    pub fn load() -> Result<Self, ServerError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// A missing file is not an error: every key has a default.
    pub fn load_from(config_path: &str) -> Result<Self, ServerError> {
        let builder = with_defaults(config::Config::builder())?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            );

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Parse configuration from an in-memory TOML document
    pub fn from_toml(source: &str) -> Result<Self, ServerError> {
        let builder = with_defaults(config::Config::builder())?
            .add_source(config::File::from_str(source, config::FileFormat::Toml));

        Ok(builder.build()?.try_deserialize()?)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, ServerError> {
        let host = self.server.host.as_str();
        let addr = if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]:{}", self.server.port)
        } else {
            format!("{host}:{}", self.server.port)
        };
        addr.parse()
            .map_err(|e| ServerError::InvalidAddress(format!("{addr}: {e}")))
    }
}

fn with_defaults(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    builder
        .set_default("server.host", DEFAULT_HOST)?
        .set_default("server.port", i64::from(DEFAULT_PORT))?
        .set_default("files.root", DEFAULT_ROOT)?
        .set_default("files.directory_listing", true)?
        .set_default("logging.access_log", true)?
        .set_default("logging.access_log_format", DEFAULT_ACCESS_LOG_FORMAT)?
        .set_default("performance.keep_alive", true)?
        .set_default(
            "performance.header_read_timeout",
            i64::from(DEFAULT_HEADER_READ_TIMEOUT),
        )?
        .set_default(
            "performance.connection_timeout",
            i64::from(DEFAULT_CONNECTION_TIMEOUT),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_fixed_behavior() {
        let cfg = Config::from_toml("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 9009);
        assert_eq!(cfg.files.root, "html");
        assert_eq!(cfg.files.index_files, vec!["index.html", "index.htm"]);
    }

    #[test]
    fn test_toml_overrides() {
        let cfg = Config::from_toml(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [files]
            root = "public"
            index_files = ["main.html"]
            directory_listing = false

            [logging]
            access_log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.files.root, "public");
        assert_eq!(cfg.files.index_files, vec!["main.html"]);
        assert!(!cfg.files.directory_listing);
        assert_eq!(cfg.logging.access_log_format, "json");
        assert!(cfg.logging.access_log);
        assert_eq!(cfg.performance.header_read_timeout, 30);
    }

    #[test]
    fn test_invalid_type_is_config_error() {
        let err = Config::from_toml("[server]\nport = \"not a port\"").unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }

    #[test]
    fn test_socket_addr() {
        let cfg = Config::default();
        assert_eq!(cfg.get_socket_addr().unwrap().to_string(), "0.0.0.0:9009");

        let mut v6 = Config::default();
        v6.server.host = "::1".to_string();
        assert_eq!(v6.get_socket_addr().unwrap().to_string(), "[::1]:9009");

        let mut bad = Config::default();
        bad.server.host = "not a host".to_string();
        assert!(matches!(
            bad.get_socket_addr(),
            Err(ServerError::InvalidAddress(_))
        ));
    }
}
