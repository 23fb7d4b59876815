// Server state module
// Read-only state shared by every connection task

use hyper::header::HeaderValue;
use std::path::{Path, PathBuf};

use super::types::Config;
use crate::logger;

/// State shared across requests, never mutated after startup
pub struct ServerState {
    pub config: Config,
    /// Canonical document root (absolute path when it does not exist yet)
    pub root: PathBuf,
    /// Pre-validated `Server` header value
    pub server_header: Option<HeaderValue>,
}

impl ServerState {
    pub fn new(config: Config) -> Self {
        let root = resolve_root(Path::new(&config.files.root));
        let server_header = HeaderValue::from_str(&config.server.server_name)
            .map_err(|e| {
                logger::log_warning(&format!(
                    "Ignoring invalid server_name '{}': {e}",
                    config.server.server_name
                ));
            })
            .ok();

        Self {
            config,
            root,
            server_header,
        }
    }
}

/// Canonicalize the document root against the working directory
///
/// A missing root is not fatal: every lookup then answers 404.
fn resolve_root(root: &Path) -> PathBuf {
    match root.canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Document root '{}' is not accessible: {e}",
                root.display()
            ));
            std::env::current_dir().map_or_else(|_| root.to_path_buf(), |cwd| cwd.join(root))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_canonical() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.files.root = dir.path().join(".").to_string_lossy().into_owned();

        let state = ServerState::new(config);
        assert_eq!(state.root, dir.path().canonicalize().unwrap());
        assert!(state.server_header.is_some());
    }

    #[test]
    fn test_missing_root_is_absolute() {
        let mut config = Config::default();
        config.files.root = "definitely-missing-docroot".to_string();

        let state = ServerState::new(config);
        assert!(state.root.is_absolute());
        assert!(state.root.ends_with("definitely-missing-docroot"));
    }
}
