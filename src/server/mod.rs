// Server module entry point
// Binds the listener and runs the accept loop

pub mod connection;
pub mod listener;
mod stream;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use crate::config::{Config, ServerState};
use crate::error::ServerError;
use crate::logger;

pub use connection::spawn_connection;
pub use listener::create_listener;

/// Pause after a failed `accept`, e.g. when out of file descriptors
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// A bound static file server
pub struct Server {
    listener: TcpListener,
    state: Arc<ServerState>,
}

impl Server {
    /// Bind the configured address
    ///
    /// Must be called from within a tokio runtime.
    pub fn bind(config: Config) -> Result<Self, ServerError> {
        let addr = config.get_socket_addr()?;
        let listener = create_listener(addr).map_err(|source| ServerError::Bind { addr, source })?;

        Ok(Self {
            listener,
            state: Arc::new(ServerState::new(config)),
        })
    }

    /// Address actually bound (resolves port 0)
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the process is killed
    ///
    /// Each connection is served in its own task, so a stalled client
    /// never holds up the loop.
    pub async fn run(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer_addr)) => {
                    spawn_connection(stream, peer_addr, Arc::clone(&self.state));
                }
                Err(e) => {
                    logger::log_error(&format!("Failed to accept connection: {e}"));
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            }
        }
    }
}
