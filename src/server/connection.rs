// Connection handling module
// Serves one accepted TCP connection in its own task

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ServerState;
use crate::handler;
use crate::logger;
use crate::server::stream::IsolatedStream;

/// Handle a single connection in a spawned task.
///
/// This function:
/// 1. Wraps the TCP stream in `IsolatedStream` and `TokioIo`
/// 2. Configures HTTP/1.1 keep-alive and the header read timeout; malformed
///    header lines are skipped instead of failing the request
/// 3. Serves the connection with the request handler
/// 4. Bounds the connection's lifetime when a timeout is configured
///
/// Errors stay inside the task; the accept loop never sees them.
pub fn spawn_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: Arc<ServerState>,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(IsolatedStream::new(stream));
        let performance = state.config.performance.clone();

        let mut builder = http1::Builder::new();
        builder.keep_alive(performance.keep_alive);
        builder.ignore_invalid_headers(true);
        builder.timer(TokioTimer::new());
        builder.header_read_timeout(
            (performance.header_read_timeout > 0)
                .then(|| Duration::from_secs(performance.header_read_timeout)),
        );

        let conn = builder.serve_connection(
            io,
            service_fn(move |req| handler::handle_request(req, Arc::clone(&state), peer_addr)),
        );

        let result = if performance.connection_timeout > 0 {
            let limit = Duration::from_secs(performance.connection_timeout);
            match tokio::time::timeout(limit, conn).await {
                Ok(result) => result,
                Err(_) => {
                    logger::log_warning(&format!(
                        "Connection from {peer_addr} closed after {} seconds",
                        limit.as_secs()
                    ));
                    return;
                }
            }
        } else {
            conn.await
        };

        if let Err(err) = result {
            // Clients hanging up mid-request is routine
            if !err.is_incomplete_message() {
                logger::log_connection_error(&err);
            }
        }
    });
}
