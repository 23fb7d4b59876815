//! Static file server for cross-origin isolated pages
//!
//! Serves a document root over HTTP/1.1 and stamps every response with the
//! CORS, COEP, COOP and no-cache headers browsers require before enabling
//! `SharedArrayBuffer`. `OPTIONS` preflights are answered without touching
//! the filesystem.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use config::Config;
pub use error::ServerError;
pub use server::Server;
