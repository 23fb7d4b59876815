//! HTTP protocol layer module
//!
//! Protocol-level helpers with no knowledge of the document root: the
//! isolation headers, MIME types, conditional requests and response builders.

pub mod cache;
pub mod headers;
pub mod mime;
pub mod response;

// Re-export commonly used items
pub use headers::apply_isolation_headers;
pub use response::{
    build_304_response, build_400_response, build_403_response, build_404_response,
    build_500_response, build_501_response, build_file_response, build_html_response,
    build_options_response, build_redirect_response,
};
