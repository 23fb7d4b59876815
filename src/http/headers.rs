//! Cross-origin isolation headers
//!
//! Browsers only expose `SharedArrayBuffer` and high-resolution timers to
//! pages served with COOP `same-origin` and COEP `require-corp`. The CORS
//! headers let other origins load the same files, and caching is disabled
//! so edited files are always refetched.

use hyper::header::{
    HeaderMap, HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL,
};

pub const CROSS_ORIGIN_EMBEDDER_POLICY: HeaderName =
    HeaderName::from_static("cross-origin-embedder-policy");
pub const CROSS_ORIGIN_OPENER_POLICY: HeaderName =
    HeaderName::from_static("cross-origin-opener-policy");

/// Headers attached to every response, in the order they are written
pub const ISOLATION_HEADERS: [(HeaderName, HeaderValue); 6] = [
    (ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*")),
    (
        CROSS_ORIGIN_EMBEDDER_POLICY,
        HeaderValue::from_static("require-corp"),
    ),
    (ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("*")),
    (ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*")),
    (
        CROSS_ORIGIN_OPENER_POLICY,
        HeaderValue::from_static("same-origin"),
    ),
    (
        CACHE_CONTROL,
        HeaderValue::from_static("no-store, no-cache, must-revalidate"),
    ),
];

/// Set every isolation header on `headers`
///
/// Uses `insert`, so any value set earlier (e.g. a `Cache-Control` from a
/// response builder) is replaced and each header ends up present once.
pub fn apply_isolation_headers(headers: &mut HeaderMap) {
    for (name, value) in ISOLATION_HEADERS {
        headers.insert(name, value);
    }
}
