//! Conditional request handling
//!
//! Files carry a `Last-Modified` date and `If-Modified-Since` requests are
//! answered with 304 when the file has not changed since. No `ETag` is
//! generated: responses are never stored, so only revalidation matters.

use chrono::{DateTime, Utc};
use std::time::SystemTime;

/// IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
const HTTP_DATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Format a timestamp as an HTTP date
pub fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format(HTTP_DATE).to_string()
}

/// Check the client's `If-Modified-Since` against the file's mtime
///
/// HTTP dates have one-second resolution, so the mtime is truncated before
/// comparing. A missing or unparseable header never matches.
///
/// # Returns
/// Returns true if the file is unchanged (should return 304)
pub fn not_modified_since(if_modified_since: Option<&str>, modified: SystemTime) -> bool {
    let Some(since) = if_modified_since.and_then(parse_http_date) else {
        return false;
    };
    DateTime::<Utc>::from(modified).timestamp() <= since.timestamp()
}

fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|d| d.with_timezone(&Utc))
}
