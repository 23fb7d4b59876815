//! Connection stream that patches hyper's own error responses
//!
//! Requests hyper cannot parse (a broken request line, oversized headers)
//! are answered by hyper without calling the service, so those response
//! heads never pass through `handle_request`. Every head the service
//! produces already carries `Cross-Origin-Opener-Policy`; a complete head
//! written without it is one of hyper's, and the isolation headers are
//! spliced in after its status line.

use std::io;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use crate::http::headers::{CROSS_ORIGIN_OPENER_POLICY, ISOLATION_HEADERS};

const LINE_END: &[u8] = b"\r\n";
const HEAD_END: &[u8] = b"\r\n\r\n";

/// Rewritten head still being written out
struct Pending {
    bytes: Vec<u8>,
    written: usize,
    /// Length of the caller's buffer this head replaces
    consumed: usize,
}

/// Wraps an accepted stream for the lifetime of one connection
///
/// Vectored writes stay disabled so hyper flattens each response into a
/// single buffer and a head always arrives in one `poll_write`.
pub struct IsolatedStream<S> {
    inner: S,
    pending: Option<Pending>,
}

impl<S> IsolatedStream<S> {
    pub const fn new(inner: S) -> Self {
        Self {
            inner,
            pending: None,
        }
    }
}

impl<S: AsyncWrite + Unpin> IsolatedStream<S> {
    fn poll_pending(&mut self, cx: &mut Context<'_>) -> Poll<io::Result<usize>> {
        loop {
            let Some(pending) = self.pending.as_mut() else {
                return Poll::Ready(Ok(0));
            };
            if pending.written == pending.bytes.len() {
                let consumed = pending.consumed;
                self.pending = None;
                return Poll::Ready(Ok(consumed));
            }

            let n = ready!(Pin::new(&mut self.inner).poll_write(cx, &pending.bytes[pending.written..]))?;
            if n == 0 {
                return Poll::Ready(Err(io::ErrorKind::WriteZero.into()));
            }
            pending.written += n;
        }
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for IsolatedStream<S> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_read(cx, buf)
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for IsolatedStream<S> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        if this.pending.is_none() {
            match patch_head(buf) {
                Some(bytes) => {
                    this.pending = Some(Pending {
                        bytes,
                        written: 0,
                        consumed: buf.len(),
                    });
                }
                None => return Pin::new(&mut this.inner).poll_write(cx, buf),
            }
        }
        this.poll_pending(cx)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}

/// Insert the isolation headers into `buf` if it is a bare response head
/// that lacks them
///
/// Only a buffer that is exactly one head (status line first, blank line
/// last and nowhere else) qualifies; body bytes are never touched.
fn patch_head(buf: &[u8]) -> Option<Vec<u8>> {
    if !buf.starts_with(b"HTTP/1.") || find(buf, HEAD_END)? + HEAD_END.len() != buf.len() {
        return None;
    }
    if find(&buf.to_ascii_lowercase(), CROSS_ORIGIN_OPENER_POLICY.as_str().as_bytes()).is_some() {
        return None;
    }

    let status_end = find(buf, LINE_END)? + LINE_END.len();
    let mut patched = Vec::with_capacity(buf.len() + 192);
    patched.extend_from_slice(&buf[..status_end]);
    for (name, value) in &ISOLATION_HEADERS {
        patched.extend_from_slice(name.as_str().as_bytes());
        patched.extend_from_slice(b": ");
        patched.extend_from_slice(value.as_bytes());
        patched.extend_from_slice(LINE_END);
    }
    patched.extend_from_slice(&buf[status_end..]);
    Some(patched)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    const HYPER_400: &[u8] =
        b"HTTP/1.1 400 Bad Request\r\nconnection: close\r\ncontent-length: 0\r\n\r\n";

    #[test]
    fn test_bare_head_is_patched() {
        let patched = String::from_utf8(patch_head(HYPER_400).unwrap()).unwrap();
        assert!(patched.starts_with("HTTP/1.1 400 Bad Request\r\naccess-control-allow-origin: *\r\n"));
        assert!(patched.contains("cross-origin-embedder-policy: require-corp\r\n"));
        assert!(patched.contains("cross-origin-opener-policy: same-origin\r\n"));
        assert!(patched.contains("cache-control: no-store, no-cache, must-revalidate\r\n"));
        assert!(patched.ends_with("content-length: 0\r\n\r\n"));
    }

    #[test]
    fn test_head_with_headers_untouched() {
        let head = b"HTTP/1.1 200 OK\r\ncross-origin-opener-policy: same-origin\r\n\r\n";
        assert!(patch_head(head).is_none());
    }

    #[test]
    fn test_head_with_body_untouched() {
        let response = b"HTTP/1.1 400 Bad Request\r\ncontent-length: 2\r\n\r\nhi";
        assert!(patch_head(response).is_none());
    }

    #[test]
    fn test_body_bytes_untouched() {
        assert!(patch_head(b"export const life = 1;\r\n\r\n").is_none());
        assert!(patch_head(b"").is_none());
    }

    #[tokio::test]
    async fn test_write_reports_caller_length() {
        let mut stream = IsolatedStream::new(Vec::new());
        stream.write_all(HYPER_400).await.unwrap();
        stream.write_all(b"plain").await.unwrap();

        let written = String::from_utf8(stream.inner).unwrap();
        assert!(written.contains("access-control-allow-headers: *\r\n"));
        assert!(written.ends_with("\r\n\r\nplain"));
    }
}
