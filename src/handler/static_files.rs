//! Static file serving module
//!
//! Resolves request paths under the document root and builds file,
//! index, listing, redirect and error responses.

use crate::config::ServerState;
use crate::handler::listing;
use crate::handler::path::translate_path;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::fs::Metadata;
use std::io;
use std::path::Path;
use tokio::fs;

/// Serve `GET`/`HEAD` for the request path
pub async fn serve_path(ctx: &RequestContext<'_>, state: &ServerState) -> Response<Full<Bytes>> {
    let Some(translated) = translate_path(ctx.path) else {
        logger::log_warning(&format!("Rejected undecodable path: {}", ctx.path));
        return http::build_400_response();
    };

    let target = state.root.join(&translated.relative);
    let metadata = match fs::metadata(&target).await {
        Ok(m) => m,
        Err(e) => return io_error_response(&target, &e),
    };

    if let Err(resp) = check_within_root(&target, &state.root, ctx.path).await {
        return resp;
    }

    if metadata.is_dir() {
        if !translated.trailing_slash {
            return http::build_redirect_response(&directory_location(ctx));
        }
        return serve_directory(ctx, state, &target).await;
    }

    // `/file.txt/` names a directory that does not exist
    if translated.trailing_slash {
        return http::build_404_response();
    }

    serve_file(ctx, &target, &metadata).await
}

/// Serve an index file from `dir`, or its listing
async fn serve_directory(
    ctx: &RequestContext<'_>,
    state: &ServerState,
    dir: &Path,
) -> Response<Full<Bytes>> {
    for index_file in &state.config.files.index_files {
        let index_path = dir.join(index_file);
        if let Ok(m) = fs::metadata(&index_path).await {
            if m.is_file() {
                if let Err(resp) = check_within_root(&index_path, &state.root, ctx.path).await {
                    return resp;
                }
                return serve_file(ctx, &index_path, &m).await;
            }
        }
    }

    if !state.config.files.directory_listing {
        return http::build_404_response();
    }

    match listing::read_entries(dir).await {
        Ok(entries) => http::build_html_response(listing::render_listing(ctx.path, &entries)),
        Err(e) => io_error_response(dir, &e),
    }
}

/// Serve a regular file, honoring `If-Modified-Since`
async fn serve_file(
    ctx: &RequestContext<'_>,
    file_path: &Path,
    metadata: &Metadata,
) -> Response<Full<Bytes>> {
    let content_type = mime::content_type_for(file_path);
    let modified = metadata.modified().ok();
    let last_modified = modified.map(cache::http_date).unwrap_or_default();

    if let Some(mtime) = modified {
        if !ctx.has_if_none_match && cache::not_modified_since(ctx.if_modified_since, mtime) {
            return http::build_304_response(&last_modified);
        }
    }

    // HEAD must fail exactly where GET would, so the file is still opened
    if ctx.is_head {
        return match fs::File::open(file_path).await {
            Ok(_) => http::build_file_response(
                Bytes::new(),
                metadata.len(),
                content_type,
                &last_modified,
            ),
            Err(e) => io_error_response(file_path, &e),
        };
    }

    match fs::read(file_path).await {
        Ok(content) => {
            let length = content.len() as u64;
            http::build_file_response(Bytes::from(content), length, content_type, &last_modified)
        }
        Err(e) => io_error_response(file_path, &e),
    }
}

/// Reject targets whose canonical path leaves the document root (symlinks)
async fn check_within_root(
    target: &Path,
    root: &Path,
    request_path: &str,
) -> Result<(), Response<Full<Bytes>>> {
    let canonical = fs::canonicalize(target)
        .await
        .map_err(|e| io_error_response(target, &e))?;

    if canonical.starts_with(root) {
        Ok(())
    } else {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            request_path,
            canonical.display()
        ));
        Err(http::build_403_response())
    }
}

/// `Location` for a directory requested without its trailing slash
///
/// Leading slashes are collapsed: `//host/..` in a `Location` would be read
/// by browsers as a network-path reference to another host.
fn directory_location(ctx: &RequestContext<'_>) -> String {
    let path = ctx.path.trim_start_matches('/');
    match ctx.query {
        Some(q) => format!("/{path}/?{q}"),
        None => format!("/{path}/"),
    }
}

/// Map a filesystem error to a status
fn io_error_response(path: &Path, err: &io::Error) -> Response<Full<Bytes>> {
    match err.kind() {
        // Missing files are routine, no log
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => http::build_404_response(),
        io::ErrorKind::PermissionDenied => {
            logger::log_warning(&format!("Permission denied: {}", path.display()));
            http::build_403_response()
        }
        _ => {
            logger::log_error(&format!("Failed to read '{}': {err}", path.display()));
            http::build_500_response()
        }
    }
}
