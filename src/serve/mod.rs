// src/serve/mod.rs

//! Single-file serving for the development server.
//!
//! The surrounding router decides *which* file to serve; this module owns
//! *how* a file becomes a response. The range semantics here are a
//! compatibility surface for browser dev-reload tooling and must not
//! change: single ranges are honored with 206, an unsatisfiable range
//! yields 416, a malformed range 400, and a multi-range request 500.

use std::path::Path;

use axum::body::Body;
use axum::http::{header, request, Response, StatusCode};
use http_range::{HttpRange, HttpRangeParseError};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, SeekFrom};
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::errors::Result;

pub mod sourcemap;

// default capacity 64KiB
const STREAM_CAPACITY: usize = 65536;

/// Serve one file out of a merged output tree.
///
/// `.js`/`.css` assets are read whole and get their sourcemap comment
/// rewritten; everything else is streamed. Range problems become HTTP
/// statuses, never errors; filesystem errors propagate to the router.
pub async fn serve_file(path: &Path, req: &request::Parts) -> Result<Response<Body>> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    if ext == "js" || ext == "css" {
        return serve_text_asset(path, ext).await;
    }

    let file = File::open(path).await?;
    let metadata = file.metadata().await?;
    let size = metadata.len();
    let mime = mime_guess::from_path(path).first_or_octet_stream();

    if let Some(range_header) = req.headers.get(header::RANGE) {
        let builder = Response::builder()
            .header(header::CONTENT_TYPE, mime.as_ref())
            .header(header::ACCEPT_RANGES, "bytes");

        let Ok(raw_range) = range_header.to_str() else {
            return Ok(builder.status(StatusCode::BAD_REQUEST).body(Body::empty())?);
        };

        return match HttpRange::parse(raw_range, size) {
            Err(HttpRangeParseError::InvalidRange) => {
                debug!(range = %raw_range, "malformed range header");
                Ok(builder.status(StatusCode::BAD_REQUEST).body(Body::empty())?)
            }
            Err(HttpRangeParseError::NoOverlap) => Ok(builder
                .status(StatusCode::RANGE_NOT_SATISFIABLE)
                .header(header::CONTENT_RANGE, format!("*/{size}"))
                .body(Body::empty())?),
            Ok(ranges) => match ranges.as_slice() {
                [range] => {
                    let mut file = file;
                    file.seek(SeekFrom::Start(range.start)).await?;

                    let end = range.start + range.length - 1;
                    Ok(builder
                        .status(StatusCode::PARTIAL_CONTENT)
                        .header(header::CONTENT_LENGTH, range.length)
                        .header(
                            header::CONTENT_RANGE,
                            format!("bytes {}-{}/{}", range.start, end, size),
                        )
                        .body(Body::from_stream(ReaderStream::with_capacity(
                            file.take(range.length),
                            STREAM_CAPACITY,
                        )))?)
                }
                // We only support one range.
                _ => Ok(builder
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .body(Body::from("server can only return one range"))?),
            },
        };
    }

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CONTENT_LENGTH, size)
        .body(Body::from_stream(ReaderStream::new(file)))?)
}

async fn serve_text_asset(path: &Path, ext: &str) -> Result<Response<Body>> {
    let data = tokio::fs::read_to_string(path).await?;

    let basename = path.file_name().and_then(|n| n.to_str()).unwrap_or("asset");
    let map_url = format!("{basename}.map");
    let rewritten = sourcemap::rewrite_sourcemap_comment(&data, &map_url, ext);

    let mime = mime_guess::from_path(path).first_or_octet_stream();
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .body(Body::from(rewritten))?)
}
