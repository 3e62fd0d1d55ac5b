//! HTTP response building module
//!
//! Builders for the responses the static-file server and the binary send.

use super::range::ByteRange;
use chrono::{DateTime, Utc};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    ACCEPT_RANGES, CACHE_CONTROL, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, ETAG, LAST_MODIFIED,
};
use hyper::{Response, StatusCode};
use std::time::SystemTime;

/// Response type used throughout the pipeline
pub type HttpResponse = Response<Full<Bytes>>;

/// Header values shared by full and partial file responses
#[derive(Debug, Clone)]
pub struct FileHeaders {
    pub content_type: String,
    pub etag: String,
    pub cache_control: String,
    pub last_modified: Option<SystemTime>,
}

/// RFC 7231 IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
pub fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

fn file_builder(status: StatusCode, headers: &FileHeaders) -> hyper::http::response::Builder {
    let mut builder = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, headers.content_type.as_str())
        .header(ACCEPT_RANGES, "bytes")
        .header(ETAG, headers.etag.as_str())
        .header(CACHE_CONTROL, headers.cache_control.as_str());
    if let Some(modified) = headers.last_modified {
        builder = builder.header(LAST_MODIFIED, http_date(modified));
    }
    builder
}

/// 200 with the whole file; HEAD keeps the headers and drops the body
pub fn build_file_response(
    data: Bytes,
    headers: &FileHeaders,
    is_head: bool,
) -> Result<HttpResponse, hyper::http::Error> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };
    file_builder(StatusCode::OK, headers)
        .header(CONTENT_LENGTH, content_length)
        .body(Full::new(body))
}

/// 206 with the requested slice of `data`
pub fn build_partial_response(
    data: &Bytes,
    range: ByteRange,
    headers: &FileHeaders,
    is_head: bool,
) -> Result<HttpResponse, hyper::http::Error> {
    let body = if is_head {
        Bytes::new()
    } else {
        data.slice(range.start..=range.end)
    };
    file_builder(StatusCode::PARTIAL_CONTENT, headers)
        .header(CONTENT_LENGTH, range.content_length())
        .header(
            CONTENT_RANGE,
            format!("bytes {}-{}/{}", range.start, range.end, data.len()),
        )
        .body(Full::new(body))
}

/// 304 Not Modified
pub fn build_304_response(etag: &str, cache_control: &str) -> HttpResponse {
    Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(ETAG, etag)
        .header(CACHE_CONTROL, cache_control)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("304", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// 404 Not Found
pub fn build_404_response() -> HttpResponse {
    build_text_response(StatusCode::NOT_FOUND, "404 Not Found")
}

/// 416 Range Not Satisfiable
pub fn build_416_response(total_size: usize) -> HttpResponse {
    Response::builder()
        .status(StatusCode::RANGE_NOT_SATISFIABLE)
        .header(CONTENT_TYPE, "text/plain")
        .header(CONTENT_RANGE, format!("bytes */{total_size}"))
        .body(Full::new(Bytes::from("Range Not Satisfiable")))
        .unwrap_or_else(|e| {
            log_build_error("416", &e);
            Response::new(Full::new(Bytes::from("Range Not Satisfiable")))
        })
}

/// 400 Bad Request
pub fn build_400_response() -> HttpResponse {
    build_text_response(StatusCode::BAD_REQUEST, "400 Bad Request")
}

/// 500 Internal Server Error
pub fn build_500_response() -> HttpResponse {
    build_text_response(StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error")
}

fn build_text_response(status: StatusCode, text: &'static str) -> HttpResponse {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain")
        .body(Full::new(Bytes::from(text)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            let mut response = Response::new(Full::new(Bytes::from(text)));
            *response.status_mut() = status;
            response
        })
}

fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
