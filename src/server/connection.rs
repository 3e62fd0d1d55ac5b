// Connection handling module
// Serves one TCP connection and turns pipeline results into HTTP responses

use hyper::header::{CONTENT_LENGTH, REFERER, USER_AGENT};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Version};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use super::App;
use crate::handler::RequestContext;
use crate::http::{self, HttpResponse};
use crate::logger::{self, AccessLogEntry};

/// Serve a connection on its own task
pub fn spawn_connection(stream: tokio::net::TcpStream, peer_addr: SocketAddr, app: Arc<App>) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);
        let service = service_fn(move |req| handle_request(req, peer_addr, Arc::clone(&app)));

        if let Err(err) = http1::Builder::new()
            .keep_alive(true)
            .serve_connection(io, service)
            .await
        {
            logger::log_connection_error(&err);
        }
    });
}

/// Run one request through the middleware
///
/// Undecodable paths get a 400 and pipeline errors a 500 here; the
/// middleware itself never converts errors into responses.
pub async fn handle_request<B>(
    req: Request<B>,
    peer_addr: SocketAddr,
    app: Arc<App>,
) -> Result<HttpResponse, Infallible> {
    let started = Instant::now();

    let ctx = RequestContext::from_request(&req);
    let response = match ctx {
        Ok(ctx) => match app.middleware.invoke(ctx).await {
            Ok(response) => response,
            Err(e) => {
                logger::log_error(&format!("{} {}: {e}", req.method(), req.uri().path()));
                http::build_500_response()
            }
        },
        Err(e) => {
            logger::log_warning(&format!("{} {}: {e}", req.method(), req.uri().path()));
            http::build_400_response()
        }
    };

    if app.access_log {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            req.method().to_string(),
            req.uri().path().to_string(),
        );
        entry.query = req.uri().query().map(ToString::to_string);
        entry.http_version = version_label(req.version()).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        entry.referer = header_string(&req, REFERER);
        entry.user_agent = header_string(&req, USER_AGENT);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &app.access_log_format);
    }

    Ok(response)
}

fn header_string<B>(req: &Request<B>, name: hyper::header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
