use crate::config::Config;

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Instant;

use axum::body::{Body, HttpBody};
use axum::http::{Request, Response, StatusCode, header};
use axum::response::IntoResponse;
use axum::middleware::Next;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Bodies above this are logged as a truncated preview (data URLs get big).
const PREVIEW_BYTES: usize = 2 * 1024;

/// Largest non-multipart request body buffered for logging; anything bigger
/// is refused with 413. Uploads go through multipart and are never buffered
/// here.
pub const MAX_LOGGED_REQUEST_BYTES: usize = 64 * 1024;

/// Responses larger than this (or of unknown size) are passed through
/// without being buffered.
const MAX_LOGGED_RESPONSE_BYTES: usize = 16 * 1024 * 1024;

/// Keep guards alive for the lifetime of the app.
pub struct LogGuards {
    _file_guard: Option<WorkerGuard>,
}

fn split_path(path: &Path) -> (PathBuf, String) {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    let file = path
        .file_name()
        .unwrap_or_else(|| OsStr::new("outfit-advisor.logs"))
        .to_string_lossy()
        .to_string();
    (dir, file)
}

pub fn init_logging(config: &Config) -> LogGuards {
    let filter = EnvFilter::new(config.log_filter());

    let stdout_layer = fmt::layer()
        .with_target(false)
        .with_ansi(true)
        .compact()
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new(
            "%Y-%m-%d %H:%M:%S".to_string(),
        ));

    let (dir, file) = split_path(&config.log_file);
    let appender = tracing_appender::rolling::never(dir, file);
    let (nb, guard) = tracing_appender::non_blocking(appender);

    let file_layer = fmt::layer()
        .with_target(false)
        .with_ansi(false)
        .compact()
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new(
            "%Y-%m-%d %H:%M:%S".to_string(),
        ))
        .with_writer(nb);

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    LogGuards {
        _file_guard: Some(guard),
    }
}

fn request_id<B>(req: &Request<B>) -> String {
    req.headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string()
}

fn content_type<'a>(headers: &'a axum::http::HeaderMap) -> &'a str {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

fn body_preview(bytes: &[u8]) -> String {
    if bytes.len() > PREVIEW_BYTES {
        format!(
            "{}… [truncated, {} bytes]",
            String::from_utf8_lossy(&bytes[..PREVIEW_BYTES]),
            bytes.len()
        )
    } else {
        String::from_utf8_lossy(bytes).to_string()
    }
}

/// One line per request: method, uri, status, latency, request id.
pub async fn access_log(req: Request<Body>, next: Next) -> Response<Body> {
    let started = Instant::now();
    let req_id = request_id(&req);
    let method = req.method().clone();
    let uri = req.uri().clone();

    let res = next.run(req).await;

    let status = res.status();
    let latency_ms = started.elapsed().as_millis();
    if status.is_server_error() {
        tracing::error!(request_id = %req_id, %method, %uri, %status, latency_ms, "request failed");
    } else {
        tracing::info!(request_id = %req_id, %method, %uri, %status, latency_ms, "request completed");
    }
    res
}

/// Logs request & response bodies at debug level.
/// Multipart uploads and image responses are skipped; long bodies are
/// truncated.
pub async fn log_payloads(req: Request<Body>, next: Next) -> Response<Body> {
    let req_id = request_id(&req);
    let req_ct = content_type(req.headers()).to_string();

    let (req_parts, req_body) = req.into_parts();
    let req = if req_ct.starts_with("multipart/") {
        Request::from_parts(req_parts, req_body)
    } else {
        match axum::body::to_bytes(req_body, MAX_LOGGED_REQUEST_BYTES).await {
            Ok(bytes) => {
                if !bytes.is_empty() {
                    tracing::debug!(request_id = %req_id, request_body = %body_preview(&bytes), "request body");
                }
                Request::from_parts(req_parts, Body::from(bytes))
            }
            Err(e) => {
                tracing::warn!(
                    request_id = %req_id,
                    limit = MAX_LOGGED_REQUEST_BYTES,
                    error = %e,
                    "refusing oversized request body"
                );
                return (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    "request body too large".to_string(),
                )
                    .into_response();
            }
        }
    };

    let res = next.run(req).await;

    let res_ct = content_type(res.headers()).to_string();
    if res_ct.starts_with("image/") || res_ct.starts_with("application/octet-stream") {
        return res;
    }

    let size = res.body().size_hint().exact();
    if size.is_none_or(|n| n > MAX_LOGGED_RESPONSE_BYTES as u64) {
        tracing::debug!(request_id = %req_id, bytes = ?size, "response body not logged");
        return res;
    }

    let (res_parts, res_body) = res.into_parts();
    match axum::body::to_bytes(res_body, MAX_LOGGED_RESPONSE_BYTES).await {
        Ok(bytes) => {
            tracing::debug!(request_id = %req_id, response_body = %body_preview(&bytes), "response body");
            Response::from_parts(res_parts, Body::from(bytes))
        }
        Err(e) => {
            tracing::warn!(request_id = %req_id, error = %e, "failed reading response body");
            Response::from_parts(res_parts, Body::empty())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_file_names_log_to_the_working_directory() {
        let (dir, file) = split_path(Path::new("outfit.logs"));
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(file, "outfit.logs");

        let (dir, file) = split_path(Path::new("/var/log/outfit/app.log"));
        assert_eq!(dir, PathBuf::from("/var/log/outfit"));
        assert_eq!(file, "app.log");
    }

    async fn echo_len(body: axum::body::Bytes) -> String {
        body.len().to_string()
    }

    fn logged_router() -> axum::Router {
        axum::Router::new()
            .route("/", axum::routing::post(echo_len))
            .layer(axum::middleware::from_fn(log_payloads))
    }

    async fn post(body: Vec<u8>) -> (StatusCode, String) {
        use tower::ServiceExt;

        let req = Request::post("/")
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(Body::from(body))
            .unwrap();
        let res = logged_router().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    #[tokio::test]
    async fn small_bodies_pass_through_intact() {
        let (status, body) = post(vec![b'x'; 1000]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "1000");
    }

    #[tokio::test]
    async fn oversized_plain_bodies_never_reach_the_handler() {
        let (status, body) = post(vec![b'x'; MAX_LOGGED_REQUEST_BYTES + 1]).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body, "request body too large");
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = vec![b'a'; PREVIEW_BYTES + 10];
        let p = body_preview(&body);
        assert!(p.ends_with(&format!("[truncated, {} bytes]", PREVIEW_BYTES + 10)));
        assert_eq!(body_preview(b"short"), "short");
    }
}
