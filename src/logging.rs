use std::time::Instant;

use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started_at = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started_at.elapsed().as_millis();

    info!(
        method = %method,
        path = %path,
        status = status.as_u16(),
        duration_ms = elapsed_ms,
        "request summary"
    );

    if let Some(failure) = transport_failure(status) {
        warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            failure,
            "xml-rpc transport failure"
        );
    }

    response
}

/// Classifies statuses that bypass the XML-RPC envelope. Faults travel as 200 and are not reported here.
pub fn transport_failure(status: StatusCode) -> Option<&'static str> {
    match status {
        StatusCode::METHOD_NOT_ALLOWED => Some("method_not_allowed"),
        StatusCode::INTERNAL_SERVER_ERROR => Some("body_read_or_internal"),
        status if status.is_server_error() => Some("server_error"),
        _ => None,
    }
}
