//! Axum HTTP handlers for the web server
//!
//! Provides the XML-RPC endpoint and a health probe.

use axum::{
    body::to_bytes,
    extract::{Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::xmlrpc::server::handle_xml_rpc_request;
use crate::AppState;

pub const XML_CONTENT_TYPE: &str = "text/xml";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn xml_rpc_endpoint(State(state): State<AppState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = match to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(err) => return AppError::body_read(err.to_string()).into_response(),
    };

    match handle_xml_rpc_request(&state.registry, &parts.method, &body) {
        Ok(document) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, XML_CONTENT_TYPE)],
            document,
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}
