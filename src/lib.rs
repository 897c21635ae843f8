use std::sync::Arc;

use axum::{
    middleware,
    routing::{any, get},
    Router,
};

pub mod config;
pub mod domain;
pub mod errors;
pub mod http;
pub mod logging;
pub mod xmlrpc;

use xmlrpc::registry::MethodRegistry;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<MethodRegistry>,
    pub rpc_path: Arc<str>,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(registry: MethodRegistry, rpc_path: String, max_body_bytes: usize) -> Self {
        Self {
            registry: Arc::new(registry),
            rpc_path: Arc::<str>::from(rpc_path),
            max_body_bytes,
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    let rpc_path = state.rpc_path.clone();

    Router::new()
        .route("/health", get(http::handlers::health))
        .route(&rpc_path, any(http::handlers::xml_rpc_endpoint))
        .layer(middleware::from_fn(logging::request_logging_middleware))
        .with_state(state)
}
