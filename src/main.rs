use tracing::info;
use xmlrpc_server::{
    build_app, config::Config, domain, logging, xmlrpc::registry::MethodRegistry, AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let config = Config::from_env()?;

    let mut registry = MethodRegistry::new();
    domain::register_handlers(&mut registry);
    info!(methods = ?registry.methods(), "methods registered");

    let bind_socket = config.bind_socket()?;
    let state = AppState::new(registry, config.rpc_path.clone(), config.max_body_bytes);
    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(bind_socket).await?;

    info!(
        bind_addr = %config.bind_addr,
        bind_port = config.bind_port,
        rpc_path = %config.rpc_path,
        "server starting"
    );

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
