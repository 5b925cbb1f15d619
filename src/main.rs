//! MUD Bridge - Binary Entry Point

use std::sync::Arc;

use mud_bridge::api::http::create_router;
use mud_bridge::api::AppState;
use mud_bridge::config::BridgeConfig;
use mud_bridge::session::reaper::spawn_reaper;
use mud_bridge::session::SessionRegistry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = BridgeConfig::from_env();
    let bind_addr = config.bind_addr.clone();

    let registry = Arc::new(SessionRegistry::new(config));
    spawn_reaper(registry.clone());

    let state = Arc::new(AppState::new(registry));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    eprintln!(
        "[Server] {} v{} listening on {}",
        mud_bridge::NAME,
        mud_bridge::VERSION,
        bind_addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        eprintln!("[Server] shutting down");
    }
}
