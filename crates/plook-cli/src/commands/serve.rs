//! `plook serve`: run the HTTP server until Ctrl-C

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use plook_config::PlookToml;
use plook_core::error::{PlookError, PlookResult};

use super::{build_plook, CommandContext};
use crate::server::{self, App};

pub async fn execute(config: &PlookToml, ctx: &CommandContext) -> PlookResult<()> {
    let plook = build_plook(config)?;
    let address = config.server.address();

    let listener = TcpListener::bind(&address).await
        .map_err(|e| PlookError::io(format!("Failed to bind {}", address), e))?;
    let local = listener.local_addr()
        .map_err(|e| PlookError::io("Failed to read listener address".to_string(), e))?;

    info!(
        registry = %config.registry.kind,
        raw_host = %config.upstream.raw_host,
        cache_capacity = config.cache.capacity,
        "Listening on http://{}", local
    );
    ctx.output.success(&format!("plook listening on http://{}", local));

    let app = Arc::new(App::new(plook, config.server.cors));
    server::serve(listener, app, shutdown_signal()).await
        .map_err(|e| PlookError::io("Server stopped unexpectedly".to_string(), e))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without a signal handler the server runs until killed
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
