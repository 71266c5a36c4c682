//! HTTP boundary for the meditation generation service.
//!
//! Routes translate requests into pipeline calls and map every classified
//! failure onto a status code and JSON error body.

mod error;
mod routes;
mod state;

pub use error::{ApiError, ServerError};
pub use routes::build_router;
pub use state::AppState;

use log::{info, warn};
use tokio::net::TcpListener;

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: &str, state: AppState) -> Result<(), ServerError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })?;
    let local = listener.local_addr()?;
    info!(
        "meditation server listening (addr={}, audio_route={})",
        local,
        state.audio_route()
    );
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("meditation server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(err) => {
            warn!("failed to listen for shutdown signal: {err}");
            std::future::pending::<()>().await;
        }
    }
}
