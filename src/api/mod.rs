//! REST API for panel state, alerts, and telemetry.
//!
//! Provides three GET endpoints over a completed demo run:
//! - `/state` — final panel snapshot and latest telemetry record
//! - `/alerts` — every emitted alert, in emission order
//! - `/telemetry` — full per-tick rows with optional range filtering

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;

use crate::panel::alert::AlertRecord;
use crate::panel::state::StateSnapshot;
use crate::runner::TelemetryRow;

/// Immutable application state shared across all request handlers.
///
/// Constructed once after the demo run completes and wrapped in `Arc` —
/// no locks needed since all data is read-only.
pub struct AppState {
    /// Panel state after the final tick.
    pub snapshot: StateSnapshot,
    /// Alerts in emission order.
    pub alerts: Vec<AlertRecord>,
    /// Per-tick telemetry rows.
    pub telemetry: Vec<TelemetryRow>,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/state", get(handlers::get_state))
        .route("/alerts", get(handlers::get_alerts))
        .route("/telemetry", get(handlers::get_telemetry))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Panics
///
/// Panics if the TCP listener cannot bind to `addr`.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind to {addr}: {e}"));
    eprintln!("API server listening on http://{addr}");
    axum::serve(listener, app)
        .await
        .unwrap_or_else(|e| panic!("server error: {e}"));
}
