//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::types::{ErrorResponse, StateResponse, TelemetryQuery, TelemetryRecord};
use crate::panel::alert::AlertRecord;

/// Returns the final panel snapshot and the latest telemetry record.
///
/// `GET /state` → 200 + `StateResponse` JSON
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<StateResponse> {
    let latest = state.telemetry.last().map(TelemetryRecord::from);
    Json(StateResponse {
        snapshot: state.snapshot.clone(),
        latest_tick: latest,
    })
}

/// Returns every emitted alert, in emission order.
///
/// `GET /alerts` → 200 + `Vec<AlertRecord>` JSON
pub async fn get_alerts(State(state): State<Arc<AppState>>) -> Json<Vec<AlertRecord>> {
    Json(state.alerts.clone())
}

/// Returns telemetry records, optionally filtered by tick range.
///
/// `GET /telemetry` → 200 + `Vec<TelemetryRecord>` JSON
/// `GET /telemetry?from=N&to=M` → filtered range (inclusive)
/// `GET /telemetry?from=10&to=5` → 400 + `ErrorResponse`
pub async fn get_telemetry(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TelemetryQuery>,
) -> impl IntoResponse {
    let from = query.from.unwrap_or(0);
    let to = query.to.unwrap_or(usize::MAX);

    if from > to {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("`from` ({from}) must be <= `to` ({to})"),
            }),
        ));
    }

    let records: Vec<TelemetryRecord> = state
        .telemetry
        .iter()
        .filter(|r| r.tick >= from && r.tick <= to)
        .map(TelemetryRecord::from)
        .collect();

    Ok(Json(records))
}
