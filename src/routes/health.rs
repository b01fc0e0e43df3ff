use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::{state::SheetStatus, AppState};

/// GET /health — the week being served and what the last refresh saw.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let snapshot = state.week.read().await.clone();
    let status = match snapshot.sheet {
        SheetStatus::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };
    let label = if status.is_success() { "ok" } else { "error" };
    (status, Json(json!({ "status": label, "week": snapshot })))
}
