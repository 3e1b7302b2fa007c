// handlers/public/health.rs - GET /health handler

use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;

/// GET /health - Liveness plus a store ping
pub async fn get(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    if let Err(e) = state.db.health_check().await {
        tracing::error!("Health check failed: {}", e);
        return Err(ApiError::ServiceUnavailable);
    }

    Ok(Json(json!({
        "success": true,
        "status": "ok",
        "database": "ok",
        "timestamp": chrono::Utc::now(),
    })))
}
