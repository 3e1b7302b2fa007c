// handlers/public/drinks.rs - GET /drinks handler

use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::Drink;
use crate::error::ApiError;

/// GET /drinks - Every drink in its short form (ingredient names withheld)
pub async fn list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let mut conn = state.db.acquire().await?;
    let drinks = Drink::list_all(&mut conn).await?;

    let drinks: Vec<_> = drinks.iter().map(Drink::short).collect();
    Ok(Json(json!({ "success": true, "drinks": drinks })))
}
