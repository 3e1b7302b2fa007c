// handlers/protected/drinks.rs - Scope-guarded drink handlers
//
// Each handler receives the verified token payload first. By the time it runs
// the scope check has already passed.

use axum::{
    body::Bytes,
    extract::{Extension, Path, State},
    http::HeaderMap,
    response::Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::app::AppState;
use crate::auth::AuthPayload;
use crate::database::{Drink, DrinkPatch, NewDrink};
use crate::error::ApiError;
use crate::validation::{validate_create, validate_update};

use super::utils::{json_object, parse_id};

/// GET /drinks-detail - Every drink in its long form
pub async fn list_detail(
    Extension(_payload): Extension<AuthPayload>,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.db.acquire().await?;
    let drinks = Drink::list_all(&mut conn).await?;

    let drinks: Vec<_> = drinks.iter().map(Drink::long).collect();
    Ok(Json(json!({ "success": true, "drinks": drinks })))
}

/// POST /drinks - Create a drink
pub async fn create(
    Extension(payload): Extension<AuthPayload>,
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let input = json_object(&headers, &body)?;

    let input_errors = validate_create(&input);
    if !input_errors.is_empty() {
        return Err(ApiError::InvalidInput(input_errors));
    }
    let draft: NewDrink = serde_json::from_value(input).map_err(ApiError::internal)?;

    let mut conn = state.db.acquire().await?;
    let drink = Drink::insert(&mut conn, draft).await?;

    info!("Drink {} '{}' created by {:?}", drink.id, drink.title, payload.subject);
    Ok(Json(json!({ "success": true, "drinks": [drink.long()] })))
}

/// PATCH /drinks/:id - Replace the title and/or recipe of a drink
pub async fn update(
    Extension(payload): Extension<AuthPayload>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;

    // Unknown ids are reported before the body is looked at
    let mut conn = state.db.acquire().await?;
    let mut drink = Drink::find_by_id(&mut conn, id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let input = json_object(&headers, &body)?;
    let input_errors = validate_update(&input);
    if !input_errors.is_empty() {
        return Err(ApiError::InvalidInput(input_errors));
    }
    let patch: DrinkPatch = serde_json::from_value(input).map_err(ApiError::internal)?;

    drink.update(&mut conn, patch).await?;

    info!("Drink {} updated by {:?}", drink.id, payload.subject);
    Ok(Json(json!({ "success": true, "drinks": [drink.long()] })))
}

/// DELETE /drinks/:id - Permanently remove a drink
pub async fn delete(
    Extension(payload): Extension<AuthPayload>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;

    let mut conn = state.db.acquire().await?;
    let drink = Drink::find_by_id(&mut conn, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    drink.delete(&mut conn).await?;

    info!("Drink {} deleted by {:?}", id, payload.subject);
    Ok(Json(json!({ "success": true, "delete": id })))
}
