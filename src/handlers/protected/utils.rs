use axum::body::Bytes;
use axum::http::{header::CONTENT_TYPE, HeaderMap};
use serde_json::Value;

use crate::error::ApiError;

/// Parse a request body that must be a non-empty JSON object.
///
/// Missing, non-JSON, unparseable or falsy bodies (`null`, `false`, `0`, `""`,
/// `[]`, `{}`) are a bad request, and so is any JSON value that is not an object.
pub fn json_object(headers: &HeaderMap, body: &Bytes) -> Result<Value, ApiError> {
    if body.is_empty() || !is_json_content(headers) {
        return Err(ApiError::BadRequest);
    }

    let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::BadRequest)?;
    if is_falsy(&value) || !value.is_object() {
        return Err(ApiError::BadRequest);
    }

    Ok(value)
}

/// Parse a path id; anything that is not an integer cannot name a drink
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

fn is_json_content(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}
