// HTTP API Error Types
use std::any::Any;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::{AuthError, VerifyError};
use crate::database::DatabaseError;
use crate::validation::FieldError;

/// Every failure a request can end in. Rendered as
/// `{success: false, error: <status>, message, code?, input_errors?}`.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest,
    InvalidInput(Vec<FieldError>),
    Conflict { attribute: String },

    // 401 Unauthorized / 403 Forbidden
    Auth(AuthError),

    // 404 Not Found
    NotFound,

    // 405 Method Not Allowed
    MethodNotAllowed,

    // 422 Unprocessable Entity (well-formed JSON of the wrong shape)
    UnprocessableEntity,

    // 500 Internal Server Error; the detail is logged, never returned
    Internal(String),

    // 503 Service Unavailable
    ServiceUnavailable,
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest => StatusCode::BAD_REQUEST,
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict { .. } => StatusCode::BAD_REQUEST,
            ApiError::Auth(err) => err.status,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::UnprocessableEntity => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> String {
        match self {
            ApiError::BadRequest => "The server could not understand the request.".to_string(),
            ApiError::InvalidInput(_) => {
                "The request could not be processed due to invalid data.".to_string()
            }
            ApiError::Conflict { attribute } => {
                format!("The value provided for attribute \"{}\" is already taken.", attribute)
            }
            ApiError::Auth(err) => err.description.to_string(),
            ApiError::NotFound => "The server does not recognize the url.".to_string(),
            ApiError::MethodNotAllowed => {
                "The HTTP method is not allowed for the requested url.".to_string()
            }
            ApiError::UnprocessableEntity => {
                "The request was well-formed but could not be processed due to semantic errors."
                    .to_string()
            }
            ApiError::Internal(_) => {
                "We apologize. Our service seems to have experienced an unexpected error."
                    .to_string()
            }
            ApiError::ServiceUnavailable => "The service is temporarily unavailable.".to_string(),
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": false,
            "error": self.status_code().as_u16(),
            "message": self.message(),
        });

        match self {
            ApiError::InvalidInput(errors) => body["input_errors"] = json!(errors),
            ApiError::Auth(err) => body["code"] = json!(err.code),
            _ => {}
        }

        body
    }

    /// Log the real cause and hide it behind the generic 500
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        let detail = detail.to_string();
        tracing::error!("Unexpected error: {}", detail);
        ApiError::Internal(detail)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

impl From<VerifyError> for ApiError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::Rejected(err) => ApiError::Auth(err),
            VerifyError::KeySet(err) => ApiError::internal(format!("signing key set unavailable: {}", err)),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::UniqueViolation { column } => ApiError::Conflict {
                attribute: column.to_string(),
            },
            DatabaseError::NotFound { .. } => ApiError::NotFound,
            // Don't expose internal store errors to clients
            other => ApiError::internal(other),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

/// Fallback for paths no route matches
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Fallback for known paths hit with an unsupported method
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Response for a handler that panicked
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> axum::response::Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");

    ApiError::internal(format!("handler panicked: {}", detail)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_create;

    #[test]
    fn validation_failure_carries_input_errors() {
        let errors = validate_create(&json!({ "title": "Water" }));
        let body = ApiError::InvalidInput(errors).to_json();

        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"], json!(400));
        assert_eq!(body["input_errors"][0]["attribute"], json!("recipe"));
        assert_eq!(body["input_errors"][0]["type"], json!("attribute_required"));
        assert!(body.get("code").is_none());
    }

    #[test]
    fn auth_failure_exposes_code_and_status() {
        let err = ApiError::from(AuthError::unauthorized());
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        let body = err.to_json();
        assert_eq!(body["error"], json!(403));
        assert_eq!(body["code"], json!("unauthorized"));
        assert_eq!(body["message"], json!("Permission not found."));
    }

    #[test]
    fn unique_violation_becomes_conflict() {
        let err = ApiError::from(DatabaseError::UniqueViolation { column: "title" });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.message(),
            "The value provided for attribute \"title\" is already taken."
        );
    }

    #[test]
    fn vanished_row_is_not_found() {
        let err = ApiError::from(DatabaseError::NotFound { id: 3 });
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_json()["error"], json!(404));
    }

    #[test]
    fn internal_detail_never_reaches_the_body() {
        let err = ApiError::from(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = err.to_json().to_string();
        assert!(!body.to_lowercase().contains("pool"));
        assert!(body.contains("unexpected error"));
    }

    #[test]
    fn panic_payload_is_hidden() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
