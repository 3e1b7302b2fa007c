use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};

use crate::app::AppState;
use crate::auth::{AuthError, TokenVerifier};
use crate::error::ApiError;

/// What a guarded route needs to check a request
#[derive(Clone)]
pub struct ScopeGuard {
    verifier: Arc<dyn TokenVerifier>,
    scope: &'static str,
}

/// Wrap `route` so it only runs for tokens granting `scope`. The decoded
/// [`AuthPayload`](crate::auth::AuthPayload) is available to the handler as an
/// `Extension`.
pub fn require_scope(
    verifier: &Arc<dyn TokenVerifier>,
    scope: &'static str,
    route: MethodRouter<AppState>,
) -> MethodRouter<AppState> {
    let guard = ScopeGuard {
        verifier: Arc::clone(verifier),
        scope,
    };
    route.route_layer(middleware::from_fn_with_state(guard, check_scope))
}

/// Token + scope check; runs before any body parsing or store access
async fn check_scope(
    State(guard): State<ScopeGuard>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())?;

    let payload = guard.verifier.verify(&token).await.map_err(|e| {
        tracing::debug!("Token rejected for scope '{}': {}", guard.scope, e);
        ApiError::from(e)
    })?;

    if !payload.has_scope(guard.scope) {
        tracing::debug!(
            "Subject {:?} lacks scope '{}'",
            payload.subject,
            guard.scope
        );
        return Err(AuthError::unauthorized().into());
    }

    // Hand the payload to the handler
    request.extensions_mut().insert(payload);

    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or_else(AuthError::header_missing)?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::invalid_header("Authorization malformed."))?;

    let parts: Vec<&str> = auth_str.split_whitespace().collect();
    match parts.as_slice() {
        [] => Err(AuthError::header_missing()),
        [scheme, ..] if !scheme.eq_ignore_ascii_case("bearer") => Err(AuthError::invalid_header(
            "Authorization header must start with \"Bearer\".",
        )),
        [_] => Err(AuthError::invalid_header("Token not found.")),
        [_, token] => Ok(token.to_string()),
        _ => Err(AuthError::invalid_header(
            "Authorization header must be bearer token.",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(extract_bearer_token(&headers("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert_eq!(extract_bearer_token(&headers("bearer abc")).unwrap(), "abc");
    }

    #[test]
    fn missing_header_is_reported() {
        let err = extract_bearer_token(&HeaderMap::new()).unwrap_err();
        assert_eq!(err, AuthError::header_missing());
    }

    #[test]
    fn malformed_headers_are_invalid() {
        let cases = [
            ("Basic dXNlcjpwYXNz", "Authorization header must start with \"Bearer\"."),
            ("Bearer", "Token not found."),
            ("Bearer a b", "Authorization header must be bearer token."),
        ];
        for (value, description) in cases {
            let err = extract_bearer_token(&headers(value)).unwrap_err();
            assert_eq!(err.code, "invalid_header", "{}", value);
            assert_eq!(err.description, description, "{}", value);
        }
    }
}
