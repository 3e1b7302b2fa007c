pub mod verifier;

pub use verifier::{JwksVerifier, SecretVerifier};

use std::collections::BTreeSet;

use async_trait::async_trait;
use axum::http::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Claims we read from a verified access token
#[derive(Debug, Deserialize)]
pub struct Claims {
    pub sub: Option<String>,
    /// Space-delimited OAuth scope string
    #[serde(default)]
    pub scope: Option<String>,
    /// RBAC permission list as issued by Auth0
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
    pub exp: i64,
}

/// Decoded token handed to every scope-protected handler
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthPayload {
    pub subject: Option<String>,
    pub scopes: BTreeSet<String>,
}

impl AuthPayload {
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }
}

impl From<Claims> for AuthPayload {
    fn from(claims: Claims) -> Self {
        let mut scopes: BTreeSet<String> = claims
            .scope
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        scopes.extend(claims.permissions.unwrap_or_default());

        Self {
            subject: claims.sub,
            scopes,
        }
    }
}

/// Authorization failure with a machine-readable code
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {description}")]
pub struct AuthError {
    pub status: StatusCode,
    pub code: &'static str,
    pub description: &'static str,
}

impl AuthError {
    pub fn header_missing() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "authorization_header_missing",
            description: "Authorization header is expected.",
        }
    }

    pub fn invalid_header(description: &'static str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "invalid_header",
            description,
        }
    }

    pub fn token_expired() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "token_expired",
            description: "Token expired.",
        }
    }

    pub fn invalid_claims() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "invalid_claims",
            description: "Incorrect claims. Please, check the audience and issuer.",
        }
    }

    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            code: "unauthorized",
            description: "Permission not found.",
        }
    }
}

#[derive(Debug, Error)]
pub enum VerifyError {
    /// The token itself was rejected
    #[error(transparent)]
    Rejected(#[from] AuthError),

    /// The signing-key set could not be retrieved
    #[error("failed to fetch signing keys: {0}")]
    KeySet(#[from] reqwest::Error),
}

/// Checks a bearer token's signature and standard claims
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<AuthPayload, VerifyError>;
}
