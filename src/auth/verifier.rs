use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use url::Url;

use super::{AuthError, AuthPayload, Claims, TokenVerifier, VerifyError};

/// Verifies RS256 tokens against the identity provider's published key set
pub struct JwksVerifier {
    client: reqwest::Client,
    jwks_url: Url,
    issuer: String,
    audience: String,
}

impl JwksVerifier {
    pub fn for_domain(domain: &str, audience: String) -> Result<Self, url::ParseError> {
        let base = Url::parse(&format!("https://{}/", domain.trim_end_matches('/')))?;
        let jwks_url = base.join(".well-known/jwks.json")?;

        Ok(Self {
            client: reqwest::Client::new(),
            issuer: base.to_string(),
            jwks_url,
            audience,
        })
    }

    async fn fetch_keys(&self) -> Result<JwkSet, reqwest::Error> {
        self.client
            .get(self.jwks_url.clone())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

#[async_trait]
impl TokenVerifier for JwksVerifier {
    async fn verify(&self, token: &str) -> Result<AuthPayload, VerifyError> {
        let header = decode_header(token).map_err(|_| AuthError::invalid_header("Authorization malformed."))?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::invalid_header("Authorization malformed."))?;

        let keys = self.fetch_keys().await?;
        let jwk = keys
            .find(&kid)
            .ok_or_else(|| AuthError::invalid_header("Unable to find the appropriate key."))?;
        let key = DecodingKey::from_jwk(jwk)
            .map_err(|_| AuthError::invalid_header("Unable to find the appropriate key."))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let data = decode::<Claims>(token, &key, &validation).map_err(reject)?;
        Ok(data.claims.into())
    }
}

/// Verifies HS256 tokens signed with a shared secret (development and tests)
pub struct SecretVerifier {
    key: DecodingKey,
    audience: Option<String>,
}

impl SecretVerifier {
    pub fn new(secret: &[u8], audience: Option<String>) -> Self {
        Self {
            key: DecodingKey::from_secret(secret),
            audience,
        }
    }
}

#[async_trait]
impl TokenVerifier for SecretVerifier {
    async fn verify(&self, token: &str) -> Result<AuthPayload, VerifyError> {
        let mut validation = Validation::new(Algorithm::HS256);
        match &self.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        let data = decode::<Claims>(token, &self.key, &validation).map_err(reject)?;
        Ok(data.claims.into())
    }
}

fn reject(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::token_expired(),
        ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::ImmatureSignature
        | ErrorKind::MissingRequiredClaim(_) => AuthError::invalid_claims(),
        _ => AuthError::invalid_header("Unable to parse authentication token."),
    }
}
