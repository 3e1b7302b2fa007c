use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Arc;
use thiserror::Error;

use crate::auth::{JwksVerifier, SecretVerifier, TokenVerifier};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Identity provider domain, e.g. `example.us.auth0.com`
    pub domain: Option<String>,
    pub audience: Option<String>,
    /// Shared HS256 secret, only used when no domain is configured
    pub jwt_secret: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no token verifier configured: set AUTH0_DOMAIN and API_AUDIENCE, or JWT_SECRET")]
    VerifierMissing,

    #[error("AUTH0_DOMAIN is set but API_AUDIENCE is not")]
    AudienceMissing,

    #[error("invalid identity provider domain '{0}'")]
    InvalidDomain(String),
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Auth overrides
        self.auth.domain = non_empty_var("AUTH0_DOMAIN").or(self.auth.domain);
        self.auth.audience = non_empty_var("API_AUDIENCE").or(self.auth.audience);
        self.auth.jwt_secret = non_empty_var("JWT_SECRET").or(self.auth.jwt_secret);

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: "sqlite:database.db".to_string(),
                max_connections: 5,
                connection_timeout: 30,
            },
            auth: AuthConfig::default(),
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["*".to_string()],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "sqlite:database.db".to_string(),
                max_connections: 10,
                connection_timeout: 10,
            },
            auth: AuthConfig::default(),
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "sqlite:database.db".to_string(),
                max_connections: 20,
                connection_timeout: 5,
            },
            auth: AuthConfig::default(),
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }
}

impl AuthConfig {
    /// Pick the token verifier: the identity provider's key set when a domain
    /// is configured, a shared secret otherwise.
    pub fn verifier(&self) -> Result<Arc<dyn TokenVerifier>, ConfigError> {
        if let Some(domain) = &self.domain {
            let audience = self.audience.clone().ok_or(ConfigError::AudienceMissing)?;
            let verifier = JwksVerifier::for_domain(domain, audience)
                .map_err(|_| ConfigError::InvalidDomain(domain.clone()))?;
            return Ok(Arc::new(verifier));
        }

        if let Some(secret) = &self.jwt_secret {
            return Ok(Arc::new(SecretVerifier::new(secret.as_bytes(), self.audience.clone())));
        }

        Err(ConfigError::VerifierMissing)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
