#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tempfile::TempDir;

use drinks_api::app::{self, scopes, AppState};
use drinks_api::auth::{SecretVerifier, TokenVerifier};
use drinks_api::config::{AppConfig, DatabaseConfig};
use drinks_api::database::Database;

const SECRET: &[u8] = b"integration-test-secret";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
    // Keeps a file-backed store alive for the server's lifetime
    _store_dir: Option<TempDir>,
}

impl TestServer {
    /// Serve the real router over a fresh in-memory store on a free port.
    /// The in-memory store holds a single connection, so requests are serialised.
    pub async fn spawn() -> Result<Self> {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            connection_timeout: 5,
        };
        Self::spawn_with(config, None).await
    }

    /// Serve over a SQLite file with a multi-connection pool, so concurrent
    /// requests really race on the store
    pub async fn spawn_file_backed() -> Result<Self> {
        let dir = tempfile::tempdir().context("failed to create store directory")?;
        let config = DatabaseConfig {
            url: format!("sqlite://{}", dir.path().join("drinks.db").display()),
            max_connections: 4,
            connection_timeout: 5,
        };
        Self::spawn_with(config, Some(dir)).await
    }

    /// The server lives on the calling test's runtime.
    async fn spawn_with(config: DatabaseConfig, store_dir: Option<TempDir>) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let db = Database::connect(&config).await?;
        let verifier: Arc<dyn TokenVerifier> = Arc::new(SecretVerifier::new(SECRET, None));
        let app = app::router(AppState::new(db, verifier), &AppConfig::development().security);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind port {}", port))?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            port,
            base_url,
            client: reqwest::Client::new(),
            _store_dir: store_dir,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST /drinks as a manager, returning the created drink
    pub async fn create_drink(&self, body: Value) -> Result<Value> {
        let res = self
            .client
            .post(self.url("/drinks"))
            .bearer_auth(manager_token())
            .json(&body)
            .send()
            .await?;
        anyhow::ensure!(res.status().is_success(), "create failed: {}", res.status());

        let body = res.json::<Value>().await?;
        Ok(body["drinks"][0].clone())
    }
}

pub fn token_with(claims: Value) -> String {
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET))
        .expect("failed to sign test token")
}

pub fn token(permissions: &[&str]) -> String {
    token_with(json!({
        "sub": "auth0|tester",
        "exp": chrono::Utc::now().timestamp() + 3600,
        "permissions": permissions,
    }))
}

/// Baristas may only read the detailed menu
pub fn barista_token() -> String {
    token(&[scopes::GET_DRINKS_DETAIL])
}

pub fn manager_token() -> String {
    token(&[
        scopes::GET_DRINKS_DETAIL,
        scopes::POST_DRINKS,
        scopes::PATCH_DRINKS,
        scopes::DELETE_DRINKS,
    ])
}

pub fn water() -> Value {
    json!({
        "title": "Water",
        "recipe": [{"color": "blue", "name": "water", "parts": 1}]
    })
}
