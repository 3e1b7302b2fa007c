use std::str::FromStr;
use std::time::Duration;

use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool};
use tracing::info;

use super::DatabaseError;
use crate::config::DatabaseConfig;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS drink (
        id     INTEGER PRIMARY KEY AUTOINCREMENT,
        title  VARCHAR(80) NOT NULL UNIQUE,
        recipe VARCHAR(180) NOT NULL
    )
"#;
const DROP_TABLE: &str = "DROP TABLE IF EXISTS drink";
const SEED_DRINK: &str = "INSERT INTO drink (title, recipe) VALUES (?, ?)";

/// Connection pool for the drink store
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the pool and make sure the schema exists
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout));

        // Every connection to :memory: is its own database, so keep exactly one alive
        if Self::is_memory_url(&config.url) {
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options.connect_with(options).await?;
        sqlx::query(CREATE_TABLE).execute(&pool).await?;

        info!("Opened drink store at {}", config.url);
        Ok(Self { pool })
    }

    /// Drop all drinks and start from scratch with a single sample drink.
    /// Bootstrap only; never called from a request handler.
    pub async fn reset(&self) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(DROP_TABLE).execute(&mut *tx).await?;
        sqlx::query(CREATE_TABLE).execute(&mut *tx).await?;
        sqlx::query(SEED_DRINK)
            .bind("water")
            .bind(r#"[{"name": "water", "color": "blue", "parts": 1}]"#)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!("Reset drink store and seeded sample drink");
        Ok(())
    }

    /// Check out a connection for the lifetime of one request
    pub async fn acquire(&self) -> Result<PoolConnection<Sqlite>, DatabaseError> {
        Ok(self.pool.acquire().await?)
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed drink store");
    }

    fn is_memory_url(url: &str) -> bool {
        url.contains(":memory:") || url.contains("mode=memory")
    }
}
