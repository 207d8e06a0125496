use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Owns the PostgreSQL pool shared by every store
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        info!(
            "Connected to database (max_connections={})",
            config.max_connections
        );
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply embedded schema migrations
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}

#[cfg(test)]
mod tests {
    const INIT_SQL: &str = include_str!("../../migrations/0001_init.sql");

    fn table_block(name: &str) -> &'static str {
        let start = INIT_SQL
            .find(&format!("CREATE TABLE IF NOT EXISTS {} (", name))
            .unwrap();
        let end = start + INIT_SQL[start..].find(");").unwrap();
        &INIT_SQL[start..end]
    }

    #[test]
    fn execution_record_text_columns_are_unbounded() {
        // caller-controlled values must never be rejected by the audit insert
        let block = table_block("api_interface_execution_record");
        assert!(!block.contains("VARCHAR"), "bounded column in:\n{}", block);
        for column in ["executor_name", "remark", "client_ip", "user_agent"] {
            assert!(
                block.lines().any(|l| {
                    let mut parts = l.split_whitespace();
                    parts.next() == Some(column) && parts.next() == Some("TEXT")
                }),
                "{} is not TEXT",
                column
            );
        }
    }
}
