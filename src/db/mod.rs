mod error;
pub mod repos;
pub mod sqlite;

use std::sync::Arc;

pub use error::{DbError, DbResult};
pub use repos::*;

use crate::config::DatabaseConfig;

/// Cached repository trait objects, created once at startup.
struct CachedRepos {
    sales: Arc<dyn SalesHistoryRepo>,
    runs: Arc<dyn ForecastRunRepo>,
    results: Arc<dyn ForecastResultRepo>,
    classifications: Arc<dyn SkuClassificationRepo>,
}

/// SQLite-backed database pool.
///
/// Repositories are cached at construction time to avoid allocation on each
/// access.
pub struct DbPool {
    pool: sqlx::SqlitePool,
    repos: CachedRepos,
}

impl DbPool {
    /// Create a DbPool from an existing SQLite pool.
    /// Primarily useful for testing.
    pub fn from_sqlite(pool: sqlx::SqlitePool) -> Self {
        let repos = CachedRepos {
            sales: Arc::new(sqlite::SqliteSalesHistoryRepo::new(pool.clone())),
            runs: Arc::new(sqlite::SqliteForecastRunRepo::new(pool.clone())),
            results: Arc::new(sqlite::SqliteForecastResultRepo::new(pool.clone())),
            classifications: Arc::new(sqlite::SqliteSkuClassificationRepo::new(pool.clone())),
        };
        DbPool { pool, repos }
    }

    /// Create a database pool from configuration.
    pub async fn from_config(config: &DatabaseConfig) -> DbResult<Self> {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(
                sqlx::sqlite::SqliteConnectOptions::new()
                    .filename(&config.path)
                    .create_if_missing(config.create_if_missing)
                    .journal_mode(if config.wal_mode {
                        sqlx::sqlite::SqliteJournalMode::Wal
                    } else {
                        sqlx::sqlite::SqliteJournalMode::Delete
                    })
                    .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms)),
            )
            .await?;

        Ok(Self::from_sqlite(pool))
    }

    /// Run database migrations using sqlx's migration runner.
    /// This automatically creates and manages a _sqlx_migrations table.
    pub async fn run_migrations(&self) -> DbResult<()> {
        tracing::info!("Running SQLite migrations");
        sqlx::migrate!("./migrations_sqlx/sqlite")
            .run(&self.pool)
            .await?;
        tracing::info!("SQLite migrations completed successfully");
        Ok(())
    }

    /// Get the sales history repository (ingestion boundary, read-only).
    pub fn sales(&self) -> Arc<dyn SalesHistoryRepo> {
        Arc::clone(&self.repos.sales)
    }

    /// Get the forecast run repository.
    pub fn runs(&self) -> Arc<dyn ForecastRunRepo> {
        Arc::clone(&self.repos.runs)
    }

    /// Get the forecast result repository.
    pub fn results(&self) -> Arc<dyn ForecastResultRepo> {
        Arc::clone(&self.repos.results)
    }

    /// Get the SKU classification repository.
    pub fn classifications(&self) -> Arc<dyn SkuClassificationRepo> {
        Arc::clone(&self.repos.classifications)
    }

    /// Health check for database connectivity.
    pub async fn health_check(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
