use uuid::Uuid;

use crate::db::error::{DbError, DbResult};

/// Parse a UUID stored as TEXT. A malformed value means the database was
/// written by something other than this service.
pub(crate) fn parse_uuid(s: &str) -> DbResult<Uuid> {
    Uuid::parse_str(s).map_err(|e| DbError::Internal(format!("Invalid UUID in database: {e}")))
}

/// In-memory pool with the real migrations applied, for repository tests.
#[cfg(test)]
pub(crate) async fn create_test_pool() -> sqlx::SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory SQLite pool");

    sqlx::migrate!("./migrations_sqlx/sqlite")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}
