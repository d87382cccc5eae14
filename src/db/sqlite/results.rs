use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::common::parse_uuid;
use crate::{
    db::{
        error::{DbError, DbResult},
        repos::{DateWindow, ForecastResultRepo, ScoredResult},
    },
    models::{ActualObservation, ForecastResultRow},
};

pub struct SqliteForecastResultRepo {
    pool: SqlitePool,
}

impl SqliteForecastResultRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_result(row: &sqlx::sqlite::SqliteRow) -> DbResult<ForecastResultRow> {
        Ok(ForecastResultRow {
            run_id: parse_uuid(&row.get::<String, _>("run_id"))?,
            item_id: row.get("item_id"),
            method: row.get("method"),
            forecast_date: row.get("forecast_date"),
            point_forecast: row.get("point_forecast"),
            p10: row.get("p10"),
            p50: row.get("p50"),
            p90: row.get("p90"),
            actual_value: row.get("actual_value"),
        })
    }

    /// Build the optional window/run filter tail shared by the read queries.
    fn window_filter(window: &DateWindow, run_id: Option<Uuid>, binds: &mut Vec<String>) -> String {
        let mut clause = String::new();
        if let Some(run_id) = run_id {
            clause.push_str(" AND run_id = ?");
            binds.push(run_id.to_string());
        }
        if let Some(start) = window.start {
            clause.push_str(" AND forecast_date >= ?");
            binds.push(start.format("%Y-%m-%d").to_string());
        }
        if let Some(end) = window.end {
            clause.push_str(" AND forecast_date <= ?");
            binds.push(end.format("%Y-%m-%d").to_string());
        }
        clause
    }
}

#[async_trait]
impl ForecastResultRepo for SqliteForecastResultRepo {
    async fn append_results(&self, rows: &[ForecastResultRow]) -> DbResult<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        // One transaction per run's worth of rows: a failed commit must not
        // leave a partial forecast visible.
        let mut tx = self.pool.begin().await?;

        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO forecast_results (
                    run_id, item_id, method, forecast_date,
                    point_forecast, p10, p50, p90, actual_value
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(row.run_id.to_string())
            .bind(&row.item_id)
            .bind(&row.method)
            .bind(row.forecast_date)
            .bind(row.point_forecast)
            .bind(row.p10)
            .bind(row.p50)
            .bind(row.p90)
            .bind(row.actual_value)
            .execute(&mut *tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                    DbError::Conflict(format!(
                        "Result row already exists for item '{}' method '{}' on {}",
                        row.item_id, row.method, row.forecast_date
                    ))
                }
                _ => DbError::from(e),
            })?;
        }

        tx.commit().await?;
        Ok(rows.len())
    }

    async fn list_by_run_and_method(
        &self,
        run_id: Uuid,
        method_id: &str,
    ) -> DbResult<Vec<ForecastResultRow>> {
        let rows = sqlx::query(
            r#"
            SELECT run_id, item_id, method, forecast_date,
                   point_forecast, p10, p50, p90, actual_value
            FROM forecast_results
            WHERE run_id = ? AND method = ?
            ORDER BY item_id, forecast_date
            "#,
        )
        .bind(run_id.to_string())
        .bind(method_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_result).collect()
    }

    async fn backfill_actuals(
        &self,
        item_id: &str,
        actuals: &[ActualObservation],
    ) -> DbResult<u64> {
        if actuals.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut updated = 0u64;

        for actual in actuals {
            let result = sqlx::query(
                r#"
                UPDATE forecast_results
                SET actual_value = ?
                WHERE item_id = ? AND forecast_date = ?
                "#,
            )
            .bind(actual.actual_value)
            .bind(item_id)
            .bind(actual.date)
            .execute(&mut *tx)
            .await?;

            updated += result.rows_affected();
        }

        tx.commit().await?;
        Ok(updated)
    }

    async fn distinct_methods(&self, item_id: &str, window: DateWindow) -> DbResult<Vec<String>> {
        let mut binds = vec![item_id.to_string()];
        let filter = Self::window_filter(&window, None, &mut binds);

        let query = format!(
            r#"
            SELECT DISTINCT method
            FROM forecast_results
            WHERE item_id = ?{filter}
            ORDER BY method
            "#
        );

        let mut query_builder = sqlx::query(&query);
        for bind in &binds {
            query_builder = query_builder.bind(bind);
        }
        let rows = query_builder.fetch_all(&self.pool).await?;

        Ok(rows.iter().map(|row| row.get("method")).collect())
    }

    async fn scored_rows(
        &self,
        item_id: &str,
        method_id: &str,
        window: DateWindow,
        run_id: Option<Uuid>,
    ) -> DbResult<Vec<ScoredResult>> {
        let mut binds = vec![item_id.to_string(), method_id.to_string()];
        let filter = Self::window_filter(&window, run_id, &mut binds);

        let query = format!(
            r#"
            SELECT point_forecast, actual_value
            FROM forecast_results
            WHERE item_id = ? AND method = ?{filter}
            ORDER BY forecast_date
            "#
        );

        let mut query_builder = sqlx::query(&query);
        for bind in &binds {
            query_builder = query_builder.bind(bind);
        }
        let rows = query_builder.fetch_all(&self.pool).await?;

        Ok(rows
            .iter()
            .map(|row| ScoredResult {
                point_forecast: row.get("point_forecast"),
                actual_value: row.get("actual_value"),
            })
            .collect())
    }
}
