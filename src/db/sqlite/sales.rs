use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Row, SqlitePool};

use crate::{
    db::{
        error::DbResult,
        repos::{ItemRevenue, SalesHistoryRepo},
    },
    models::RawSalesRow,
};

pub struct SqliteSalesHistoryRepo {
    pool: SqlitePool,
}

impl SqliteSalesHistoryRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SalesHistoryRepo for SqliteSalesHistoryRepo {
    async fn fetch_history(
        &self,
        client_id: &str,
        item_id: &str,
        until: Option<NaiveDate>,
    ) -> DbResult<Vec<RawSalesRow>> {
        // sale_date is raw TEXT from ingestion; ISO dates compare lexically,
        // so the cutoff works without parsing rows we may later drop anyway.
        let rows = match until {
            Some(cutoff) => {
                sqlx::query(
                    r#"
                    SELECT sale_date, units_sold
                    FROM daily_sales
                    WHERE client_id = ? AND item_id = ? AND sale_date <= ?
                    ORDER BY sale_date
                    "#,
                )
                .bind(client_id)
                .bind(item_id)
                .bind(cutoff)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT sale_date, units_sold
                    FROM daily_sales
                    WHERE client_id = ? AND item_id = ?
                    ORDER BY sale_date
                    "#,
                )
                .bind(client_id)
                .bind(item_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows
            .iter()
            .map(|row| RawSalesRow::new(row.get::<String, _>("sale_date"), row.get("units_sold")))
            .collect())
    }

    async fn revenue_by_item(
        &self,
        client_id: &str,
        until: Option<NaiveDate>,
    ) -> DbResult<Vec<ItemRevenue>> {
        let rows = match until {
            Some(cutoff) => {
                sqlx::query(
                    r#"
                    SELECT item_id, SUM(COALESCE(revenue, units_sold, 0)) AS revenue
                    FROM daily_sales
                    WHERE client_id = ? AND sale_date <= ?
                    GROUP BY item_id
                    ORDER BY revenue DESC, item_id
                    "#,
                )
                .bind(client_id)
                .bind(cutoff)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT item_id, SUM(COALESCE(revenue, units_sold, 0)) AS revenue
                    FROM daily_sales
                    WHERE client_id = ?
                    GROUP BY item_id
                    ORDER BY revenue DESC, item_id
                    "#,
                )
                .bind(client_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows
            .iter()
            .map(|row| ItemRevenue {
                item_id: row.get("item_id"),
                revenue: row.get("revenue"),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::create_test_pool;

    async fn seed_row(
        pool: &SqlitePool,
        client_id: &str,
        item_id: &str,
        date: &str,
        units: Option<f64>,
        revenue: Option<f64>,
    ) {
        sqlx::query(
            r#"
            INSERT INTO daily_sales (client_id, item_id, sale_date, units_sold, revenue)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(client_id)
        .bind(item_id)
        .bind(date)
        .bind(units)
        .bind(revenue)
        .execute(pool)
        .await
        .expect("seed failed");
    }

    #[tokio::test]
    async fn test_fetch_history_orders_and_cuts_off() {
        let pool = create_test_pool().await;
        seed_row(&pool, "acme", "sku-1", "2025-01-03", Some(3.0), None).await;
        seed_row(&pool, "acme", "sku-1", "2025-01-01", Some(1.0), None).await;
        seed_row(&pool, "acme", "sku-1", "2025-01-05", Some(5.0), None).await;
        seed_row(&pool, "acme", "sku-2", "2025-01-01", Some(9.0), None).await;
        let repo = SqliteSalesHistoryRepo::new(pool);

        let cutoff = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();
        let rows = repo
            .fetch_history("acme", "sku-1", Some(cutoff))
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].sale_date, "2025-01-01");
        assert_eq!(rows[1].sale_date, "2025-01-03");
    }

    #[tokio::test]
    async fn test_fetch_history_keeps_null_units() {
        let pool = create_test_pool().await;
        seed_row(&pool, "acme", "sku-1", "2025-01-01", None, None).await;
        let repo = SqliteSalesHistoryRepo::new(pool);

        let rows = repo.fetch_history("acme", "sku-1", None).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].units_sold.is_none());
    }

    #[tokio::test]
    async fn test_revenue_by_item_prefers_revenue_column() {
        let pool = create_test_pool().await;
        // sku-1: explicit revenue; sku-2: falls back to units.
        seed_row(&pool, "acme", "sku-1", "2025-01-01", Some(2.0), Some(500.0)).await;
        seed_row(&pool, "acme", "sku-1", "2025-01-02", Some(2.0), Some(500.0)).await;
        seed_row(&pool, "acme", "sku-2", "2025-01-01", Some(30.0), None).await;
        seed_row(&pool, "other", "sku-9", "2025-01-01", Some(9.0), Some(9999.0)).await;
        let repo = SqliteSalesHistoryRepo::new(pool);

        let revenues = repo.revenue_by_item("acme", None).await.unwrap();
        assert_eq!(revenues.len(), 2);
        assert_eq!(revenues[0].item_id, "sku-1");
        assert_eq!(revenues[0].revenue, 1000.0);
        assert_eq!(revenues[1].item_id, "sku-2");
        assert_eq!(revenues[1].revenue, 30.0);
    }
}
