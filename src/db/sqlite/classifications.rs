use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::{
    db::{error::DbResult, repos::SkuClassificationRepo},
    models::{AbcClass, DemandPattern, SkuClassification, XyzClass},
};

pub struct SqliteSkuClassificationRepo {
    pool: SqlitePool,
}

impl SqliteSkuClassificationRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_classification(row: &sqlx::sqlite::SqliteRow) -> DbResult<SkuClassification> {
        let warnings: Vec<String> = serde_json::from_str(&row.get::<String, _>("warnings"))?;

        Ok(SkuClassification {
            abc_class: AbcClass::from_str(&row.get::<String, _>("abc_class")),
            xyz_class: XyzClass::from_str(&row.get::<String, _>("xyz_class")),
            demand_pattern: DemandPattern::from_str(&row.get::<String, _>("demand_pattern")),
            adi: row.get("adi"),
            cv_squared: row.get("cv_squared"),
            forecastability_score: row.get("forecastability_score"),
            recommended_method: row.get("recommended_method"),
            expected_mape_range: (row.get("expected_mape_low"), row.get("expected_mape_high")),
            warnings,
        })
    }
}

#[async_trait]
impl SkuClassificationRepo for SqliteSkuClassificationRepo {
    async fn upsert(
        &self,
        client_id: &str,
        item_id: &str,
        classification: &SkuClassification,
    ) -> DbResult<()> {
        let now = chrono::Utc::now();
        let warnings = serde_json::to_string(&classification.warnings)?;

        sqlx::query(
            r#"
            INSERT INTO sku_classifications (
                client_id, item_id, abc_class, xyz_class, demand_pattern,
                adi, cv_squared, forecastability_score, recommended_method,
                expected_mape_low, expected_mape_high, warnings, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (client_id, item_id)
            DO UPDATE SET
                abc_class = excluded.abc_class,
                xyz_class = excluded.xyz_class,
                demand_pattern = excluded.demand_pattern,
                adi = excluded.adi,
                cv_squared = excluded.cv_squared,
                forecastability_score = excluded.forecastability_score,
                recommended_method = excluded.recommended_method,
                expected_mape_low = excluded.expected_mape_low,
                expected_mape_high = excluded.expected_mape_high,
                warnings = excluded.warnings,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(client_id)
        .bind(item_id)
        .bind(classification.abc_class.as_str())
        .bind(classification.xyz_class.as_str())
        .bind(classification.demand_pattern.as_str())
        .bind(classification.adi)
        .bind(classification.cv_squared)
        .bind(classification.forecastability_score)
        .bind(&classification.recommended_method)
        .bind(classification.expected_mape_range.0)
        .bind(classification.expected_mape_range.1)
        .bind(warnings)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(
        &self,
        client_id: &str,
        item_id: &str,
    ) -> DbResult<Option<SkuClassification>> {
        let row = sqlx::query(
            r#"
            SELECT abc_class, xyz_class, demand_pattern, adi, cv_squared,
                   forecastability_score, recommended_method,
                   expected_mape_low, expected_mape_high, warnings
            FROM sku_classifications
            WHERE client_id = ? AND item_id = ?
            "#,
        )
        .bind(client_id)
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_classification).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::create_test_pool;
    use crate::forecasting::method;

    fn classification() -> SkuClassification {
        SkuClassification {
            abc_class: AbcClass::A,
            xyz_class: XyzClass::X,
            demand_pattern: DemandPattern::Regular,
            adi: 1.05,
            cv_squared: 0.12,
            forecastability_score: 0.91,
            recommended_method: method::CHRONOS2.to_string(),
            expected_mape_range: (10.0, 20.0),
            warnings: vec!["example warning".to_string()],
        }
    }

    #[tokio::test]
    async fn test_upsert_and_get_round_trip() {
        let repo = SqliteSkuClassificationRepo::new(create_test_pool().await);
        repo.upsert("acme", "sku-1", &classification()).await.unwrap();

        let stored = repo.get("acme", "sku-1").await.unwrap().unwrap();
        assert_eq!(stored.abc_class, AbcClass::A);
        assert_eq!(stored.demand_pattern, DemandPattern::Regular);
        assert_eq!(stored.recommended_method, method::CHRONOS2);
        assert_eq!(stored.expected_mape_range, (10.0, 20.0));
        assert_eq!(stored.warnings, vec!["example warning".to_string()]);
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_row() {
        let repo = SqliteSkuClassificationRepo::new(create_test_pool().await);
        repo.upsert("acme", "sku-1", &classification()).await.unwrap();

        let mut updated = classification();
        updated.demand_pattern = DemandPattern::Lumpy;
        updated.recommended_method = method::SBA.to_string();
        updated.warnings.clear();
        repo.upsert("acme", "sku-1", &updated).await.unwrap();

        let stored = repo.get("acme", "sku-1").await.unwrap().unwrap();
        assert_eq!(stored.demand_pattern, DemandPattern::Lumpy);
        assert_eq!(stored.recommended_method, method::SBA);
        assert!(stored.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let repo = SqliteSkuClassificationRepo::new(create_test_pool().await);
        assert!(repo.get("acme", "missing").await.unwrap().is_none());
    }
}
