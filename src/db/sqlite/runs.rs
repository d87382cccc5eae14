use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::common::parse_uuid;
use crate::{
    db::{
        error::{DbError, DbResult},
        repos::ForecastRunRepo,
    },
    models::{CreateForecastRun, ForecastRun, RunStatus},
};

pub struct SqliteForecastRunRepo {
    pool: SqlitePool,
}

impl SqliteForecastRunRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_run(row: &sqlx::sqlite::SqliteRow) -> DbResult<ForecastRun> {
        let user_id: Option<String> = row.get("user_id");
        let status: String = row.get("status");

        Ok(ForecastRun {
            run_id: parse_uuid(&row.get::<String, _>("run_id"))?,
            client_id: row.get("client_id"),
            user_id: user_id.as_deref().map(parse_uuid).transpose()?,
            status: RunStatus::from_str(&status),
            primary_model: row.get("primary_model"),
            include_baseline: row.get("include_baseline"),
            run_all_methods: row.get("run_all_methods"),
            prediction_length: row.get("prediction_length"),
            training_end_date: row.get("training_end_date"),
            created_at: row.get("created_at"),
        })
    }
}

#[async_trait]
impl ForecastRunRepo for SqliteForecastRunRepo {
    async fn create(&self, input: CreateForecastRun) -> DbResult<ForecastRun> {
        let run_id = Uuid::new_v4();
        let now = chrono::Utc::now();
        let status = RunStatus::Pending;

        sqlx::query(
            r#"
            INSERT INTO forecast_runs (
                run_id, client_id, user_id, status, primary_model,
                include_baseline, run_all_methods, prediction_length,
                training_end_date, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(run_id.to_string())
        .bind(&input.client_id)
        .bind(input.user_id.map(|u| u.to_string()))
        .bind(status.as_str())
        .bind(&input.primary_model)
        .bind(input.include_baseline)
        .bind(input.run_all_methods)
        .bind(input.prediction_length)
        .bind(input.training_end_date)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(ForecastRun {
            run_id,
            client_id: input.client_id,
            user_id: input.user_id,
            status,
            primary_model: input.primary_model,
            include_baseline: input.include_baseline,
            run_all_methods: input.run_all_methods,
            prediction_length: input.prediction_length,
            training_end_date: input.training_end_date,
            created_at: now,
        })
    }

    async fn set_status(&self, run_id: Uuid, status: RunStatus) -> DbResult<()> {
        let result = sqlx::query("UPDATE forecast_runs SET status = ? WHERE run_id = ?")
            .bind(status.as_str())
            .bind(run_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    async fn get_by_id(&self, run_id: Uuid) -> DbResult<Option<ForecastRun>> {
        let row = sqlx::query(
            r#"
            SELECT run_id, client_id, user_id, status, primary_model,
                   include_baseline, run_all_methods, prediction_length,
                   training_end_date, created_at
            FROM forecast_runs
            WHERE run_id = ?
            "#,
        )
        .bind(run_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_run).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::create_test_pool;
    use crate::forecasting::method;

    fn create_input() -> CreateForecastRun {
        CreateForecastRun {
            client_id: "acme".to_string(),
            user_id: None,
            primary_model: method::CHRONOS2.to_string(),
            include_baseline: true,
            run_all_methods: false,
            prediction_length: 30,
            training_end_date: None,
        }
    }

    #[tokio::test]
    async fn test_create_starts_pending() {
        let repo = SqliteForecastRunRepo::new(create_test_pool().await);
        let run = repo.create(create_input()).await.unwrap();

        assert_eq!(run.status, RunStatus::Pending);
        assert!(run.user_id.is_none());

        let fetched = repo.get_by_id(run.run_id).await.unwrap().unwrap();
        assert_eq!(fetched.client_id, "acme");
        assert_eq!(fetched.prediction_length, 30);
        assert!(fetched.include_baseline);
        assert!(!fetched.run_all_methods);
    }

    #[tokio::test]
    async fn test_create_with_user_and_training_end() {
        let repo = SqliteForecastRunRepo::new(create_test_pool().await);
        let user_id = Uuid::new_v4();
        let mut input = create_input();
        input.user_id = Some(user_id);
        input.training_end_date = chrono::NaiveDate::from_ymd_opt(2025, 6, 30);

        let run = repo.create(input).await.unwrap();
        let fetched = repo.get_by_id(run.run_id).await.unwrap().unwrap();

        assert_eq!(fetched.user_id, Some(user_id));
        assert_eq!(
            fetched.training_end_date,
            chrono::NaiveDate::from_ymd_opt(2025, 6, 30)
        );
    }

    #[tokio::test]
    async fn test_status_transitions() {
        let repo = SqliteForecastRunRepo::new(create_test_pool().await);
        let run = repo.create(create_input()).await.unwrap();

        repo.set_status(run.run_id, RunStatus::Running).await.unwrap();
        repo.set_status(run.run_id, RunStatus::Completed)
            .await
            .unwrap();

        let fetched = repo.get_by_id(run.run_id).await.unwrap().unwrap();
        assert_eq!(fetched.status, RunStatus::Completed);
        assert!(fetched.status.is_terminal());
    }

    #[tokio::test]
    async fn test_set_status_unknown_run_is_not_found() {
        let repo = SqliteForecastRunRepo::new(create_test_pool().await);
        let err = repo
            .set_status(Uuid::new_v4(), RunStatus::Failed)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }

    #[tokio::test]
    async fn test_get_unknown_run_is_none() {
        let repo = SqliteForecastRunRepo::new(create_test_pool().await);
        assert!(repo.get_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }
}
