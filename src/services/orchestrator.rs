//! Forecast orchestration: run lifecycle, per-item isolation, persistence
//! gating.
//!
//! Per request: fetch each item's history, validate, classify, route, run
//! every planned method, then either commit the whole run in one
//! transaction or hand everything back in-memory (test bed). A failing
//! item never aborts its siblings; the run fails only when every item
//! failed or the commit itself did.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    classification::classify_sku,
    config::ForecastingConfig,
    db::{DbError, DbPool},
    forecasting::{ModelError, ModelRegistry, sanitize_predictions},
    models::{
        CreateForecastRun, ForecastResultRow, GenerateForecastRequest, GenerateForecastResponse,
        ItemFailure, ItemFailureKind, ItemForecast, PredictionOut, QuantilesOut, RunStatus,
        SkuClassification,
    },
    validation::{ValidationError, validate_series},
};

#[derive(Debug, Error)]
pub enum ForecastServiceError {
    #[error("database error: {0}")]
    Database(#[from] DbError),

    /// A failed run commit. The run record is marked failed and no result
    /// rows are visible.
    #[error("persistence failure: {0}")]
    Persistence(DbError),
}

/// Everything one item produced: response entries, rows to persist, the
/// classification to store, and any per-method failures.
struct ItemOutcome {
    classification: SkuClassification,
    forecasts: Vec<ItemForecast>,
    rows: Vec<ForecastResultRow>,
    method_failures: Vec<ItemFailure>,
}

#[derive(Clone)]
pub struct ForecastService {
    db: Arc<DbPool>,
    registry: Arc<ModelRegistry>,
    config: ForecastingConfig,
}

impl ForecastService {
    pub fn new(db: Arc<DbPool>, registry: Arc<ModelRegistry>, config: ForecastingConfig) -> Self {
        Self {
            db,
            registry,
            config,
        }
    }

    /// Handle one generate-forecast request for a client.
    #[tracing::instrument(
        name = "forecast.generate",
        skip(self, request),
        fields(items = request.item_ids.len(), primary = %request.primary_model)
    )]
    pub async fn generate(
        &self,
        client_id: &str,
        request: GenerateForecastRequest,
    ) -> Result<GenerateForecastResponse, ForecastServiceError> {
        let training_end = request
            .training_end_date
            .unwrap_or_else(|| Utc::now().date_naive());

        // Open the run record unless this is a stateless (test bed) call,
        // in which case the id is synthesized purely for the response shape.
        let persisted_run = if request.skip_persistence {
            None
        } else {
            let run = self
                .db
                .runs()
                .create(CreateForecastRun {
                    client_id: client_id.to_string(),
                    user_id: request.user_id,
                    primary_model: request.primary_model.clone(),
                    include_baseline: request.include_baseline,
                    run_all_methods: request.run_all_methods,
                    prediction_length: request.prediction_length,
                    training_end_date: request.training_end_date,
                })
                .await?;
            self.db
                .runs()
                .set_status(run.run_id, RunStatus::Running)
                .await?;
            Some(run.run_id)
        };
        let run_id = persisted_run.unwrap_or_else(Uuid::new_v4);

        // ABC ranks span the client's whole catalog, so aggregate once.
        let revenue_shares = match self.revenue_shares(client_id, Some(training_end)).await {
            Ok(shares) => shares,
            Err(e) => {
                self.abandon_run(persisted_run).await;
                return Err(ForecastServiceError::Database(e));
            }
        };

        let mut items = Vec::new();
        let mut failures = Vec::new();
        let mut all_rows = Vec::new();
        let mut succeeded_items = 0usize;
        let per_item_budget = Duration::from_secs(self.config.per_item_timeout_secs);

        for item_id in &request.item_ids {
            let work = self.process_item(
                client_id,
                item_id,
                &request,
                training_end,
                run_id,
                &revenue_shares,
            );
            let outcome = match tokio::time::timeout(per_item_budget, work).await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(failure)) => {
                    tracing::warn!(
                        item_id = %item_id,
                        kind = failure.error.as_str(),
                        message = %failure.message,
                        "item failed"
                    );
                    failures.push(failure);
                    continue;
                }
                Err(_) => {
                    tracing::warn!(item_id = %item_id, "item timed out");
                    failures.push(ItemFailure {
                        item_id: item_id.clone(),
                        error: ItemFailureKind::ModelTimeout,
                        message: format!(
                            "item processing exceeded {}s budget",
                            self.config.per_item_timeout_secs
                        ),
                    });
                    continue;
                }
            };

            // Classification is a side effect of every persisted run, even
            // when every method for the item went on to fail.
            if !request.skip_persistence {
                if let Err(e) = self
                    .db
                    .classifications()
                    .upsert(client_id, item_id, &outcome.classification)
                    .await
                {
                    self.abandon_run(persisted_run).await;
                    return Err(ForecastServiceError::Persistence(e));
                }
            }

            if !outcome.forecasts.is_empty() {
                succeeded_items += 1;
            }
            failures.extend(outcome.method_failures);
            all_rows.extend(outcome.rows);
            items.extend(outcome.forecasts);
        }

        let status = if succeeded_items > 0 {
            RunStatus::Completed
        } else {
            RunStatus::Failed
        };

        if let Some(run_id) = persisted_run {
            if let Err(e) = self.commit_run(run_id, status, &all_rows).await {
                self.abandon_run(persisted_run).await;
                return Err(ForecastServiceError::Persistence(e));
            }
        }

        tracing::info!(
            run_id = %run_id,
            status = status.as_str(),
            items_ok = succeeded_items,
            items_failed = failures.len(),
            persisted = persisted_run.is_some(),
            "forecast run finished"
        );

        Ok(GenerateForecastResponse {
            forecast_run_id: run_id,
            status,
            items,
            failures,
        })
    }

    async fn commit_run(
        &self,
        run_id: Uuid,
        status: RunStatus,
        rows: &[ForecastResultRow],
    ) -> Result<(), DbError> {
        self.db.results().append_results(rows).await?;
        self.db.runs().set_status(run_id, status).await?;
        Ok(())
    }

    /// Mark an open run failed after a mid-run persistence problem. Best
    /// effort: the original error is what the caller reports.
    async fn abandon_run(&self, persisted_run: Option<Uuid>) {
        if let Some(run_id) = persisted_run {
            let _ = self.db.runs().set_status(run_id, RunStatus::Failed).await;
        }
    }

    /// Cumulative revenue share per item across the client's catalog.
    /// Items that never sold (or an all-zero catalog) land in class C.
    async fn revenue_shares(
        &self,
        client_id: &str,
        until: Option<NaiveDate>,
    ) -> Result<HashMap<String, f64>, DbError> {
        let revenues = self.db.sales().revenue_by_item(client_id, until).await?;
        let total: f64 = revenues.iter().map(|r| r.revenue).sum();

        let mut shares = HashMap::with_capacity(revenues.len());
        if total <= 0.0 {
            for item in revenues {
                shares.insert(item.item_id, 1.0);
            }
            return Ok(shares);
        }

        let mut running = 0.0;
        for item in revenues {
            running += item.revenue;
            shares.insert(item.item_id, running / total);
        }
        Ok(shares)
    }

    /// Validate, classify, and run every planned method for one item.
    /// Item-level problems (missing history, rejected series) are the error
    /// path; per-method problems are collected and the rest keep running.
    async fn process_item(
        &self,
        client_id: &str,
        item_id: &str,
        request: &GenerateForecastRequest,
        training_end: NaiveDate,
        run_id: Uuid,
        revenue_shares: &HashMap<String, f64>,
    ) -> Result<ItemOutcome, ItemFailure> {
        let fail = |error: ItemFailureKind, message: String| ItemFailure {
            item_id: item_id.to_string(),
            error,
            message,
        };

        let raw_rows = self
            .db
            .sales()
            .fetch_history(client_id, item_id, Some(training_end))
            .await
            .map_err(|e| {
                fail(
                    ItemFailureKind::NotFound,
                    format!("failed to fetch sales history: {e}"),
                )
            })?;
        if raw_rows.is_empty() {
            return Err(fail(
                ItemFailureKind::NotFound,
                "no sales history for item".to_string(),
            ));
        }

        let (series, report) = validate_series(&raw_rows, &self.config.validator_options())
            .map_err(|e| {
                tracing::debug!(item_id = %item_id, report = ?e.report(), "series rejected");
                match e {
                    ValidationError::InsufficientHistory { .. } => {
                        fail(ItemFailureKind::InsufficientHistory, e.to_string())
                    }
                    ValidationError::InvalidSeries { .. } => {
                        fail(ItemFailureKind::InvalidSeries, e.to_string())
                    }
                }
            })?;
        if !report.warnings.is_empty() {
            tracing::debug!(
                item_id = %item_id,
                warnings = ?report.warnings,
                "series normalized with warnings"
            );
        }

        let revenue_share = revenue_shares.get(item_id).copied().unwrap_or(1.0);
        let classification = classify_sku(&series, revenue_share);

        let plan = self.registry.plan(
            &request.primary_model,
            request.include_baseline,
            request.run_all_methods,
            &classification.recommended_method,
        );

        // Routing warnings are request-scoped: surfaced on the response,
        // never written into the stored classification.
        let mut response_classification = classification.clone();
        response_classification
            .warnings
            .extend(plan.warnings.iter().cloned());

        let horizon = request.prediction_length as usize;
        let mut forecasts = Vec::new();
        let mut rows = Vec::new();
        let mut method_failures = Vec::new();

        for method_id in &plan.methods {
            let Some(mut model) = self.registry.create(method_id) else {
                method_failures.push(fail(
                    ItemFailureKind::UnknownMethod,
                    format!("method '{method_id}' is not registered"),
                ));
                continue;
            };

            if let Err(e) = model.fit(&series) {
                method_failures.push(fail(
                    ItemFailureKind::ModelFitFailure,
                    format!("{method_id}: {e}"),
                ));
                continue;
            }

            let predictions = match model.predict(horizon, training_end).await {
                Ok(predictions) => sanitize_predictions(predictions),
                Err(e) => {
                    let kind = match e {
                        ModelError::NotFitted | ModelError::InsufficientData { .. } => {
                            ItemFailureKind::ModelFitFailure
                        }
                        _ => ItemFailureKind::ModelPredictFailure,
                    };
                    method_failures.push(fail(kind, format!("{method_id}: {e}")));
                    continue;
                }
            };

            let mut prediction_out = Vec::with_capacity(predictions.len());
            for prediction in &predictions {
                let q = prediction.quantiles;
                rows.push(ForecastResultRow {
                    run_id,
                    item_id: item_id.to_string(),
                    method: method_id.clone(),
                    forecast_date: prediction.date,
                    point_forecast: prediction.point,
                    p10: Some(q.p10),
                    p50: Some(q.p50),
                    p90: Some(q.p90),
                    actual_value: None,
                });
                prediction_out.push(PredictionOut {
                    date: prediction.date,
                    point_forecast: prediction.point,
                    quantiles: QuantilesOut {
                        p10: q.p10,
                        p50: q.p50,
                        p90: q.p90,
                    },
                });
            }

            forecasts.push(ItemForecast {
                item_id: item_id.to_string(),
                classification: response_classification.clone(),
                method_used: method_id.clone(),
                predictions: prediction_out,
            });
        }

        Ok(ItemOutcome {
            classification,
            forecasts,
            rows,
            method_failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use sqlx::SqlitePool;
    use wiremock::matchers::{method as http_method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::db::sqlite::create_test_pool;
    use crate::forecasting::{ChronosPipeline, method};

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    async fn seed_history(
        pool: &SqlitePool,
        client_id: &str,
        item_id: &str,
        start: &str,
        values: &[f64],
    ) {
        let start = day(start);
        for (i, value) in values.iter().enumerate() {
            let date = start + ChronoDuration::days(i as i64);
            sqlx::query(
                "INSERT INTO daily_sales (client_id, item_id, sale_date, units_sold) \
                 VALUES (?, ?, ?, ?)",
            )
            .bind(client_id)
            .bind(item_id)
            .bind(date.format("%Y-%m-%d").to_string())
            .bind(*value)
            .execute(pool)
            .await
            .unwrap();
        }
    }

    fn service_with(
        pool: SqlitePool,
        chronos_endpoint: String,
        config: ForecastingConfig,
    ) -> ForecastService {
        let pipeline = Arc::new(ChronosPipeline::new(
            reqwest::Client::new(),
            chronos_endpoint,
            Duration::from_secs(5),
        ));
        let registry = Arc::new(ModelRegistry::new(
            config.croston_alpha,
            config.min_max_floor,
            config.min_max_ceiling,
            pipeline,
        ));
        ForecastService::new(Arc::new(DbPool::from_sqlite(pool)), registry, config)
    }

    async fn mock_chronos(horizon: usize) -> MockServer {
        let server = MockServer::start().await;
        let per_level: Vec<Vec<f64>> = vec![
            vec![40.0; horizon],
            vec![50.0; horizon],
            vec![60.0; horizon],
        ];
        Mock::given(http_method("POST"))
            .and(path("/forecast"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "quantiles": per_level })),
            )
            .mount(&server)
            .await;
        server
    }

    fn request(item_ids: &[&str], primary: &str) -> GenerateForecastRequest {
        GenerateForecastRequest {
            item_ids: item_ids.iter().map(|s| s.to_string()).collect(),
            prediction_length: 7,
            primary_model: primary.to_string(),
            include_baseline: false,
            run_all_methods: false,
            skip_persistence: false,
            training_end_date: Some(day("2025-06-30")),
            user_id: None,
        }
    }

    async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_persisted_run_completes_and_orders_rows() {
        let pool = create_test_pool().await;
        seed_history(&pool, "acme", "sku-1", "2025-05-01", &[5.0; 61]).await;
        let service = service_with(
            pool.clone(),
            "http://127.0.0.1:9/unused".to_string(),
            ForecastingConfig::default(),
        );

        let response = service
            .generate("acme", request(&["sku-1"], method::MA7))
            .await
            .unwrap();

        assert_eq!(response.status, RunStatus::Completed);
        assert!(response.failures.is_empty());
        assert_eq!(response.items.len(), 1);
        let item = &response.items[0];
        assert_eq!(item.method_used, method::MA7);
        assert_eq!(item.predictions.len(), 7);
        // Consecutive days starting the day after training_end.
        assert_eq!(item.predictions[0].date, day("2025-07-01"));
        assert_eq!(item.predictions[6].date, day("2025-07-07"));

        // Persisted: run row terminal, 7 result rows, classification stored.
        assert_eq!(count_rows(&pool, "forecast_runs").await, 1);
        assert_eq!(count_rows(&pool, "forecast_results").await, 7);
        assert_eq!(count_rows(&pool, "sku_classifications").await, 1);

        let status: String = sqlx::query_scalar("SELECT status FROM forecast_runs")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(status, "completed");
    }

    #[tokio::test]
    async fn test_insufficient_history_isolates_item() {
        let pool = create_test_pool().await;
        seed_history(&pool, "acme", "sku-good", "2025-05-01", &[5.0; 61]).await;
        seed_history(&pool, "acme", "sku-short", "2025-06-20", &[5.0; 10]).await;
        let service = service_with(
            pool.clone(),
            "http://127.0.0.1:9/unused".to_string(),
            ForecastingConfig::default(),
        );

        let response = service
            .generate("acme", request(&["sku-short", "sku-good"], method::MA7))
            .await
            .unwrap();

        // The short item fails with the right kind; the run still completes
        // because its sibling succeeded.
        assert_eq!(response.status, RunStatus::Completed);
        assert_eq!(response.failures.len(), 1);
        assert_eq!(response.failures[0].item_id, "sku-short");
        assert_eq!(
            response.failures[0].error,
            ItemFailureKind::InsufficientHistory
        );
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].item_id, "sku-good");
    }

    #[tokio::test]
    async fn test_unknown_item_fails_run_when_alone() {
        let pool = create_test_pool().await;
        let service = service_with(
            pool.clone(),
            "http://127.0.0.1:9/unused".to_string(),
            ForecastingConfig::default(),
        );

        let response = service
            .generate("acme", request(&["ghost"], method::MA7))
            .await
            .unwrap();

        assert_eq!(response.status, RunStatus::Failed);
        assert_eq!(response.failures[0].error, ItemFailureKind::NotFound);
        assert!(response.items.is_empty());
        assert_eq!(count_rows(&pool, "forecast_results").await, 0);

        let status: String = sqlx::query_scalar("SELECT status FROM forecast_runs")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(status, "failed");
    }

    #[tokio::test]
    async fn test_test_bed_mode_runs_all_methods_without_writes() {
        let pool = create_test_pool().await;
        // Enough history for everything, intermittent so croston is happy.
        let values: Vec<f64> = (0..120)
            .map(|i| if i % 3 == 0 { 6.0 } else { 0.0 })
            .collect();
        seed_history(&pool, "acme", "sku-1", "2025-03-03", &values).await;

        let server = mock_chronos(7).await;
        let service = service_with(
            pool.clone(),
            format!("{}/forecast", server.uri()),
            ForecastingConfig::default(),
        );

        let mut req = request(&["sku-1"], method::CHRONOS2);
        req.run_all_methods = true;
        req.skip_persistence = true;
        let response = service.generate("acme", req).await.unwrap();

        assert_eq!(response.status, RunStatus::Completed);
        // One entry per (item, method), in the stable registry order.
        let methods: Vec<&str> = response
            .items
            .iter()
            .map(|i| i.method_used.as_str())
            .collect();
        assert_eq!(methods, method::ALL.to_vec());
        for item in &response.items {
            assert_eq!(item.predictions.len(), 7);
            assert_eq!(item.predictions[0].date, day("2025-07-01"));
            assert!(item.predictions.iter().all(|p| p.point_forecast >= 0.0));
        }

        // Nothing persisted, not even classifications.
        assert_eq!(count_rows(&pool, "forecast_runs").await, 0);
        assert_eq!(count_rows(&pool, "forecast_results").await, 0);
        assert_eq!(count_rows(&pool, "sku_classifications").await, 0);
    }

    #[tokio::test]
    async fn test_requested_method_honored_over_recommendation() {
        let pool = create_test_pool().await;
        // Lumpy history: half zeros, wild sizes.
        let values: Vec<f64> = (0..200)
            .map(|i| {
                if i % 2 == 0 {
                    0.0
                } else if i % 6 == 1 {
                    200.0
                } else {
                    2.0
                }
            })
            .collect();
        seed_history(&pool, "acme", "sku-lumpy", "2024-12-13", &values).await;

        let server = mock_chronos(7).await;
        let service = service_with(
            pool.clone(),
            format!("{}/forecast", server.uri()),
            ForecastingConfig::default(),
        );

        let response = service
            .generate("acme", request(&["sku-lumpy"], method::CHRONOS2))
            .await
            .unwrap();

        // The engine runs what was asked for; the classification still says
        // what it would have picked.
        let item = &response.items[0];
        assert_eq!(item.method_used, method::CHRONOS2);
        assert_eq!(item.classification.recommended_method, method::SBA);
    }

    #[tokio::test]
    async fn test_unknown_primary_falls_back_to_recommended() {
        let pool = create_test_pool().await;
        seed_history(&pool, "acme", "sku-1", "2025-05-01", &[5.0; 61]).await;
        let service = service_with(
            pool.clone(),
            "http://127.0.0.1:9/unused".to_string(),
            ForecastingConfig::default(),
        );

        // Steady C-class single-item catalog: recommendation is MA7, so the
        // fallback stays offline-friendly.
        let mut req = request(&["sku-1"], "prophet");
        req.include_baseline = false;
        let response = service.generate("acme", req).await.unwrap();

        let item = &response.items[0];
        assert_eq!(item.method_used, method::MA7);
        assert!(
            item.classification
                .warnings
                .iter()
                .any(|w| w.contains("prophet"))
        );
    }

    #[tokio::test]
    async fn test_baseline_appended_when_requested() {
        let pool = create_test_pool().await;
        let values: Vec<f64> = (0..90)
            .map(|i| if i % 3 == 0 { 6.0 } else { 0.0 })
            .collect();
        seed_history(&pool, "acme", "sku-1", "2025-04-02", &values).await;
        let service = service_with(
            pool.clone(),
            "http://127.0.0.1:9/unused".to_string(),
            ForecastingConfig::default(),
        );

        let mut req = request(&["sku-1"], method::SBA);
        req.include_baseline = true;
        let response = service.generate("acme", req).await.unwrap();

        let methods: Vec<&str> = response
            .items
            .iter()
            .map(|i| i.method_used.as_str())
            .collect();
        assert_eq!(methods, vec![method::SBA, method::MA7]);
        assert_eq!(count_rows(&pool, "forecast_results").await, 14);
    }

    #[tokio::test]
    async fn test_per_item_timeout_is_a_model_timeout_failure() {
        let pool = create_test_pool().await;
        seed_history(&pool, "acme", "sku-1", "2025-05-01", &[5.0; 61]).await;

        // Chronos answers slower than the per-item budget allows.
        let server = MockServer::start().await;
        let per_level: Vec<Vec<f64>> = vec![vec![1.0; 7], vec![2.0; 7], vec![3.0; 7]];
        Mock::given(http_method("POST"))
            .and(path("/forecast"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "quantiles": per_level }))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let config = ForecastingConfig {
            per_item_timeout_secs: 1,
            ..Default::default()
        };
        let service = service_with(pool.clone(), format!("{}/forecast", server.uri()), config);

        let response = service
            .generate("acme", request(&["sku-1"], method::CHRONOS2))
            .await
            .unwrap();

        assert_eq!(response.status, RunStatus::Failed);
        assert_eq!(response.failures.len(), 1);
        assert_eq!(response.failures[0].error, ItemFailureKind::ModelTimeout);
    }

    #[tokio::test]
    async fn test_chronos_predict_failure_recorded_per_method() {
        let pool = create_test_pool().await;
        seed_history(&pool, "acme", "sku-1", "2025-05-01", &[5.0; 61]).await;

        let server = MockServer::start().await;
        Mock::given(http_method("POST"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let service = service_with(
            pool.clone(),
            format!("{}/forecast", server.uri()),
            ForecastingConfig::default(),
        );

        // Baseline on: chronos fails, MA7 still succeeds, run completes.
        let mut req = request(&["sku-1"], method::CHRONOS2);
        req.include_baseline = true;
        let response = service.generate("acme", req).await.unwrap();

        assert_eq!(response.status, RunStatus::Completed);
        assert_eq!(response.failures.len(), 1);
        assert_eq!(
            response.failures[0].error,
            ItemFailureKind::ModelPredictFailure
        );
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].method_used, method::MA7);
    }

    #[tokio::test]
    async fn test_revenue_shares_are_cumulative_descending() {
        let pool = create_test_pool().await;
        // Revenue split 60/30/10: cumulative shares 0.6, 0.9, 1.0.
        seed_history(&pool, "acme", "sku-top", "2025-05-01", &[60.0; 40]).await;
        seed_history(&pool, "acme", "sku-mid", "2025-05-01", &[30.0; 40]).await;
        seed_history(&pool, "acme", "sku-low", "2025-05-01", &[10.0; 40]).await;
        let service = service_with(
            pool.clone(),
            "http://127.0.0.1:9/unused".to_string(),
            ForecastingConfig::default(),
        );

        let shares = service
            .revenue_shares("acme", Some(day("2025-06-30")))
            .await
            .unwrap();

        assert!((shares["sku-top"] - 0.6).abs() < 1e-9);
        assert!((shares["sku-mid"] - 0.9).abs() < 1e-9);
        assert!((shares["sku-low"] - 1.0).abs() < 1e-9);
    }
}
