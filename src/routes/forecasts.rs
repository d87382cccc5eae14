//! Forecast generation and result retrieval.

use axum::{
    Json,
    extract::{Path, State},
};
use http::HeaderMap;
use uuid::Uuid;
use validator::Validate;

use super::{client_id_from_headers, error::ApiError};
use crate::{
    AppState,
    forecasting::ModelInfo,
    models::{ForecastResultRow, GenerateForecastRequest, GenerateForecastResponse},
};

/// `POST /api/v1/forecasts`
///
/// Runs the full orchestration for the requested items. The client scope
/// comes from the `X-Client-Id` header.
#[tracing::instrument(name = "forecasts.generate", skip(state, headers, request))]
pub async fn generate_forecast(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<GenerateForecastRequest>,
) -> Result<Json<GenerateForecastResponse>, ApiError> {
    request.validate()?;
    let client_id = client_id_from_headers(&headers);

    let response = state.services.forecasts.generate(&client_id, request).await?;
    Ok(Json(response))
}

/// `GET /api/v1/forecasts/{run_id}/results/{method}`
///
/// Result rows for one run and method, ordered by (item_id, forecast_date).
#[tracing::instrument(name = "forecasts.results", skip(state))]
pub async fn get_results(
    State(state): State<AppState>,
    Path((run_id, method)): Path<(Uuid, String)>,
) -> Result<Json<Vec<ForecastResultRow>>, ApiError> {
    let run = state.db.runs().get_by_id(run_id).await?;
    if run.is_none() {
        return Err(ApiError::NotFound(format!("No forecast run {run_id}")));
    }

    let rows = state.db.results().list_by_run_and_method(run_id, &method).await?;
    Ok(Json(rows))
}

/// `GET /api/v1/models`
///
/// Registered methods and their capabilities.
pub async fn list_models(State(state): State<AppState>) -> Json<Vec<ModelInfo>> {
    Json(state.registry.list_models())
}
