mod error;
pub mod forecasts;
pub mod health;
pub mod items;

use axum::{
    Router,
    routing::{get, post},
};
pub use error::{ApiError, ErrorResponse};
use http::HeaderMap;

use crate::AppState;

/// Header carrying the tenant scope. Tenant management itself lives
/// upstream; this service only needs the id.
pub const CLIENT_ID_HEADER: &str = "x-client-id";

const DEFAULT_CLIENT_ID: &str = "default";

pub fn client_id_from_headers(headers: &HeaderMap) -> String {
    headers
        .get(CLIENT_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_CLIENT_ID)
        .to_string()
}

/// API routes, nested under `/api/v1` by the caller.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/forecasts", post(forecasts::generate_forecast))
        .route(
            "/forecasts/{run_id}/results/{method}",
            get(forecasts::get_results),
        )
        .route("/models", get(forecasts::list_models))
        .route("/items/{item_id}/actuals", post(items::backfill_actuals))
        .route("/items/{item_id}/quality", get(items::get_quality))
}
