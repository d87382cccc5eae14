use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{CreateForecastRun, ForecastRun, RunStatus},
};

#[async_trait]
pub trait ForecastRunRepo: Send + Sync {
    /// Open a new run record in `pending` status.
    async fn create(&self, input: CreateForecastRun) -> DbResult<ForecastRun>;

    async fn set_status(&self, run_id: Uuid, status: RunStatus) -> DbResult<()>;

    async fn get_by_id(&self, run_id: Uuid) -> DbResult<Option<ForecastRun>>;
}
