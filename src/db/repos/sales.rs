use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{db::error::DbResult, models::RawSalesRow};

/// Aggregate revenue for one item over the training window, used for ABC
/// ranking across a client's catalog.
#[derive(Debug, Clone)]
pub struct ItemRevenue {
    pub item_id: String,
    pub revenue: f64,
}

/// Read-only boundary to the ingestion-owned sales history.
///
/// This service never writes `daily_sales`; ingestion owns the table and
/// makes no cleanliness promises, which is why history comes back as raw
/// rows for the validator.
#[async_trait]
pub trait SalesHistoryRepo: Send + Sync {
    /// Raw rows for one item, ascending by date, up to and including
    /// `until` (all history when None).
    async fn fetch_history(
        &self,
        client_id: &str,
        item_id: &str,
        until: Option<NaiveDate>,
    ) -> DbResult<Vec<RawSalesRow>>;

    /// Total revenue per item across the client, descending by revenue.
    /// Items without a revenue figure fall back to unit counts.
    async fn revenue_by_item(
        &self,
        client_id: &str,
        until: Option<NaiveDate>,
    ) -> DbResult<Vec<ItemRevenue>>;
}
