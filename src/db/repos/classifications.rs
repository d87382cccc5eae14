use async_trait::async_trait;

use crate::{db::error::DbResult, models::SkuClassification};

#[async_trait]
pub trait SkuClassificationRepo: Send + Sync {
    /// Insert or replace the classification row for (client, item).
    /// Rewritten as a side effect of every persisted run so the stored row
    /// always reflects the latest training window.
    async fn upsert(
        &self,
        client_id: &str,
        item_id: &str,
        classification: &SkuClassification,
    ) -> DbResult<()>;

    async fn get(&self, client_id: &str, item_id: &str)
    -> DbResult<Option<SkuClassification>>;
}
