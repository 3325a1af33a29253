use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::model::Product;

/// Read-only product lookup ("exists + current price").
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Product>>;

    /// Products for the given ids; unknown ids are skipped.
    async fn find_many(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Product>>;
}
