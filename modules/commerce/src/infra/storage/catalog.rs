//! Product catalog over the local `products` table.

use anyhow::Context;
use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::contract::model::Product;
use crate::domain::ports::ProductCatalog;
use crate::infra::storage::entity::product::{ActiveModel as ProductAM, Column, Entity as ProductEntity};

pub struct SeaOrmProductCatalog<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmProductCatalog<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }

    /// Insert products, overwriting name and price of ids already present.
    pub async fn upsert(&self, products: &[Product]) -> anyhow::Result<()> {
        if products.is_empty() {
            return Ok(());
        }
        let models = products.iter().map(|p| ProductAM {
            id: Set(p.id),
            name: Set(p.name.clone()),
            price: Set(p.price),
        });
        ProductEntity::insert_many(models)
            .on_conflict(
                OnConflict::column(Column::Id)
                    .update_columns([Column::Name, Column::Price])
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("upsert products failed")?;
        Ok(())
    }
}

#[async_trait]
impl<C> ProductCatalog for SeaOrmProductCatalog<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Product>> {
        let found = ProductEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find product failed")?;
        Ok(found.map(Into::into))
    }

    async fn find_many(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = ProductEntity::find()
            .filter(Column::Id.is_in(ids.iter().copied()))
            .all(&self.conn)
            .await
            .context("find products failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
