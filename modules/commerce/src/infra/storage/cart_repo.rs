//! SeaORM-backed cart repository.
//!
//! Each mutation is one transaction whose first statement writes the cart
//! row (`updated_at`). That write takes the row lock on PostgreSQL and the
//! database write lock on SQLite, so the line change and the recomputed
//! total commit together and concurrent writers to the same cart queue up.

use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, OnConflict, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::contract::model::Cart;
use crate::domain::pricing::cart_total;
use crate::domain::repo::{CartRepository, ItemUpdate};
use crate::infra::storage::entity::{cart, cart_item};
use crate::infra::storage::mapper::{cart_from_rows, money};

pub struct SeaOrmCartRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmCartRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

/// Bump `updated_at` on the user's cart. False when the user has no cart.
async fn touch_cart<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> anyhow::Result<bool> {
    let res = cart::Entity::update_many()
        .col_expr(cart::Column::UpdatedAt, Expr::value(now))
        .filter(cart::Column::UserId.eq(user_id))
        .exec(conn)
        .await
        .context("touch cart failed")?;
    Ok(res.rows_affected > 0)
}

async fn find_cart<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> anyhow::Result<Option<cart::Model>> {
    cart::Entity::find()
        .filter(cart::Column::UserId.eq(user_id))
        .one(conn)
        .await
        .context("find cart failed")
}

async fn find_line<C: ConnectionTrait>(
    conn: &C,
    cart_id: Uuid,
    product_id: Uuid,
) -> anyhow::Result<Option<cart_item::Model>> {
    cart_item::Entity::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .one(conn)
        .await
        .context("find cart line failed")
}

async fn load_items<C: ConnectionTrait>(conn: &C, cart_id: Uuid) -> anyhow::Result<Vec<cart_item::Model>> {
    cart_item::Entity::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .order_by_asc(cart_item::Column::CreatedAt)
        .order_by_asc(cart_item::Column::Id)
        .all(conn)
        .await
        .context("load cart lines failed")
}

/// Re-sum the lines visible in `conn` and store the result as the cart total.
async fn recompute_total<C: ConnectionTrait>(
    conn: &C,
    cart: cart::Model,
    now: DateTime<Utc>,
) -> anyhow::Result<Cart> {
    let items = load_items(conn, cart.id).await?;
    let total = cart_total(items.iter().map(|i| (i.quantity, money(i.price))))
        .context("cart total out of range")?;

    let mut am: cart::ActiveModel = cart.into();
    am.total = Set(total);
    am.updated_at = Set(now);
    let cart = am.update(conn).await.context("update cart total failed")?;

    Ok(cart_from_rows(cart, items))
}

#[async_trait::async_trait]
impl<C> CartRepository for SeaOrmCartRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn find_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<Cart>> {
        let mut rows = cart::Entity::find()
            .filter(cart::Column::UserId.eq(user_id))
            .find_with_related(cart_item::Entity)
            .order_by_asc(cart_item::Column::CreatedAt)
            .order_by_asc(cart_item::Column::Id)
            .all(&self.conn)
            .await
            .context("find_by_user failed")?;
        Ok(rows.pop().map(|(cart, items)| cart_from_rows(cart, items)))
    }

    async fn find_item_owner(&self, item_id: Uuid) -> anyhow::Result<Option<Uuid>> {
        let owner = cart::Entity::find()
            .inner_join(cart_item::Entity)
            .filter(cart_item::Column::Id.eq(item_id))
            .one(&self.conn)
            .await
            .context("find_item_owner failed")?;
        Ok(owner.map(|c| c.user_id))
    }

    async fn add_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        unit_price: Decimal,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Cart> {
        let txn = self.conn.begin().await.context("begin add_item failed")?;

        let fresh = cart::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            total: Set(Decimal::ZERO),
            created_at: Set(now),
            updated_at: Set(now),
        };
        cart::Entity::insert(fresh)
            .on_conflict(
                OnConflict::column(cart::Column::UserId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .context("create cart failed")?;
        // An existing cart is not locked by the no-op insert.
        touch_cart(&txn, user_id, now).await?;
        let cart = find_cart(&txn, user_id)
            .await?
            .ok_or_else(|| anyhow!("cart for user {user_id} missing after create"))?;

        match find_line(&txn, cart.id, product_id).await? {
            Some(line) => {
                let quantity = line.quantity.saturating_add(quantity);
                let mut am: cart_item::ActiveModel = line.into();
                am.quantity = Set(quantity);
                am.price = Set(unit_price);
                am.updated_at = Set(now);
                am.update(&txn).await.context("update cart line failed")?;
            }
            None => {
                let am = cart_item::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    cart_id: Set(cart.id),
                    product_id: Set(product_id),
                    quantity: Set(quantity),
                    price: Set(unit_price),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                am.insert(&txn).await.context("insert cart line failed")?;
            }
        }

        let cart = recompute_total(&txn, cart, now).await?;
        txn.commit().await.context("commit add_item failed")?;
        Ok(cart)
    }

    async fn set_item_quantity(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        now: DateTime<Utc>,
    ) -> anyhow::Result<ItemUpdate> {
        let txn = self
            .conn
            .begin()
            .await
            .context("begin set_item_quantity failed")?;

        if !touch_cart(&txn, user_id, now).await? {
            return Ok(ItemUpdate::CartMissing);
        }
        let Some(cart) = find_cart(&txn, user_id).await? else {
            return Ok(ItemUpdate::CartMissing);
        };
        let Some(line) = find_line(&txn, cart.id, product_id).await? else {
            return Ok(ItemUpdate::ItemMissing);
        };

        let mut am: cart_item::ActiveModel = line.into();
        am.quantity = Set(quantity);
        am.updated_at = Set(now);
        am.update(&txn).await.context("update cart line failed")?;

        let cart = recompute_total(&txn, cart, now).await?;
        txn.commit()
            .await
            .context("commit set_item_quantity failed")?;
        Ok(ItemUpdate::Updated(cart))
    }

    async fn remove_item(&self, item_id: Uuid, now: DateTime<Utc>) -> anyhow::Result<Option<Cart>> {
        let txn = self.conn.begin().await.context("begin remove_item failed")?;

        let owning_cart = Query::select()
            .column(cart_item::Column::CartId)
            .from(cart_item::Entity)
            .and_where(cart_item::Column::Id.eq(item_id))
            .to_owned();
        let touched = cart::Entity::update_many()
            .col_expr(cart::Column::UpdatedAt, Expr::value(now))
            .filter(cart::Column::Id.in_subquery(owning_cart))
            .exec(&txn)
            .await
            .context("touch cart failed")?;
        if touched.rows_affected == 0 {
            return Ok(None);
        }

        let Some(line) = cart_item::Entity::find_by_id(item_id)
            .one(&txn)
            .await
            .context("find cart line failed")?
        else {
            return Ok(None);
        };
        let cart = cart::Entity::find_by_id(line.cart_id)
            .one(&txn)
            .await
            .context("find cart failed")?
            .ok_or_else(|| anyhow!("cart {} missing for line {item_id}", line.cart_id))?;

        cart_item::Entity::delete_by_id(item_id)
            .exec(&txn)
            .await
            .context("delete cart line failed")?;

        let cart = recompute_total(&txn, cart, now).await?;
        txn.commit().await.context("commit remove_item failed")?;
        Ok(Some(cart))
    }
}
