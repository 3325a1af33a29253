use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::contract::model::{Cart, Coupon};

/// Outcome of setting a line's quantity.
#[derive(Debug, Clone)]
pub enum ItemUpdate {
    Updated(Cart),
    CartMissing,
    ItemMissing,
}

/// Persistence port for carts.
///
/// Every mutating call writes the line and the recomputed total in one store
/// transaction; the total is summed from the items visible inside that
/// transaction. Returned carts carry items without product data.
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Load a user's cart with its items.
    async fn find_by_user(&self, user_id: Uuid) -> anyhow::Result<Option<Cart>>;

    /// Owner of the cart that holds `item_id`.
    async fn find_item_owner(&self, item_id: Uuid) -> anyhow::Result<Option<Uuid>>;

    /// Find-or-create the user's cart, then add `quantity` of the product at
    /// `unit_price` (accumulating onto an existing line and refreshing its price).
    async fn add_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        unit_price: Decimal,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Cart>;

    /// Set the absolute quantity of the user's line for `product_id`.
    async fn set_item_quantity(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        now: DateTime<Utc>,
    ) -> anyhow::Result<ItemUpdate>;

    /// Delete a line by id. `None` when no such line exists (nothing changes).
    async fn remove_item(&self, item_id: Uuid, now: DateTime<Utc>)
        -> anyhow::Result<Option<Cart>>;
}

/// Persistence port for coupons.
#[async_trait]
pub trait CouponRepository: Send + Sync {
    /// Insert a fully-formed coupon and return the stored row.
    /// Returns `None` when the code is already taken.
    async fn insert(&self, coupon: Coupon) -> anyhow::Result<Option<Coupon>>;

    async fn find_by_code(&self, code: &str) -> anyhow::Result<Option<Coupon>>;

    async fn list(&self) -> anyhow::Result<Vec<Coupon>>;

    /// Delete by id. Returns true if a row was deleted.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}
