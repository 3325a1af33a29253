use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Catalog entry as seen by the cart; read-only here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
}

/// A user's cart. `total` always equals the sum of `quantity * price` over `items`.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total: Decimal,
    pub items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Unit price captured when the line was added or last re-added.
    pub price: Decimal,
    /// Populated on reads that return a whole cart.
    pub product: Option<Product>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    pub discount_percent: Decimal,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub usage_limit: i32,
    pub times_used: i32,
    pub min_cart_value: Decimal,
}

/// Data for creating a coupon; id and creation time are assigned by the service.
#[derive(Debug, Clone)]
pub struct NewCoupon {
    pub code: String,
    pub discount_percent: Decimal,
    pub expires_at: DateTime<Utc>,
    pub usage_limit: i32,
    pub times_used: Option<i32>,
    pub min_cart_value: Decimal,
}

/// Result of a successful coupon application.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedCoupon {
    pub code: String,
    pub original: Decimal,
    pub discounted: Decimal,
}
