use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::contract::model::{AppliedCoupon, Cart, CartItem, Coupon, NewCoupon, Product};

/// Only percentage coupons exist today.
pub const DISCOUNT_TYPE_PERCENT: &str = "percent";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductDto {
    pub id: Uuid,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartItemDto {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Unit price snapshot.
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub product: Option<ProductDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartDto {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub total: Decimal,
    pub items: Vec<CartItemDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /cart/add`. A missing or non-positive quantity adds one unit.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddItemReq {
    #[serde(alias = "productId")]
    pub product_id: Uuid,
    #[serde(default)]
    pub quantity: i32,
}

/// Body of `PUT /cart`: absolute quantity for an existing line.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateItemReq {
    #[serde(alias = "productId")]
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApplyCouponReq {
    pub code: String,
    #[serde(alias = "cartTotal", with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub cart_total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AppliedCouponDto {
    pub code: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub original: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub discounted: Decimal,
    pub discount_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CouponDto {
    pub id: Uuid,
    pub code: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub discount_percent: Decimal,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub usage_limit: i32,
    pub times_used: i32,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub min_cart_value: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateCouponReq {
    pub code: String,
    #[serde(
        alias = "discount",
        alias = "discountPercent",
        with = "rust_decimal::serde::float"
    )]
    #[schema(value_type = f64)]
    pub discount_percent: Decimal,
    #[serde(alias = "expiry_date", alias = "expiryDate", alias = "expiresAt")]
    pub expires_at: DateTime<Utc>,
    #[serde(alias = "usageLimit")]
    pub usage_limit: i32,
    #[serde(default, alias = "timesUsed")]
    pub times_used: Option<i32>,
    #[serde(
        default,
        alias = "minCartValue",
        with = "rust_decimal::serde::float"
    )]
    #[schema(value_type = f64)]
    pub min_cart_value: Decimal,
}

// Conversion implementations between REST DTOs and contract models

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            price: p.price,
        }
    }
}

impl From<CartItem> for CartItemDto {
    fn from(item: CartItem) -> Self {
        Self {
            id: item.id,
            cart_id: item.cart_id,
            product_id: item.product_id,
            quantity: item.quantity,
            price: item.price,
            product: item.product.map(ProductDto::from),
        }
    }
}

impl From<Cart> for CartDto {
    fn from(cart: Cart) -> Self {
        Self {
            id: cart.id,
            user_id: cart.user_id,
            total: cart.total,
            items: cart.items.into_iter().map(CartItemDto::from).collect(),
            created_at: cart.created_at,
            updated_at: cart.updated_at,
        }
    }
}

impl From<Coupon> for CouponDto {
    fn from(c: Coupon) -> Self {
        Self {
            id: c.id,
            code: c.code,
            discount_percent: c.discount_percent,
            created_at: c.created_at,
            expires_at: c.expires_at,
            usage_limit: c.usage_limit,
            times_used: c.times_used,
            min_cart_value: c.min_cart_value,
        }
    }
}

impl From<CreateCouponReq> for NewCoupon {
    fn from(req: CreateCouponReq) -> Self {
        Self {
            code: req.code,
            discount_percent: req.discount_percent,
            expires_at: req.expires_at,
            usage_limit: req.usage_limit,
            times_used: req.times_used,
            min_cart_value: req.min_cart_value,
        }
    }
}

impl From<AppliedCoupon> for AppliedCouponDto {
    fn from(a: AppliedCoupon) -> Self {
        Self {
            code: a.code,
            original: a.original,
            discounted: a.discounted,
            discount_type: DISCOUNT_TYPE_PERCENT.to_string(),
        }
    }
}
