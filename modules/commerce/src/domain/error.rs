use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Quantity must be at least 1 (got {quantity})")]
    InvalidQuantity { quantity: i32 },

    #[error("Coupon code '{code}' is already in use")]
    DuplicateCouponCode { code: String },

    #[error("Product not found: {id}")]
    ProductNotFound { id: Uuid },

    #[error("No cart for user {user_id}")]
    CartNotFound { user_id: Uuid },

    #[error("Cart item not found: {detail}")]
    CartItemNotFound { detail: String },

    #[error("Coupon not found: '{code}'")]
    CouponNotFound { code: String },

    #[error("Coupon not found: {id}")]
    CouponIdNotFound { id: Uuid },

    #[error("Coupon '{code}' expired at {expired_at}")]
    CouponExpired {
        code: String,
        expired_at: DateTime<Utc>,
    },

    #[error("Coupon '{code}' reached its usage limit of {limit}")]
    CouponUsageExceeded { code: String, limit: i32 },

    #[error("Cart total {total} is below the coupon minimum of {minimum}")]
    BelowMinimum { total: Decimal, minimum: Decimal },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_quantity(quantity: i32) -> Self {
        Self::InvalidQuantity { quantity }
    }

    pub fn duplicate_coupon_code(code: impl Into<String>) -> Self {
        Self::DuplicateCouponCode { code: code.into() }
    }

    pub fn product_not_found(id: Uuid) -> Self {
        Self::ProductNotFound { id }
    }

    pub fn cart_not_found(user_id: Uuid) -> Self {
        Self::CartNotFound { user_id }
    }

    pub fn item_not_found_by_id(id: Uuid) -> Self {
        Self::CartItemNotFound {
            detail: format!("id {id}"),
        }
    }

    pub fn item_not_found_for_product(product_id: Uuid) -> Self {
        Self::CartItemNotFound {
            detail: format!("no line for product {product_id}"),
        }
    }

    pub fn coupon_not_found(code: impl Into<String>) -> Self {
        Self::CouponNotFound { code: code.into() }
    }

    pub fn coupon_id_not_found(id: Uuid) -> Self {
        Self::CouponIdNotFound { id }
    }

    pub fn coupon_expired(code: impl Into<String>, expired_at: DateTime<Utc>) -> Self {
        Self::CouponExpired {
            code: code.into(),
            expired_at,
        }
    }

    pub fn coupon_usage_exceeded(code: impl Into<String>, limit: i32) -> Self {
        Self::CouponUsageExceeded {
            code: code.into(),
            limit,
        }
    }

    pub fn below_minimum(total: Decimal, minimum: Decimal) -> Self {
        Self::BelowMinimum { total, minimum }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}
