use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::contract::{
    error::CommerceError,
    model::{AppliedCoupon, Cart, Coupon, NewCoupon},
};

/// Public API of the commerce module for in-process consumers.
///
/// `user_id` arguments must come from a verified identity, never from
/// client-supplied payloads.
#[async_trait]
pub trait CommerceApi: Send + Sync {
    async fn add_to_cart(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Cart, CommerceError>;

    async fn update_cart_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Cart, CommerceError>;

    async fn remove_cart_item(&self, item_id: Uuid) -> Result<(), CommerceError>;

    async fn view_cart(&self, user_id: Uuid) -> Result<Cart, CommerceError>;

    async fn create_coupon(&self, new_coupon: NewCoupon) -> Result<Coupon, CommerceError>;

    async fn get_coupon(&self, code: &str) -> Result<Coupon, CommerceError>;

    async fn list_coupons(&self) -> Result<Vec<Coupon>, CommerceError>;

    async fn apply_coupon(
        &self,
        code: &str,
        cart_total: Decimal,
    ) -> Result<AppliedCoupon, CommerceError>;

    async fn delete_coupon(&self, id: Uuid) -> Result<(), CommerceError>;
}
