use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::contract::{
    client::CommerceApi,
    error::CommerceError,
    model::{AppliedCoupon, Cart, Coupon, NewCoupon},
};
use crate::domain::cart_service::CartService;
use crate::domain::coupon_service::CouponService;

/// Local implementation of the CommerceApi trait that delegates to the domain services
pub struct CommerceLocalClient {
    cart: Arc<CartService>,
    coupons: Arc<CouponService>,
}

impl CommerceLocalClient {
    pub fn new(cart: Arc<CartService>, coupons: Arc<CouponService>) -> Self {
        Self { cart, coupons }
    }
}

#[async_trait]
impl CommerceApi for CommerceLocalClient {
    async fn add_to_cart(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Cart, CommerceError> {
        self.cart
            .add_item(user_id, product_id, quantity)
            .await
            .map_err(Into::into)
    }

    async fn update_cart_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Cart, CommerceError> {
        self.cart
            .update_item(user_id, product_id, quantity)
            .await
            .map_err(Into::into)
    }

    async fn remove_cart_item(&self, item_id: Uuid) -> Result<(), CommerceError> {
        self.cart.remove_item(item_id).await.map_err(Into::into)
    }

    async fn view_cart(&self, user_id: Uuid) -> Result<Cart, CommerceError> {
        self.cart.view_cart(user_id).await.map_err(Into::into)
    }

    async fn create_coupon(&self, new_coupon: NewCoupon) -> Result<Coupon, CommerceError> {
        self.coupons.create(new_coupon).await.map_err(Into::into)
    }

    async fn get_coupon(&self, code: &str) -> Result<Coupon, CommerceError> {
        self.coupons.get(code).await.map_err(Into::into)
    }

    async fn list_coupons(&self) -> Result<Vec<Coupon>, CommerceError> {
        self.coupons.list().await.map_err(Into::into)
    }

    async fn apply_coupon(
        &self,
        code: &str,
        cart_total: Decimal,
    ) -> Result<AppliedCoupon, CommerceError> {
        self.coupons
            .apply(code, cart_total)
            .await
            .map_err(Into::into)
    }

    async fn delete_coupon(&self, id: Uuid) -> Result<(), CommerceError> {
        self.coupons.delete(id).await.map_err(Into::into)
    }
}
