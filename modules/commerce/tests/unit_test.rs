//! Domain services over hand-written mock ports.

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use commerce::contract::model::{Cart, Coupon, NewCoupon, Product};
use commerce::domain::cart_service::CartService;
use commerce::domain::coupon_service::CouponService;
use commerce::domain::error::DomainError;
use commerce::domain::ports::ProductCatalog;
use commerce::domain::repo::{CartRepository, CouponRepository, ItemUpdate};

struct OneProduct(Product);

#[async_trait]
impl ProductCatalog for OneProduct {
    async fn find(&self, id: Uuid) -> Result<Option<Product>> {
        Ok((id == self.0.id).then(|| self.0.clone()))
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
        Ok(ids
            .iter()
            .filter(|id| **id == self.0.id)
            .map(|_| self.0.clone())
            .collect())
    }
}

/// Store that is down for every call.
struct BrokenCartRepository;

#[async_trait]
impl CartRepository for BrokenCartRepository {
    async fn find_by_user(&self, _user_id: Uuid) -> Result<Option<Cart>> {
        Err(anyhow!("connection reset"))
    }

    async fn find_item_owner(&self, _item_id: Uuid) -> Result<Option<Uuid>> {
        Err(anyhow!("connection reset"))
    }

    async fn add_item(
        &self,
        _user_id: Uuid,
        _product_id: Uuid,
        _quantity: i32,
        _unit_price: Decimal,
        _now: DateTime<Utc>,
    ) -> Result<Cart> {
        Err(anyhow!("connection reset"))
    }

    async fn set_item_quantity(
        &self,
        _user_id: Uuid,
        _product_id: Uuid,
        _quantity: i32,
        _now: DateTime<Utc>,
    ) -> Result<ItemUpdate> {
        Err(anyhow!("connection reset"))
    }

    async fn remove_item(&self, _item_id: Uuid, _now: DateTime<Utc>) -> Result<Option<Cart>> {
        Err(anyhow!("connection reset"))
    }
}

#[derive(Default)]
struct MemCouponRepository {
    coupons: Mutex<Vec<Coupon>>,
}

#[async_trait]
impl CouponRepository for MemCouponRepository {
    async fn insert(&self, coupon: Coupon) -> Result<Option<Coupon>> {
        let mut coupons = self.coupons.lock().unwrap();
        if coupons.iter().any(|c| c.code == coupon.code) {
            return Ok(None);
        }
        coupons.push(coupon.clone());
        Ok(Some(coupon))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>> {
        Ok(self
            .coupons
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.code == code)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Coupon>> {
        Ok(self.coupons.lock().unwrap().clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut coupons = self.coupons.lock().unwrap();
        let before = coupons.len();
        coupons.retain(|c| c.id != id);
        Ok(coupons.len() != before)
    }
}

fn tea() -> Product {
    Product {
        id: Uuid::new_v4(),
        name: "Tea".into(),
        price: dec!(4.25),
    }
}

#[tokio::test]
async fn storage_failures_surface_as_database_errors() {
    let product = tea();
    let svc = CartService::new(
        Arc::new(BrokenCartRepository),
        Arc::new(OneProduct(product.clone())),
    );
    let user = Uuid::new_v4();

    let err = svc.add_item(user, product.id, 1).await.unwrap_err();
    assert!(matches!(err, DomainError::Database { .. }));
    let err = svc.update_item(user, product.id, 2).await.unwrap_err();
    assert!(matches!(err, DomainError::Database { .. }));
    let err = svc.remove_item(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, DomainError::Database { .. }));
    let err = svc.view_cart(user).await.unwrap_err();
    assert!(matches!(err, DomainError::Database { .. }));
}

#[tokio::test]
async fn invalid_update_quantity_never_reaches_storage() {
    let product = tea();
    let svc = CartService::new(
        Arc::new(BrokenCartRepository),
        Arc::new(OneProduct(product.clone())),
    );

    let err = svc
        .update_item(Uuid::new_v4(), product.id, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidQuantity { quantity: 0 }));
}

#[tokio::test]
async fn unknown_product_is_checked_before_storage() {
    let svc = CartService::new(Arc::new(BrokenCartRepository), Arc::new(OneProduct(tea())));
    let missing = Uuid::new_v4();

    let err = svc.add_item(Uuid::new_v4(), missing, 1).await.unwrap_err();
    assert!(matches!(err, DomainError::ProductNotFound { id } if id == missing));
}

#[tokio::test]
async fn coupon_checks_run_in_order() {
    let svc = CouponService::new(Arc::new(MemCouponRepository::default()));
    let now = Utc::now();
    svc.create(NewCoupon {
        code: "ALLBAD".into(),
        discount_percent: dec!(15),
        expires_at: now - Duration::days(1),
        usage_limit: 1,
        times_used: Some(1),
        min_cart_value: dec!(1000),
    })
    .await
    .unwrap();

    // Expired, exhausted and under minimum at once: expiry wins.
    let err = svc.apply_at("ALLBAD", dec!(1), now).await.unwrap_err();
    assert!(matches!(err, DomainError::CouponExpired { .. }));

    svc.create(NewCoupon {
        code: "USED".into(),
        discount_percent: dec!(15),
        expires_at: now + Duration::days(1),
        usage_limit: 1,
        times_used: Some(1),
        min_cart_value: dec!(1000),
    })
    .await
    .unwrap();

    // Exhausted and under minimum: usage wins.
    let err = svc.apply_at("USED", dec!(1), now).await.unwrap_err();
    assert!(matches!(err, DomainError::CouponUsageExceeded { .. }));
}

#[tokio::test]
async fn percentages_above_one_hundred_are_accepted() {
    let svc = CouponService::new(Arc::new(MemCouponRepository::default()));
    svc.create(NewCoupon {
        code: "HUGE".into(),
        discount_percent: dec!(150),
        expires_at: Utc::now() + Duration::days(1),
        usage_limit: 1,
        times_used: None,
        min_cart_value: Decimal::ZERO,
    })
    .await
    .unwrap();

    let applied = svc.apply("HUGE", dec!(100)).await.unwrap();
    assert_eq!(applied.discounted, dec!(-50));
}
