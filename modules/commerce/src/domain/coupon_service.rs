use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::contract::model::{AppliedCoupon, Coupon, NewCoupon};
use crate::domain::error::DomainError;
use crate::domain::pricing::percent_discount;
use crate::domain::repo::CouponRepository;

/// Coupon rules: creation, lookup and read-only application.
///
/// `times_used` is stored and checked but never incremented here.
#[derive(Clone)]
pub struct CouponService {
    repo: Arc<dyn CouponRepository>,
}

impl CouponService {
    pub fn new(repo: Arc<dyn CouponRepository>) -> Self {
        Self { repo }
    }

    #[instrument(
        name = "commerce.coupon.create",
        skip(self, new_coupon),
        fields(code = %new_coupon.code)
    )]
    pub async fn create(&self, new_coupon: NewCoupon) -> Result<Coupon, DomainError> {
        Self::validate_new_coupon(&new_coupon)?;

        let coupon = Coupon {
            id: Uuid::new_v4(),
            code: new_coupon.code,
            discount_percent: new_coupon.discount_percent,
            created_at: Utc::now(),
            expires_at: new_coupon.expires_at,
            usage_limit: new_coupon.usage_limit,
            times_used: new_coupon.times_used.unwrap_or(0),
            min_cart_value: new_coupon.min_cart_value,
        };

        let code = coupon.code.clone();
        let stored = self
            .repo
            .insert(coupon)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::duplicate_coupon_code(code))?;

        info!(coupon_id = %stored.id, "coupon created");
        Ok(stored)
    }

    #[instrument(name = "commerce.coupon.get", skip(self))]
    pub async fn get(&self, code: &str) -> Result<Coupon, DomainError> {
        self.repo
            .find_by_code(code)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::coupon_not_found(code))
    }

    #[instrument(name = "commerce.coupon.list", skip(self))]
    pub async fn list(&self) -> Result<Vec<Coupon>, DomainError> {
        let coupons = self
            .repo
            .list()
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        debug!(count = coupons.len(), "coupons listed");
        Ok(coupons)
    }

    /// Validate `code` against `cart_total` at the current instant.
    pub async fn apply(&self, code: &str, cart_total: Decimal) -> Result<AppliedCoupon, DomainError> {
        self.apply_at(code, cart_total, Utc::now()).await
    }

    /// Checks run in order: existence, expiry, usage limit, minimum spend.
    #[instrument(name = "commerce.coupon.apply", skip(self))]
    pub async fn apply_at(
        &self,
        code: &str,
        cart_total: Decimal,
        now: DateTime<Utc>,
    ) -> Result<AppliedCoupon, DomainError> {
        let coupon = self.get(code).await?;

        if now > coupon.expires_at {
            return Err(DomainError::coupon_expired(coupon.code, coupon.expires_at));
        }
        if coupon.times_used >= coupon.usage_limit {
            return Err(DomainError::coupon_usage_exceeded(
                coupon.code,
                coupon.usage_limit,
            ));
        }
        if cart_total < coupon.min_cart_value {
            return Err(DomainError::below_minimum(cart_total, coupon.min_cart_value));
        }

        let discounted = percent_discount(cart_total, coupon.discount_percent)
            .ok_or_else(|| DomainError::validation("cart_total", "amount is out of range"))?;
        debug!(discounted = %discounted, "coupon applies");
        Ok(AppliedCoupon {
            code: coupon.code,
            original: cart_total,
            discounted,
        })
    }

    #[instrument(name = "commerce.coupon.delete", skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let deleted = self
            .repo
            .delete(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if !deleted {
            return Err(DomainError::coupon_id_not_found(id));
        }
        info!("coupon deleted");
        Ok(())
    }

    fn validate_new_coupon(new_coupon: &NewCoupon) -> Result<(), DomainError> {
        if new_coupon.code.is_empty() {
            return Err(DomainError::validation("code", "must not be empty"));
        }
        if new_coupon.discount_percent <= Decimal::ZERO {
            return Err(DomainError::validation(
                "discount_percent",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}
