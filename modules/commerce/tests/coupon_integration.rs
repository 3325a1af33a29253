mod common;

use chrono::{DateTime, Duration, Utc};
use rust_decimal_macros::dec;
use uuid::Uuid;

use commerce::api::rest::dto::ApplyCouponReq;
use commerce::contract::model::NewCoupon;
use commerce::domain::error::DomainError;

use common::*;

fn new_coupon(code: &str, expires_at: DateTime<Utc>) -> NewCoupon {
    NewCoupon {
        code: code.to_string(),
        discount_percent: dec!(20),
        expires_at,
        usage_limit: 10,
        times_used: None,
        min_cart_value: dec!(50),
    }
}

fn in_a_week() -> DateTime<Utc> {
    Utc::now() + Duration::days(7)
}

#[tokio::test]
async fn twenty_percent_off_one_hundred() {
    let db = create_test_db().await;
    let svc = coupon_service(&db);

    let created = svc.create(new_coupon("SAVE20", in_a_week())).await.unwrap();
    assert_eq!(created.times_used, 0);

    let applied = svc.apply("SAVE20", dec!(100)).await.unwrap();
    assert_eq!(applied.code, "SAVE20");
    assert_eq!(applied.original, dec!(100));
    assert_eq!(applied.discounted, dec!(80));
}

#[tokio::test]
async fn apply_is_read_only_and_repeatable() {
    let db = create_test_db().await;
    let svc = coupon_service(&db);
    svc.create(new_coupon("AGAIN", in_a_week())).await.unwrap();

    let first = svc.apply("AGAIN", dec!(75.50)).await.unwrap();
    let second = svc.apply("AGAIN", dec!(75.50)).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.discounted, dec!(60.40));

    assert_eq!(svc.get("AGAIN").await.unwrap().times_used, 0);
}

#[tokio::test]
async fn expiry_boundary_is_inclusive() {
    let db = create_test_db().await;
    let svc = coupon_service(&db);
    let expires_at = Utc::now() + Duration::hours(1);
    svc.create(new_coupon("EDGE", expires_at)).await.unwrap();
    // Use the stored instant; the store may truncate precision.
    let expires_at = svc.get("EDGE").await.unwrap().expires_at;

    svc.apply_at("EDGE", dec!(100), expires_at - Duration::seconds(1))
        .await
        .unwrap();
    svc.apply_at("EDGE", dec!(100), expires_at).await.unwrap();

    let err = svc
        .apply_at("EDGE", dec!(100), expires_at + Duration::seconds(1))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::CouponExpired { .. }));
}

#[tokio::test]
async fn exhausted_coupon_is_rejected() {
    let db = create_test_db().await;
    let svc = coupon_service(&db);

    svc.create(NewCoupon {
        times_used: Some(3),
        usage_limit: 3,
        ..new_coupon("USEDUP", in_a_week())
    })
    .await
    .unwrap();
    let err = svc.apply("USEDUP", dec!(100)).await.unwrap_err();
    assert!(matches!(err, DomainError::CouponUsageExceeded { limit: 3, .. }));

    svc.create(NewCoupon {
        usage_limit: 0,
        ..new_coupon("NEVER", in_a_week())
    })
    .await
    .unwrap();
    let err = svc.apply("NEVER", dec!(100)).await.unwrap_err();
    assert!(matches!(err, DomainError::CouponUsageExceeded { .. }));
}

#[tokio::test]
async fn minimum_cart_value_is_inclusive() {
    let db = create_test_db().await;
    let svc = coupon_service(&db);
    svc.create(new_coupon("MIN50", in_a_week())).await.unwrap();

    let err = svc.apply("MIN50", dec!(49.99)).await.unwrap_err();
    assert!(matches!(err, DomainError::BelowMinimum { .. }));

    let applied = svc.apply("MIN50", dec!(50)).await.unwrap();
    assert_eq!(applied.discounted, dec!(40));
}

#[tokio::test]
async fn expiry_is_checked_before_minimum() {
    let db = create_test_db().await;
    let svc = coupon_service(&db);
    let coupon = svc
        .create(new_coupon("OLD", Utc::now() + Duration::minutes(5)))
        .await
        .unwrap();

    let err = svc
        .apply_at("OLD", dec!(1), coupon.expires_at + Duration::days(1))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::CouponExpired { .. }));
}

#[tokio::test]
async fn unknown_code_is_not_found() {
    let db = create_test_db().await;
    let svc = coupon_service(&db);

    let err = svc.apply("NOPE", dec!(100)).await.unwrap_err();
    assert!(matches!(err, DomainError::CouponNotFound { .. }));
    let err = svc.get("NOPE").await.unwrap_err();
    assert!(matches!(err, DomainError::CouponNotFound { .. }));
}

#[tokio::test]
async fn codes_are_unique() {
    let db = create_test_db().await;
    let svc = coupon_service(&db);

    svc.create(new_coupon("ONCE", in_a_week())).await.unwrap();
    let err = svc
        .create(new_coupon("ONCE", in_a_week()))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::DuplicateCouponCode { .. }));
    assert_eq!(svc.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn create_validates_input() {
    let db = create_test_db().await;
    let svc = coupon_service(&db);

    let err = svc.create(new_coupon("", in_a_week())).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "code"));

    let err = svc
        .create(NewCoupon {
            discount_percent: dec!(0),
            ..new_coupon("ZERO", in_a_week())
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "discount_percent"));

    assert!(svc.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn only_the_empty_code_is_rejected() {
    let db = create_test_db().await;
    let svc = coupon_service(&db);

    let created = svc.create(new_coupon(" ", in_a_week())).await.unwrap();
    assert_eq!(created.code, " ");
    assert_eq!(svc.get(" ").await.unwrap().id, created.id);
}

#[tokio::test]
async fn out_of_range_total_is_a_validation_error() {
    let db = create_test_db().await;
    let svc = coupon_service(&db);
    svc.create(NewCoupon {
        min_cart_value: dec!(0),
        ..new_coupon("SAVE20", in_a_week())
    })
    .await
    .unwrap();

    let huge: ApplyCouponReq = serde_json::from_str(r#"{"code":"SAVE20","cart_total":1e27}"#).unwrap();
    let err = svc.apply("SAVE20", huge.cart_total).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "cart_total"));

    // The coupon still works for ordinary totals.
    assert_eq!(svc.apply("SAVE20", dec!(10)).await.unwrap().discounted, dec!(8));
}

#[tokio::test]
async fn create_returns_the_stored_row() {
    let db = create_test_db().await;
    let svc = coupon_service(&db);

    let created = svc
        .create(NewCoupon {
            discount_percent: dec!(12.345678),
            min_cart_value: dec!(9.999999),
            ..new_coupon("PRECISE", in_a_week())
        })
        .await
        .unwrap();
    let fetched = svc.get("PRECISE").await.unwrap();

    assert_eq!(created.discount_percent, dec!(12.3457));
    assert_eq!(created.discount_percent, fetched.discount_percent);
    assert_eq!(created.min_cart_value, fetched.min_cart_value);
    assert_eq!(created.id, fetched.id);
}

#[tokio::test]
async fn list_and_delete() {
    let db = create_test_db().await;
    let svc = coupon_service(&db);

    let a = svc.create(new_coupon("A", in_a_week())).await.unwrap();
    svc.create(new_coupon("B", in_a_week())).await.unwrap();

    let codes: Vec<String> = svc.list().await.unwrap().into_iter().map(|c| c.code).collect();
    assert_eq!(codes, vec!["A", "B"]);

    svc.delete(a.id).await.unwrap();
    assert!(matches!(
        svc.get("A").await.unwrap_err(),
        DomainError::CouponNotFound { .. }
    ));

    let err = svc.delete(a.id).await.unwrap_err();
    assert!(matches!(err, DomainError::CouponIdNotFound { id } if id == a.id));
    let err = svc.delete(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, DomainError::CouponIdNotFound { .. }));
}
