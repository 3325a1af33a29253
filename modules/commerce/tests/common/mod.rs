#![allow(dead_code)]

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use commerce::contract::model::Product;
use commerce::domain::cart_service::CartService;
use commerce::domain::coupon_service::CouponService;
use commerce::domain::ports::ProductCatalog;
use commerce::infra::storage::{SeaOrmCartRepository, SeaOrmCouponRepository, SeaOrmProductCatalog};
use commerce::Commerce;
use mart_db::{ConnectOpts, DbHandle};

pub const TEA: Uuid = Uuid::from_u128(0x7d9f0f51_7c53_4d3b_a3f4_0f2c1de0b001);
pub const COFFEE: Uuid = Uuid::from_u128(0x7d9f0f51_7c53_4d3b_a3f4_0f2c1de0b002);
pub const MISSING_PRODUCT: Uuid = Uuid::from_u128(0x7d9f0f51_7c53_4d3b_a3f4_0f2c1de0bfff);

pub fn tea_price() -> Decimal {
    dec!(4.25)
}

pub fn coffee_price() -> Decimal {
    dec!(3.10)
}

/// Fresh in-memory database with the commerce schema applied.
pub async fn create_test_db() -> DbHandle {
    let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default())
        .await
        .expect("Failed to connect to test database");
    Commerce::migrate(&db).await.expect("Failed to run migrations");
    db
}

pub async fn seed_catalog(conn: &DatabaseConnection) -> SeaOrmProductCatalog<DatabaseConnection> {
    let catalog = SeaOrmProductCatalog::new(conn.clone());
    catalog
        .upsert(&[
            Product {
                id: TEA,
                name: "Tea".into(),
                price: tea_price(),
            },
            Product {
                id: COFFEE,
                name: "Coffee".into(),
                price: coffee_price(),
            },
        ])
        .await
        .expect("Failed to seed products");
    catalog
}

pub fn cart_service_with(
    conn: &DatabaseConnection,
    catalog: Arc<dyn ProductCatalog>,
) -> Arc<CartService> {
    Arc::new(CartService::new(
        Arc::new(SeaOrmCartRepository::new(conn.clone())),
        catalog,
    ))
}

pub async fn cart_service(db: &DbHandle) -> Arc<CartService> {
    let conn = db.sea();
    let catalog = seed_catalog(&conn).await;
    cart_service_with(&conn, Arc::new(catalog))
}

pub fn coupon_service(db: &DbHandle) -> Arc<CouponService> {
    Arc::new(CouponService::new(Arc::new(SeaOrmCouponRepository::new(
        db.sea(),
    ))))
}
