use std::sync::Arc;

use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use mart_db::DbHandle;
use mart_http::{Authorizer, TokenVerifier};

use crate::api::rest::routes;
use crate::config::CommerceConfig;
use crate::contract::client::CommerceApi;
use crate::contract::model::Product;
use crate::domain::cart_service::CartService;
use crate::domain::coupon_service::CouponService;
use crate::gateways::local::CommerceLocalClient;
use crate::infra::storage::{SeaOrmCartRepository, SeaOrmCouponRepository, SeaOrmProductCatalog};

/// Commerce module: cart and coupon services wired to SeaORM storage.
#[derive(Clone)]
pub struct Commerce {
    cart: Arc<CartService>,
    coupons: Arc<CouponService>,
}

impl Commerce {
    pub async fn migrate(db: &DbHandle) -> anyhow::Result<()> {
        info!("Running commerce database migrations");
        let conn = db.sea();
        crate::infra::storage::migrations::Migrator::up(&conn, None).await?;
        info!("Commerce database migrations completed successfully");
        Ok(())
    }

    /// Wire repositories to services and seed the product catalog.
    pub async fn init(db: &DbHandle, cfg: CommerceConfig) -> anyhow::Result<Self> {
        info!("Initializing commerce module");
        let db_conn = db.sea();

        let catalog = SeaOrmProductCatalog::new(db_conn.clone());
        if !cfg.seed_products.is_empty() {
            let products: Vec<Product> = cfg.seed_products.into_iter().map(Into::into).collect();
            catalog.upsert(&products).await?;
            debug!(count = products.len(), "product catalog seeded");
        }

        let cart = CartService::new(
            Arc::new(SeaOrmCartRepository::new(db_conn.clone())),
            Arc::new(catalog),
        );
        let coupons = CouponService::new(Arc::new(SeaOrmCouponRepository::new(db_conn)));

        Ok(Self {
            cart: Arc::new(cart),
            coupons: Arc::new(coupons),
        })
    }

    pub fn register_rest(
        &self,
        router: axum::Router,
        verifier: Arc<dyn TokenVerifier>,
        authorizer: Arc<dyn Authorizer>,
    ) -> axum::Router {
        info!("Registering commerce REST routes");
        routes::register_routes(
            router,
            self.cart.clone(),
            self.coupons.clone(),
            verifier,
            authorizer,
        )
    }

    /// In-process client for other modules.
    pub fn client(&self) -> Arc<dyn CommerceApi> {
        Arc::new(CommerceLocalClient::new(
            self.cart.clone(),
            self.coupons.clone(),
        ))
    }
}
