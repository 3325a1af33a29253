pub mod cart_repo;
pub mod catalog;
pub mod coupon_repo;
pub mod entity;
pub mod mapper;
pub mod migrations;

pub use cart_repo::SeaOrmCartRepository;
pub use catalog::SeaOrmProductCatalog;
pub use coupon_repo::SeaOrmCouponRepository;
