pub mod cart_service;
pub mod coupon_service;
pub mod error;
pub mod ports;
pub mod pricing;
pub mod repo;
