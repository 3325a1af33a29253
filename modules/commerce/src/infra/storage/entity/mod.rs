pub mod cart;
pub mod cart_item;
pub mod coupon;
pub mod product;
