pub mod client;
pub mod error;
pub mod model;

pub use client::CommerceApi;
pub use error::CommerceError;
pub use model::{AppliedCoupon, Cart, CartItem, Coupon, NewCoupon, Product};
