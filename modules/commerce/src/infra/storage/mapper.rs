use rust_decimal::Decimal;

use crate::contract::model::{Cart, CartItem, Coupon, Product};
use crate::infra::storage::entity::{cart, cart_item, coupon, product};

// SQLite hands money back through f64; pin it to the stored scale.
pub fn money(d: Decimal) -> Decimal {
    d.round_dp(4).normalize()
}

pub fn cart_from_rows(cart: cart::Model, items: Vec<cart_item::Model>) -> Cart {
    Cart {
        id: cart.id,
        user_id: cart.user_id,
        total: money(cart.total),
        items: items.into_iter().map(Into::into).collect(),
        created_at: cart.created_at,
        updated_at: cart.updated_at,
    }
}

impl From<cart_item::Model> for CartItem {
    fn from(m: cart_item::Model) -> Self {
        Self {
            id: m.id,
            cart_id: m.cart_id,
            product_id: m.product_id,
            quantity: m.quantity,
            price: money(m.price),
            product: None,
        }
    }
}

impl From<coupon::Model> for Coupon {
    fn from(m: coupon::Model) -> Self {
        Self {
            id: m.id,
            code: m.code,
            discount_percent: money(m.discount_percent),
            created_at: m.created_at,
            expires_at: m.expires_at,
            usage_limit: m.usage_limit,
            times_used: m.times_used,
            min_cart_value: money(m.min_cart_value),
        }
    }
}

impl From<product::Model> for Product {
    fn from(m: product::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            price: money(m.price),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn money_drops_float_noise() {
        let noisy = Decimal::from_f64_retain(19.99).unwrap();
        assert_eq!(money(noisy), dec!(19.99));
        assert_eq!(money(dec!(12.5000)), dec!(12.5));
    }
}
