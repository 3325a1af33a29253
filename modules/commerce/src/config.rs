use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contract::model::Product;

/// Configuration for the commerce module
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommerceConfig {
    /// Products upserted into the local catalog at start-up.
    #[serde(default)]
    pub seed_products: Vec<SeedProduct>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedProduct {
    pub id: Uuid,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl From<SeedProduct> for Product {
    fn from(p: SeedProduct) -> Self {
        Self {
            id: p.id,
            name: p.name,
            price: p.price,
        }
    }
}
