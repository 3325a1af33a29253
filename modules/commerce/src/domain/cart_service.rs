use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use mart_db::KeySequencer;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::contract::model::{Cart, Product};
use crate::domain::error::DomainError;
use crate::domain::ports::ProductCatalog;
use crate::domain::repo::{CartRepository, ItemUpdate};

/// Cart operations. Mutations of one user's cart run one at a time: the
/// per-user sequencer orders them in-process and the repository commits each
/// line write together with its recomputed total.
#[derive(Clone)]
pub struct CartService {
    repo: Arc<dyn CartRepository>,
    catalog: Arc<dyn ProductCatalog>,
    sequencer: Arc<KeySequencer>,
}

fn cart_key(user_id: Uuid) -> String {
    format!("cart:{user_id}")
}

impl CartService {
    pub fn new(repo: Arc<dyn CartRepository>, catalog: Arc<dyn ProductCatalog>) -> Self {
        Self {
            repo,
            catalog,
            sequencer: Arc::new(KeySequencer::new()),
        }
    }

    #[instrument(name = "commerce.cart.add_item", skip(self))]
    pub async fn add_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Cart, DomainError> {
        let quantity = quantity.max(1);

        let product = self
            .catalog
            .find(product_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::product_not_found(product_id))?;

        let cart = {
            let _turn = self.sequencer.acquire(cart_key(user_id)).await;
            self.repo
                .add_item(user_id, product.id, quantity, product.price, Utc::now())
                .await
                .map_err(|e| DomainError::database(e.to_string()))?
        };

        info!(cart_id = %cart.id, total = %cart.total, "item added to cart");
        self.populate_products(cart).await
    }

    #[instrument(name = "commerce.cart.update_item", skip(self))]
    pub async fn update_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Cart, DomainError> {
        if quantity < 1 {
            return Err(DomainError::invalid_quantity(quantity));
        }

        let outcome = {
            let _turn = self.sequencer.acquire(cart_key(user_id)).await;
            self.repo
                .set_item_quantity(user_id, product_id, quantity, Utc::now())
                .await
                .map_err(|e| DomainError::database(e.to_string()))?
        };

        match outcome {
            ItemUpdate::Updated(cart) => {
                info!(cart_id = %cart.id, total = %cart.total, "cart item updated");
                self.populate_products(cart).await
            }
            ItemUpdate::CartMissing => Err(DomainError::cart_not_found(user_id)),
            ItemUpdate::ItemMissing => Err(DomainError::item_not_found_for_product(product_id)),
        }
    }

    /// Remove a line by its id. Not scoped to a caller: any holder of the id may remove it.
    #[instrument(name = "commerce.cart.remove_item", skip(self))]
    pub async fn remove_item(&self, item_id: Uuid) -> Result<(), DomainError> {
        let owner = self
            .repo
            .find_item_owner(item_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::item_not_found_by_id(item_id))?;

        let cart = {
            let _turn = self.sequencer.acquire(cart_key(owner)).await;
            self.repo
                .remove_item(item_id, Utc::now())
                .await
                .map_err(|e| DomainError::database(e.to_string()))?
                // removed concurrently between lookup and lock
                .ok_or_else(|| DomainError::item_not_found_by_id(item_id))?
        };

        info!(cart_id = %cart.id, total = %cart.total, "cart item removed");
        Ok(())
    }

    #[instrument(name = "commerce.cart.view", skip(self))]
    pub async fn view_cart(&self, user_id: Uuid) -> Result<Cart, DomainError> {
        debug!("Loading cart");
        let cart = self
            .repo
            .find_by_user(user_id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::cart_not_found(user_id))?;
        self.populate_products(cart).await
    }

    async fn populate_products(&self, mut cart: Cart) -> Result<Cart, DomainError> {
        let mut ids: Vec<Uuid> = cart.items.iter().map(|i| i.product_id).collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(cart);
        }

        let products: HashMap<Uuid, Product> = self
            .catalog
            .find_many(&ids)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        for item in &mut cart.items {
            item.product = products.get(&item.product_id).cloned();
        }
        debug!(items = cart.items.len(), "products populated");
        Ok(cart)
    }
}
