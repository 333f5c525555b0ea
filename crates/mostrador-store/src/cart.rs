//! # Cart Operations
//!
//! Cart mutations against loaded state. Stock ceilings come from the
//! in-memory batch set for the session's store; products with no batch
//! rows anywhere are untracked and sell without a ceiling (services,
//! made-to-order items). Every mutation re-mirrors the cart for
//! crash/reload recovery.

use mostrador_core::{stock_on_hand, CoreError, Discount, Product, Quantity};

use crate::error::{StoreError, StoreResult};
use crate::state::{AppState, AppStore};

impl AppStore {
    /// Adds one unit of a piece-sold product to the cart.
    pub async fn add_to_cart(&self, product_id: &str) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        let session = state.session()?;
        let product = find_product(&state, product_id)?;
        let stock = stock_ceiling(&state, product_id, &session.store_id);

        state.cart.add(&product, stock)?;
        self.cache.save_cart(&state.cart).await?;
        Ok(())
    }

    /// Adds a weighed quantity of a weight-sold product to the cart.
    pub async fn add_to_cart_weighed(
        &self,
        product_id: &str,
        weight: Quantity,
    ) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        let session = state.session()?;
        let product = find_product(&state, product_id)?;
        let stock = stock_ceiling(&state, product_id, &session.store_id);

        state.cart.add_weighed(&product, weight, stock)?;
        self.cache.save_cart(&state.cart).await?;
        Ok(())
    }

    /// Removes a product's line from the cart.
    pub async fn remove_from_cart(&self, product_id: &str) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        state.cart.remove(product_id);
        self.cache.save_cart(&state.cart).await?;
        Ok(())
    }

    /// Empties the cart and the staged discount/note.
    pub async fn clear_cart(&self) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        state.cart.clear();
        state.pending_discount = Discount::None;
        state.pending_note = None;
        self.cache.clear_cart().await?;
        Ok(())
    }

    /// Stages a discount for the next checkout.
    pub async fn set_discount(&self, discount: Discount) {
        self.state.lock().await.pending_discount = discount;
    }

    /// Stages a free-text note for the next checkout.
    pub async fn set_note(&self, note: Option<String>) {
        self.state.lock().await.pending_note = note;
    }
}

fn find_product(state: &AppState, product_id: &str) -> StoreResult<Product> {
    state
        .products
        .iter()
        .find(|p| p.id == product_id)
        .cloned()
        .ok_or_else(|| StoreError::Core(CoreError::ProductNotFound(product_id.to_string())))
}

/// Stock ceiling for a (product, store) pair.
///
/// `Some(total)` when the product has batch rows anywhere (a tracked
/// product with nothing at this store yields `Some(0)` and refuses to
/// sell); `None` when the product is untracked.
pub(crate) fn stock_ceiling(
    state: &AppState,
    product_id: &str,
    store_id: &str,
) -> Option<Quantity> {
    if state.batches.iter().any(|b| b.product_id == product_id) {
        Some(stock_on_hand(&state.batches, product_id, store_id))
    } else {
        None
    }
}
