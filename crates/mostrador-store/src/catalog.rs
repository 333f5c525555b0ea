//! # Catalog Management
//!
//! Product and category mutations. All of these are online management
//! operations: they validate locally, write through the gateway, then
//! commit to memory and the cache mirror.

use tracing::{info, warn};
use uuid::Uuid;

use mostrador_cache::Partition;
use mostrador_core::{
    cost_exceeds_price_warning, validate_product, Category, CoreError, Product,
};

use crate::error::{StoreError, StoreResult};
use crate::state::AppStore;

impl AppStore {
    // =========================================================================
    // Products
    // =========================================================================

    /// Creates a product. A fresh id is assigned when the input carries
    /// none; cost above price logs a warning but does not reject.
    pub async fn create_product(&self, mut product: Product) -> StoreResult<Product> {
        validate_product(&product).map_err(CoreError::from)?;
        if let Some(warning) = cost_exceeds_price_warning(&product) {
            warn!("{}", warning);
        }
        if product.id.is_empty() {
            product.id = Uuid::new_v4().to_string();
        }

        let stored = self.remote.insert_product(&product).await?;
        self.cache
            .put(Partition::Products, &stored.id, &stored)
            .await?;

        let mut state = self.state.lock().await;
        state.products.push(stored.clone());
        state.products.sort_by(|a, b| a.name.cmp(&b.name));
        info!(id = %stored.id, name = %stored.name, "Product created");
        Ok(stored)
    }

    /// Updates a product in place.
    pub async fn update_product(&self, product: Product) -> StoreResult<()> {
        validate_product(&product).map_err(CoreError::from)?;
        if let Some(warning) = cost_exceeds_price_warning(&product) {
            warn!("{}", warning);
        }

        self.remote.update_product(&product).await?;
        self.cache
            .put(Partition::Products, &product.id, &product)
            .await?;

        let mut state = self.state.lock().await;
        let slot = state
            .products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or_else(|| StoreError::not_found("product", &product.id))?;
        *slot = product;
        Ok(())
    }

    /// Deletes a product from the catalog. Existing batches and sale
    /// history keep their snapshots.
    pub async fn delete_product(&self, id: &str) -> StoreResult<()> {
        self.remote.delete_product(id).await?;
        self.cache.delete(Partition::Products, id).await?;

        let mut state = self.state.lock().await;
        state.products.retain(|p| p.id != id);
        info!(id, "Product deleted");
        Ok(())
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Creates a category under an optional parent.
    pub async fn create_category(
        &self,
        name: &str,
        parent_id: Option<String>,
    ) -> StoreResult<Category> {
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            parent_id,
        };
        let stored = self.remote.insert_category(&category).await?;
        self.cache
            .put(Partition::Categories, &stored.id, &stored)
            .await?;
        self.state.lock().await.categories.push(stored.clone());
        Ok(stored)
    }

    /// Renames or reparents a category.
    pub async fn update_category(&self, category: Category) -> StoreResult<()> {
        self.remote.update_category(&category).await?;
        self.cache
            .put(Partition::Categories, &category.id, &category)
            .await?;

        let mut state = self.state.lock().await;
        let slot = state
            .categories
            .iter_mut()
            .find(|c| c.id == category.id)
            .ok_or_else(|| StoreError::not_found("category", &category.id))?;
        *slot = category;
        Ok(())
    }

    /// Deletes a category and its ENTIRE subtree in one remote call.
    ///
    /// Products referencing any deleted category keep their dangling
    /// `category_id` (the reference is soft by design of the record).
    ///
    /// Returns the ids that were removed.
    pub async fn delete_category(&self, id: &str) -> StoreResult<Vec<String>> {
        let mut state = self.state.lock().await;
        if !state.categories.iter().any(|c| c.id == id) {
            return Err(StoreError::not_found("category", id));
        }

        let ids = subtree_ids(&state.categories, id);
        self.remote.delete_categories(&ids).await?;
        for removed in &ids {
            self.cache.delete(Partition::Categories, removed).await?;
        }

        state.categories.retain(|c| !ids.contains(&c.id));
        info!(root = id, removed = ids.len(), "Category subtree deleted");
        Ok(ids)
    }
}

/// Transitive closure of a category and its descendants, breadth-first.
fn subtree_ids(categories: &[Category], root: &str) -> Vec<String> {
    let mut ids = vec![root.to_string()];
    let mut cursor = 0;
    while cursor < ids.len() {
        let parent = ids[cursor].clone();
        for category in categories {
            if category.parent_id.as_deref() == Some(parent.as_str())
                && !ids.contains(&category.id)
            {
                ids.push(category.id.clone());
            }
        }
        cursor += 1;
    }
    ids
}

// =============================================================================
// Unit Tests
// =============================================================================
