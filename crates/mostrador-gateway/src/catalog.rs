//! # Catalog Operations
//!
//! Products, categories, store locations and users. Products carry the
//! cents/row mapping; categories, stores and users cross the boundary in
//! their canonical shape.

use chrono::Utc;
use tracing::info;

use mostrador_core::{Category, Product, StoreLocation, User};

use crate::client::Gateway;
use crate::error::GatewayResult;
use crate::wire::ProductRow;

const PRODUCTS: &str = "products";
const CATEGORIES: &str = "categories";
const STORES: &str = "stores";
const USERS: &str = "app_users";

impl Gateway {
    // =========================================================================
    // Products
    // =========================================================================

    /// All products, ordered by name.
    pub async fn fetch_products(&self) -> GatewayResult<Vec<Product>> {
        let rows: Vec<ProductRow> = self
            .fetch_rows(PRODUCTS, &[("order", "name.asc")])
            .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Creates a product. Timestamps are stamped here; whatever the caller
    /// put in `created_at`/`updated_at` is discarded.
    pub async fn insert_product(&self, product: &Product) -> GatewayResult<Product> {
        let now = Utc::now();
        let row = ProductRow::from_product(product, now, now);
        let stored: ProductRow = self.insert_returning(PRODUCTS, &row).await?;
        info!(id = %stored.id, name = %stored.name, "Product created");
        Ok(stored.into())
    }

    /// Updates a product in place, stamping `updated_at`. The stored
    /// `created_at` is left untouched.
    pub async fn update_product(&self, product: &Product) -> GatewayResult<()> {
        let now = Utc::now();
        let row = ProductRow::from_product(product, product.created_at, now);

        let mut patch = serde_json::to_value(&row)?;
        if let Some(obj) = patch.as_object_mut() {
            obj.remove("id");
            obj.remove("created_at");
        }

        self.patch_by_id(PRODUCTS, &product.id, &patch).await
    }

    /// Deletes a product.
    pub async fn delete_product(&self, id: &str) -> GatewayResult<()> {
        self.delete_by_ids(PRODUCTS, std::slice::from_ref(&id.to_string()))
            .await
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// All categories (flat; the tree is reassembled via `parent_id`).
    pub async fn fetch_categories(&self) -> GatewayResult<Vec<Category>> {
        self.fetch_rows(CATEGORIES, &[("order", "name.asc")]).await
    }

    /// Creates a category.
    pub async fn insert_category(&self, category: &Category) -> GatewayResult<Category> {
        self.insert_returning(CATEGORIES, category).await
    }

    /// Renames or reparents a category.
    pub async fn update_category(&self, category: &Category) -> GatewayResult<()> {
        let patch = serde_json::json!({
            "name": category.name,
            "parent_id": category.parent_id,
        });
        self.patch_by_id(CATEGORIES, &category.id, &patch).await
    }

    /// Deletes a set of categories in one request.
    ///
    /// The caller passes the WHOLE subtree's ids (the store computes the
    /// transitive closure); deleting only the direct children would orphan
    /// grandchildren.
    pub async fn delete_categories(&self, ids: &[String]) -> GatewayResult<()> {
        info!(count = ids.len(), "Deleting category subtree");
        self.delete_by_ids(CATEGORIES, ids).await
    }

    // =========================================================================
    // Stores & Users
    // =========================================================================

    /// All store locations.
    pub async fn fetch_stores(&self) -> GatewayResult<Vec<StoreLocation>> {
        self.fetch_rows(STORES, &[("order", "name.asc")]).await
    }

    /// All users.
    pub async fn fetch_users(&self) -> GatewayResult<Vec<User>> {
        self.fetch_rows(USERS, &[("order", "name.asc")]).await
    }
}
