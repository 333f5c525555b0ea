//! # Inventory Operations
//!
//! Batch rows and minimum-stock thresholds. Quantities cross the wire as
//! integer milliunits; the batch-quantity patch is the write half of the
//! FEFO deduction the store computes locally.

use chrono::Utc;
use tracing::{debug, info};

use mostrador_core::{InventoryBatch, MinStockLevel, Quantity};

use crate::client::Gateway;
use crate::error::GatewayResult;
use crate::wire::{BatchRow, MinStockRow};

const BATCHES: &str = "inventory_batches";
const MIN_STOCK: &str = "min_stock_levels";

impl Gateway {
    /// All inventory batches, expiring soonest first (undated lots sort
    /// last server-side with `nullslast`).
    pub async fn fetch_batches(&self) -> GatewayResult<Vec<InventoryBatch>> {
        let rows: Vec<BatchRow> = self
            .fetch_rows(BATCHES, &[("order", "expires_at.asc.nullslast")])
            .await?;
        Ok(rows.into_iter().map(InventoryBatch::from).collect())
    }

    /// Creates a batch (goods received, transfer receipt, promotion from
    /// the shopping list). `created_at` is stamped here.
    pub async fn insert_batch(&self, batch: &InventoryBatch) -> GatewayResult<InventoryBatch> {
        let row = BatchRow::from_batch(batch, Utc::now());
        let stored: BatchRow = self.insert_returning(BATCHES, &row).await?;
        info!(id = %stored.id, product = %stored.product_id, "Inventory batch created");
        Ok(stored.into())
    }

    /// Sets one batch's remaining quantity.
    pub async fn set_batch_quantity(&self, id: &str, quantity: Quantity) -> GatewayResult<()> {
        let patch = serde_json::json!({ "quantity_milli": quantity.milli() });
        self.patch_by_id(BATCHES, id, &patch).await
    }

    /// Pushes a set of post-deduction batch quantities, one patch per
    /// batch. Stops at the first failure so the caller can retry the
    /// remainder; quantities are absolute, so re-applying a patch that
    /// already landed is harmless.
    pub async fn apply_batch_quantities(
        &self,
        updates: &[(String, Quantity)],
    ) -> GatewayResult<()> {
        for (id, quantity) in updates {
            debug!(batch = %id, milli = quantity.milli(), "Pushing batch quantity");
            self.set_batch_quantity(id, *quantity).await?;
        }
        Ok(())
    }

    /// Deletes a batch (manual stock correction).
    pub async fn delete_batch(&self, id: &str) -> GatewayResult<()> {
        self.delete_by_ids(BATCHES, std::slice::from_ref(&id.to_string()))
            .await
    }

    /// All minimum-stock thresholds.
    pub async fn fetch_min_stock_levels(&self) -> GatewayResult<Vec<MinStockLevel>> {
        let rows: Vec<MinStockRow> = self.fetch_rows(MIN_STOCK, &[]).await?;
        Ok(rows.into_iter().map(MinStockLevel::from).collect())
    }
}
