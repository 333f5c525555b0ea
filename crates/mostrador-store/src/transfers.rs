//! # Transfer Order Operations
//!
//! Store-level transfer handling: the destination requests, the origin
//! ships (FEFO deduction at the origin), the destination receives (new
//! batches created with the receiving clerk's cost/expiration data).
//!
//! Transfers are management operations and require connectivity; there is
//! no offline queue for them.

use chrono::{NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

use mostrador_cache::Partition;
use mostrador_core::{
    deduct, stock_on_hand, validate_quantity, CoreError, InventoryBatch, Money, Quantity,
    TransferItem, TransferOrder,
};

use crate::error::{StoreError, StoreResult};
use crate::state::AppStore;

/// One requested product line for a new transfer order.
#[derive(Debug, Clone)]
pub struct TransferRequestLine {
    pub product_id: String,
    pub quantity: Quantity,
}

/// Lot details entered on receipt: the destination decides cost and
/// expiration because the paperwork travels with the goods.
#[derive(Debug, Clone)]
pub struct ReceivedLot {
    pub quantity: Quantity,
    pub unit_cost: Money,
    pub expires_at: Option<NaiveDate>,
}

impl AppStore {
    /// Requests a transfer from `origin_id` to the session's store.
    pub async fn request_transfer(
        &self,
        origin_id: &str,
        lines: Vec<TransferRequestLine>,
    ) -> StoreResult<TransferOrder> {
        let mut state = self.state.lock().await;
        let session = state.session()?;

        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            validate_quantity("quantity", line.quantity).map_err(CoreError::from)?;
            let product = state
                .products
                .iter()
                .find(|p| p.id == line.product_id)
                .ok_or_else(|| {
                    StoreError::Core(CoreError::ProductNotFound(line.product_id.clone()))
                })?;
            items.push(TransferItem {
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                requested: line.quantity,
                sent: None,
                received: None,
            });
        }

        let order = TransferOrder::request(
            &Uuid::new_v4().to_string(),
            origin_id,
            &session.store_id,
            items,
            &session.user_id,
            Utc::now(),
        );

        let stored = self.remote.insert_transfer(&order).await?;
        self.cache
            .put(Partition::Transfers, &stored.id, &stored)
            .await?;
        state.transfers.insert(0, stored.clone());
        info!(id = %stored.id, origin = %stored.origin_id, "Transfer requested");
        Ok(stored)
    }

    /// Ships a requested transfer, deducting the sent quantities FEFO at
    /// the origin store. Any shortfall rejects the whole shipment.
    pub async fn ship_transfer(
        &self,
        transfer_id: &str,
        sent: Vec<Quantity>,
    ) -> StoreResult<TransferOrder> {
        let mut state = self.state.lock().await;
        let session = state.session()?;

        let mut order = state
            .transfers
            .iter()
            .find(|t| t.id == transfer_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("transfer", transfer_id))?;

        order.mark_shipped(&sent, &session.user_id, Utc::now())?;

        let mut working = state.batches.clone();
        let mut touched: Vec<String> = Vec::new();
        for item in &order.items {
            let quantity = item.sent.unwrap_or(Quantity::zero());
            if !quantity.is_positive() {
                continue;
            }
            let outcome = deduct(&working, &item.product_id, &order.origin_id, quantity);
            if outcome.shortfall.is_positive() {
                let available = stock_on_hand(&state.batches, &item.product_id, &order.origin_id);
                return Err(CoreError::InsufficientStock {
                    product_id: item.product_id.clone(),
                    available,
                    requested: quantity,
                }
                .into());
            }
            working = outcome.batches;
            touched.extend(outcome.touched);
        }

        touched.sort();
        touched.dedup();
        let updates: Vec<(String, Quantity)> = working
            .iter()
            .filter(|b| touched.contains(&b.id))
            .map(|b| (b.id.clone(), b.quantity))
            .collect();

        self.remote.update_transfer(&order).await?;
        self.remote.apply_batch_quantities(&updates).await?;

        self.mirror_batches(&working).await?;
        self.cache
            .put(Partition::Transfers, &order.id, &order)
            .await?;

        state.batches = working;
        if let Some(slot) = state.transfers.iter_mut().find(|t| t.id == order.id) {
            *slot = order.clone();
        }
        state.recompute_alerts();
        info!(id = %order.id, "Transfer shipped");
        Ok(order)
    }

    /// Receives a shipped transfer at its destination, creating one new
    /// batch per received lot.
    pub async fn receive_transfer(
        &self,
        transfer_id: &str,
        lots: Vec<ReceivedLot>,
    ) -> StoreResult<TransferOrder> {
        let mut state = self.state.lock().await;
        let session = state.session()?;

        let mut order = state
            .transfers
            .iter()
            .find(|t| t.id == transfer_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("transfer", transfer_id))?;

        let received: Vec<Quantity> = lots.iter().map(|l| l.quantity).collect();
        order.mark_received(&received, &session.user_id, Utc::now())?;

        let now = Utc::now();
        let mut new_batches = Vec::new();
        for (item, lot) in order.items.iter().zip(&lots) {
            if !lot.quantity.is_positive() {
                continue;
            }
            let batch = InventoryBatch {
                id: Uuid::new_v4().to_string(),
                product_id: item.product_id.clone(),
                location_id: order.destination_id.clone(),
                quantity: lot.quantity,
                unit_cost: lot.unit_cost,
                expires_at: lot.expires_at,
                created_at: now,
            };
            let stored = self.remote.insert_batch(&batch).await?;
            new_batches.push(stored);
        }

        self.remote.update_transfer(&order).await?;

        state.batches.extend(new_batches);
        let batches = state.batches.clone();
        self.mirror_batches(&batches).await?;
        self.cache
            .put(Partition::Transfers, &order.id, &order)
            .await?;

        if let Some(slot) = state.transfers.iter_mut().find(|t| t.id == order.id) {
            *slot = order.clone();
        }
        state.recompute_alerts();
        info!(id = %order.id, destination = %order.destination_id, "Transfer received");
        Ok(order)
    }
}
