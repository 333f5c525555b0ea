//! # Transfer Order Operations
//!
//! Transfer orders cross the boundary in their canonical shape: items and
//! history are jsonb columns, and the status column holds the same
//! lowercase values the state machine serializes.

use tracing::info;

use mostrador_core::TransferOrder;

use crate::client::Gateway;
use crate::error::GatewayResult;

const TRANSFERS: &str = "transfer_orders";

impl Gateway {
    /// All transfer orders, newest first.
    pub async fn fetch_transfers(&self) -> GatewayResult<Vec<TransferOrder>> {
        self.fetch_rows(TRANSFERS, &[("order", "created_at.desc")])
            .await
    }

    /// Creates a transfer order in `solicitado`.
    pub async fn insert_transfer(&self, order: &TransferOrder) -> GatewayResult<TransferOrder> {
        let stored: TransferOrder = self.insert_returning(TRANSFERS, order).await?;
        info!(
            id = %stored.id,
            origin = %stored.origin_id,
            destination = %stored.destination_id,
            "Transfer order created"
        );
        Ok(stored)
    }

    /// Pushes a transition: the new status, the item quantities populated
    /// by it, and the appended history entry. Identity columns never
    /// change after creation.
    pub async fn update_transfer(&self, order: &TransferOrder) -> GatewayResult<()> {
        let patch = serde_json::json!({
            "status": order.status,
            "items": order.items,
            "history": order.history,
        });
        info!(id = %order.id, status = order.status.as_str(), "Transfer order updated");
        self.patch_by_id(TRANSFERS, &order.id, &patch).await
    }
}
