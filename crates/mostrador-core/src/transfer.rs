//! # Transfer Orders
//!
//! Inter-store transfer orders and their state machine.
//!
//! ## The Only Legal Walk
//! ```text
//! solicitado ──► enviado ──► recibido
//! ```
//! Transitions are strictly forward; skipping or reversing a state is a
//! typed error. Every transition appends an (status, timestamp, actor)
//! entry to the append-only history. Sent quantities are populated only on
//! shipment, received quantities only on receipt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::quantity::Quantity;

// =============================================================================
// Status
// =============================================================================

/// Transfer order status. Wire values keep the upstream schema's Spanish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    /// Requested by the destination store.
    Solicitado,
    /// Shipped from the origin store.
    Enviado,
    /// Received at the destination store.
    Recibido,
}

impl TransferStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Solicitado => "solicitado",
            TransferStatus::Enviado => "enviado",
            TransferStatus::Recibido => "recibido",
        }
    }
}

// =============================================================================
// Items & History
// =============================================================================

/// One product line on a transfer order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferItem {
    pub product_id: String,
    /// Product name frozen at request time.
    pub product_name: String,
    pub requested: Quantity,
    /// Populated on the solicitado → enviado transition.
    pub sent: Option<Quantity>,
    /// Populated on the enviado → recibido transition.
    pub received: Option<Quantity>,
}

/// An append-only history entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferEvent {
    pub status: TransferStatus,
    pub at: DateTime<Utc>,
    pub actor: String,
}

// =============================================================================
// Transfer Order
// =============================================================================

/// An inter-store transfer order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferOrder {
    pub id: String,
    pub origin_id: String,
    pub destination_id: String,
    pub items: Vec<TransferItem>,
    pub status: TransferStatus,
    pub history: Vec<TransferEvent>,
    pub requested_by: String,
    pub created_at: DateTime<Utc>,
}

impl TransferOrder {
    /// Creates a new order in `solicitado` with its first history entry.
    pub fn request(
        id: &str,
        origin_id: &str,
        destination_id: &str,
        items: Vec<TransferItem>,
        requested_by: &str,
        now: DateTime<Utc>,
    ) -> TransferOrder {
        TransferOrder {
            id: id.to_string(),
            origin_id: origin_id.to_string(),
            destination_id: destination_id.to_string(),
            items,
            status: TransferStatus::Solicitado,
            history: vec![TransferEvent {
                status: TransferStatus::Solicitado,
                at: now,
                actor: requested_by.to_string(),
            }],
            requested_by: requested_by.to_string(),
            created_at: now,
        }
    }

    fn transition(&mut self, to: TransferStatus, expected_from: TransferStatus) -> CoreResult<()> {
        if self.status != expected_from {
            return Err(CoreError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    /// Marks the order shipped, recording per-item sent quantities.
    ///
    /// `sent` is aligned with `items`; a length mismatch is rejected
    /// before any mutation.
    pub fn mark_shipped(
        &mut self,
        sent: &[Quantity],
        actor: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        if sent.len() != self.items.len() {
            return Err(CoreError::TransferItemMismatch {
                expected: self.items.len(),
                given: sent.len(),
            });
        }
        self.transition(TransferStatus::Enviado, TransferStatus::Solicitado)?;

        for (item, qty) in self.items.iter_mut().zip(sent) {
            item.sent = Some(*qty);
        }
        self.history.push(TransferEvent {
            status: TransferStatus::Enviado,
            at: now,
            actor: actor.to_string(),
        });
        Ok(())
    }

    /// Marks the order received, recording per-item received quantities.
    pub fn mark_received(
        &mut self,
        received: &[Quantity],
        actor: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        if received.len() != self.items.len() {
            return Err(CoreError::TransferItemMismatch {
                expected: self.items.len(),
                given: received.len(),
            });
        }
        self.transition(TransferStatus::Recibido, TransferStatus::Enviado)?;

        for (item, qty) in self.items.iter_mut().zip(received) {
            item.received = Some(*qty);
        }
        self.history.push(TransferEvent {
            status: TransferStatus::Recibido,
            at: now,
            actor: actor.to_string(),
        });
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product: &str, requested: i64) -> TransferItem {
        TransferItem {
            product_id: product.to_string(),
            product_name: format!("Product {}", product),
            requested: Quantity::from_units(requested),
            sent: None,
            received: None,
        }
    }

    fn order() -> TransferOrder {
        TransferOrder::request(
            "t1",
            "origin",
            "dest",
            vec![item("p1", 5), item("p2", 3)],
            "user-1",
            Utc::now(),
        )
    }

    #[test]
    fn test_full_forward_walk() {
        let mut t = order();
        assert_eq!(t.status, TransferStatus::Solicitado);

        t.mark_shipped(
            &[Quantity::from_units(5), Quantity::from_units(2)],
            "origin-user",
            Utc::now(),
        )
        .unwrap();
        assert_eq!(t.status, TransferStatus::Enviado);
        assert_eq!(t.items[1].sent, Some(Quantity::from_units(2)));
        assert_eq!(t.items[1].received, None);

        t.mark_received(
            &[Quantity::from_units(5), Quantity::from_units(2)],
            "dest-user",
            Utc::now(),
        )
        .unwrap();
        assert_eq!(t.status, TransferStatus::Recibido);
        assert_eq!(t.items[0].received, Some(Quantity::from_units(5)));

        // History is a non-decreasing walk through the three states.
        let statuses: Vec<TransferStatus> = t.history.iter().map(|e| e.status).collect();
        assert_eq!(
            statuses,
            vec![
                TransferStatus::Solicitado,
                TransferStatus::Enviado,
                TransferStatus::Recibido
            ]
        );
        assert!(statuses.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_cannot_skip_to_received() {
        let mut t = order();
        let err = t
            .mark_received(
                &[Quantity::from_units(5), Quantity::from_units(3)],
                "dest-user",
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
        assert_eq!(t.status, TransferStatus::Solicitado);
    }

    #[test]
    fn test_cannot_ship_twice() {
        let mut t = order();
        let sent = [Quantity::from_units(5), Quantity::from_units(3)];
        t.mark_shipped(&sent, "u", Utc::now()).unwrap();
        assert!(t.mark_shipped(&sent, "u", Utc::now()).is_err());
        assert_eq!(t.history.len(), 2);
    }

    #[test]
    fn test_quantity_mismatch_rejected_before_mutation() {
        let mut t = order();
        let err = t
            .mark_shipped(&[Quantity::from_units(5)], "u", Utc::now())
            .unwrap_err();
        assert!(matches!(err, CoreError::TransferItemMismatch { .. }));
        assert_eq!(t.status, TransferStatus::Solicitado);
        assert!(t.items.iter().all(|i| i.sent.is_none()));
    }

    #[test]
    fn test_status_wire_values() {
        assert_eq!(
            serde_json::to_string(&TransferStatus::Solicitado).unwrap(),
            "\"solicitado\""
        );
        assert_eq!(TransferStatus::Enviado.as_str(), "enviado");
    }
}
