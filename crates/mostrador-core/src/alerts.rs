//! # Stock Alerts
//!
//! Low-stock and near-expiration alert derivation.
//!
//! ## Semantics
//! - **Stock Bajo**: for every (product, store) pair with a configured
//!   minimum, an alert exists iff the summed batch quantity at that store
//!   is strictly below the threshold.
//! - **Próxima Caducidad**: for every batch with an expiration date
//!   strictly between now and now + lead-time days (default 30).
//!
//! Alerts are recomputed wholesale, never incrementally. Each alert has a
//! deterministic composite key (`low-stock-<product>-<store>`,
//! `exp-<batch>`) so recomputation replaces rather than accumulates, and
//! two runs over the same state are identical.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::quantity::Quantity;
use crate::types::{InventoryBatch, MinStockLevel};

/// Default near-expiration lead time, in days.
pub const DEFAULT_EXPIRY_LEAD_DAYS: i64 = 30;

// =============================================================================
// Alert Types
// =============================================================================

/// Class of stock alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    LowStock,
    NearExpiration,
}

impl AlertKind {
    /// User-facing label, kept in the upstream schema's Spanish.
    pub const fn label(&self) -> &'static str {
        match self {
            AlertKind::LowStock => "Stock Bajo",
            AlertKind::NearExpiration => "Próxima Caducidad",
        }
    }
}

/// A derived stock alert. Pure projection of current state; holds no
/// references back into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAlert {
    /// Deterministic composite key used for replacement de-duplication.
    pub key: String,
    pub kind: AlertKind,
    pub product_id: String,
    /// Store the alert applies to (the batch's location for expirations).
    pub store_id: String,
    /// Current summed quantity (low stock) or batch quantity (expiration).
    pub quantity: Quantity,
    /// Configured threshold; only set for low-stock alerts.
    pub threshold: Option<Quantity>,
    /// Batch and date; only set for near-expiration alerts.
    pub batch_id: Option<String>,
    pub expires_at: Option<NaiveDate>,
}

// =============================================================================
// Derivation
// =============================================================================

/// Recomputes the full alert set for the given inventory state.
///
/// Pure function of its inputs: calling it twice with no intervening
/// change yields an identical, identically-ordered set.
pub fn check_all_alerts(
    batches: &[InventoryBatch],
    levels: &[MinStockLevel],
    today: NaiveDate,
    lead_days: i64,
) -> Vec<StockAlert> {
    let mut alerts = Vec::new();

    for level in levels {
        let on_hand = crate::inventory::stock_on_hand(batches, &level.product_id, &level.store_id);
        if on_hand < level.min_quantity {
            alerts.push(StockAlert {
                key: format!("low-stock-{}-{}", level.product_id, level.store_id),
                kind: AlertKind::LowStock,
                product_id: level.product_id.clone(),
                store_id: level.store_id.clone(),
                quantity: on_hand,
                threshold: Some(level.min_quantity),
                batch_id: None,
                expires_at: None,
            });
        }
    }

    let horizon = today + chrono::Duration::days(lead_days);
    for batch in batches {
        if let Some(exp) = batch.expires_at {
            // Strictly between: already-expired lots and lots exactly at
            // the horizon do not qualify.
            if exp > today && exp < horizon {
                alerts.push(StockAlert {
                    key: format!("exp-{}", batch.id),
                    kind: AlertKind::NearExpiration,
                    product_id: batch.product_id.clone(),
                    store_id: batch.location_id.clone(),
                    quantity: batch.quantity,
                    threshold: None,
                    batch_id: Some(batch.id.clone()),
                    expires_at: Some(exp),
                });
            }
        }
    }

    alerts.sort_by(|a, b| a.key.cmp(&b.key));
    alerts
}

// =============================================================================
// Unit Tests
// =============================================================================
