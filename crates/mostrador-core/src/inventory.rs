//! # Inventory Deduction
//!
//! The single FEFO ("first-expired, first-out") deduction helper, used
//! uniformly by checkout, transfer shipment and employee consumption.
//!
//! ## FEFO Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Batches for (p1, storeA), requested 4 units:                           │
//! │                                                                         │
//! │    exp 2025-01-01  qty 2   ──► drained to 0   (expires first)          │
//! │    exp 2025-06-01  qty 5   ──► reduced to 3                            │
//! │    exp (none)      qty 9   ──► untouched      (dated lots go first)    │
//! │                                                                         │
//! │  deducted = 4, shortfall = 0                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Shortfall is always reported explicitly; callers decide whether to
//! reject the whole operation (checkout does) or accept partial
//! fulfillment. No batch quantity ever goes negative.

use crate::quantity::Quantity;
use crate::types::InventoryBatch;

// =============================================================================
// Deduction
// =============================================================================

/// Outcome of a FEFO deduction over a batch set.
#[derive(Debug, Clone)]
pub struct Deduction {
    /// The full batch set with the matching lots decremented.
    pub batches: Vec<InventoryBatch>,
    /// How much was actually deducted.
    pub deducted: Quantity,
    /// Requested minus deducted; zero when stock sufficed.
    pub shortfall: Quantity,
    /// IDs of the batches that were touched, in consumption order.
    pub touched: Vec<String>,
}

/// Deducts `requested` of a product at a location across its batches in
/// FEFO order.
///
/// Batches for other products/locations pass through untouched. Lots with
/// no expiration date sort after all dated lots: they cannot expire first.
pub fn deduct(
    batches: &[InventoryBatch],
    product_id: &str,
    location_id: &str,
    requested: Quantity,
) -> Deduction {
    let mut updated: Vec<InventoryBatch> = batches.to_vec();

    // Indices of matching batches, FEFO-sorted. Sorting (is_none, date)
    // pushes expiration-less lots to the end.
    let mut order: Vec<usize> = updated
        .iter()
        .enumerate()
        .filter(|(_, b)| b.product_id == product_id && b.location_id == location_id)
        .map(|(i, _)| i)
        .collect();
    order.sort_by_key(|&i| (updated[i].expires_at.is_none(), updated[i].expires_at));

    let mut remaining = requested;
    let mut touched = Vec::new();

    for i in order {
        if !remaining.is_positive() {
            break;
        }
        let take = updated[i].quantity.min(remaining);
        if take.is_positive() {
            updated[i].quantity = updated[i].quantity.saturating_sub(take);
            remaining -= take;
            touched.push(updated[i].id.clone());
        }
    }

    Deduction {
        batches: updated,
        deducted: requested - remaining,
        shortfall: remaining,
        touched,
    }
}

/// Sums batch quantities for a product at a location.
pub fn stock_on_hand(
    batches: &[InventoryBatch],
    product_id: &str,
    location_id: &str,
) -> Quantity {
    batches
        .iter()
        .filter(|b| b.product_id == product_id && b.location_id == location_id)
        .map(|b| b.quantity)
        .sum()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use chrono::{NaiveDate, Utc};

    fn batch(id: &str, product: &str, location: &str, qty: i64, exp: Option<&str>) -> InventoryBatch {
        InventoryBatch {
            id: id.to_string(),
            product_id: product.to_string(),
            location_id: location.to_string(),
            quantity: Quantity::from_units(qty),
            unit_cost: Money::from_cents(500),
            expires_at: exp.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
            created_at: Utc::now(),
        }
    }

    fn qty_of<'a>(batches: &'a [InventoryBatch], id: &str) -> Quantity {
        batches.iter().find(|b| b.id == id).unwrap().quantity
    }

    #[test]
    fn test_fefo_consumes_earliest_expiration_first() {
        // The spec scenario: [{2, 2025-01-01}, {5, 2025-06-01}], request 4.
        let batches = vec![
            batch("late", "p1", "storeA", 5, Some("2025-06-01")),
            batch("early", "p1", "storeA", 2, Some("2025-01-01")),
        ];

        let out = deduct(&batches, "p1", "storeA", Quantity::from_units(4));

        assert_eq!(out.deducted, Quantity::from_units(4));
        assert!(out.shortfall.is_zero());
        assert_eq!(qty_of(&out.batches, "early"), Quantity::zero());
        assert_eq!(qty_of(&out.batches, "late"), Quantity::from_units(3));
        assert_eq!(out.touched, vec!["early".to_string(), "late".to_string()]);
    }

    #[test]
    fn test_undated_batches_consumed_last() {
        let batches = vec![
            batch("undated", "p1", "storeA", 10, None),
            batch("dated", "p1", "storeA", 3, Some("2030-01-01")),
        ];

        let out = deduct(&batches, "p1", "storeA", Quantity::from_units(5));

        assert_eq!(qty_of(&out.batches, "dated"), Quantity::zero());
        assert_eq!(qty_of(&out.batches, "undated"), Quantity::from_units(8));
    }

    #[test]
    fn test_shortfall_reported_no_negative_batches() {
        let batches = vec![batch("only", "p1", "storeA", 2, Some("2025-01-01"))];

        let out = deduct(&batches, "p1", "storeA", Quantity::from_units(7));

        assert_eq!(out.deducted, Quantity::from_units(2));
        assert_eq!(out.shortfall, Quantity::from_units(5));
        assert_eq!(qty_of(&out.batches, "only"), Quantity::zero());
        assert!(out.batches.iter().all(|b| !b.quantity.milli().is_negative()));
    }

    #[test]
    fn test_other_products_and_locations_untouched() {
        let batches = vec![
            batch("mine", "p1", "storeA", 4, Some("2025-01-01")),
            batch("other-product", "p2", "storeA", 4, Some("2024-01-01")),
            batch("other-store", "p1", "storeB", 4, Some("2024-01-01")),
        ];

        let out = deduct(&batches, "p1", "storeA", Quantity::from_units(4));

        assert_eq!(qty_of(&out.batches, "other-product"), Quantity::from_units(4));
        assert_eq!(qty_of(&out.batches, "other-store"), Quantity::from_units(4));
    }

    #[test]
    fn test_fractional_weight_deduction() {
        let batches = vec![batch("kg-lot", "queso", "storeA", 2, Some("2025-03-01"))];

        // Take 0.450 kg off a 2.000 kg lot.
        let out = deduct(&batches, "queso", "storeA", Quantity::from_milli(450));

        assert_eq!(qty_of(&out.batches, "kg-lot"), Quantity::from_milli(1550));
        assert!(out.shortfall.is_zero());
    }

    #[test]
    fn test_stock_on_hand_sums_per_pair() {
        let batches = vec![
            batch("a", "p1", "storeA", 2, Some("2025-01-01")),
            batch("b", "p1", "storeA", 5, None),
            batch("c", "p1", "storeB", 9, None),
        ];

        assert_eq!(stock_on_hand(&batches, "p1", "storeA"), Quantity::from_units(7));
        assert_eq!(stock_on_hand(&batches, "p1", "storeB"), Quantity::from_units(9));
        assert_eq!(stock_on_hand(&batches, "p2", "storeA"), Quantity::zero());
    }
}
