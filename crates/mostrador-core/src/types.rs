//! # Domain Types
//!
//! Canonical domain records used throughout Mostrador.
//!
//! ## One Naming Convention
//! These are the only in-memory shapes. The gateway maps them to the remote
//! schema's snake_case columns at its own boundary; no record ever carries
//! two naming conventions at once.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::quantity::{Quantity, UnitOfMeasure};

// =============================================================================
// Catalog
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to the cashier and on tickets.
    pub name: String,

    /// Sale price per unit of measure.
    pub price: Money,

    /// Acquisition cost per unit. Cost above price is a validation
    /// warning, never a hard rejection.
    pub cost: Money,

    /// How the product is sold (unit, kg, g, ...).
    pub unit: UnitOfMeasure,

    /// Barcode (EAN-13, UPC-A, etc.).
    pub barcode: Option<String>,

    /// Stock Keeping Unit - business identifier.
    pub sku: Option<String>,

    /// Category reference. Soft: the category may be deleted later.
    pub category_id: Option<String>,

    /// Image reference (URL into the hosted storage bucket).
    pub image_url: Option<String>,

    /// Free-text description.
    pub description: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A category node. Self-referential tree via `parent_id`.
///
/// Deleting a category removes its **entire** subtree, not just direct
/// children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
}

/// A physical store location. The dimension for inventory partitioning
/// and user assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreLocation {
    pub id: String,
    pub name: String,
}

/// Role of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Cashier,
}

/// A system user (cashier or admin), assigned to at most one store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: UserRole,
    pub store_id: Option<String>,
}

// =============================================================================
// Inventory
// =============================================================================

/// A distinct lot of a product at a location.
///
/// Multiple batches may exist for the same (product, location) pair,
/// differentiated by expiration date and cost. Quantity never goes
/// negative; deduction is FEFO (see [`crate::inventory::deduct`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryBatch {
    pub id: String,
    pub product_id: String,
    pub location_id: String,
    pub quantity: Quantity,
    pub unit_cost: Money,
    /// Lots without an expiration date are consumed after all dated lots.
    pub expires_at: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Minimum-stock threshold for a (product, store) pair.
///
/// Drives the `Stock Bajo` alert: below this summed quantity an alert is
/// emitted for the pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinStockLevel {
    pub product_id: String,
    pub store_id: String,
    pub min_quantity: Quantity,
}

/// An unpersisted log entry for stock consumed by an employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumptionEntry {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: Quantity,
    pub user_id: String,
    pub store_id: String,
    pub recorded_at: DateTime<Utc>,
}

// =============================================================================
// Clients
// =============================================================================

/// A known customer with (stubbed) credit tracking.
///
/// Credit limit/balance are carried as data only; there are no ledger
/// operations yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub credit_limit: Money,
    pub credit_balance: Money,
}

// =============================================================================
// Expenses & Shopping List
// =============================================================================

/// Approval status for expenses and shopping list items (role-gated
/// upstream of this crate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Approved,
    Pending,
}

/// A recorded business expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub description: String,
    pub expected_cost: Money,
    pub actual_cost: Option<Money>,
    pub approval: ApprovalStatus,
    pub created_at: DateTime<Utc>,
}

/// A shopping list entry. May be promoted into a Product plus an initial
/// inventory batch once purchased.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingListItem {
    pub id: String,
    pub description: String,
    pub expected_cost: Money,
    pub actual_cost: Option<Money>,
    pub purchased: bool,
    pub approval: ApprovalStatus,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Cash Closing
// =============================================================================

/// End-of-shift cash closing.
///
/// Consumes the cashier's open sales: the sales listed in `sale_ids` leave
/// the open history once the closing is recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashClosing {
    pub id: String,
    pub cashier_id: String,
    /// Cash float counted at shift open.
    pub opening_float: Money,
    /// Sum of sale totals bundled into this closing.
    pub sales_total: Money,
    /// Cash portion of those sales.
    pub cash_total: Money,
    /// Card portion of those sales.
    pub card_total: Money,
    /// Cash float counted at shift close.
    pub closing_float: Money,
    pub sale_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_wire_values() {
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"admin\"");
    }

    #[test]
    fn test_batch_round_trips_through_json() {
        let batch = InventoryBatch {
            id: "b1".into(),
            product_id: "p1".into(),
            location_id: "s1".into(),
            quantity: Quantity::from_units(5),
            unit_cost: Money::from_cents(750),
            expires_at: Some(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()),
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&batch).unwrap();
        let back: InventoryBatch = serde_json::from_str(&json).unwrap();
        assert_eq!(back.quantity, batch.quantity);
        assert_eq!(back.expires_at, batch.expires_at);
    }
}
