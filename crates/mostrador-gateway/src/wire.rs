//! # Wire Row Mapping
//!
//! The remote schema's row shapes and their conversions to and from the
//! canonical records. This module is the ONLY place the snake_case column
//! vocabulary (`price_cents`, `quantity_milli`, ...) exists; nothing
//! outside the gateway ever sees a row type.
//!
//! ## Conventions
//! - Money columns are integer cents, suffixed `_cents`.
//! - Quantity columns are integer milliunits, suffixed `_milli`.
//! - Nested snapshots (sale lines, transfer items/history) are jsonb
//!   columns holding the canonical serde shape, which is already
//!   snake_case with transparent integers.
//! - Records whose canonical shape coincides with their columns
//!   (`Category`, `StoreLocation`, `User`, `TransferOrder`) cross the
//!   boundary directly; a row type for them would be a field-for-field
//!   copy.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use mostrador_core::{
    ApprovalStatus, CashClosing, Client, Discount, Expense, InventoryBatch, MinStockLevel, Money,
    Product, Quantity, Sale, SaleLine, ShoppingListItem, UnitOfMeasure,
};

// =============================================================================
// Products
// =============================================================================

/// Row of the `products` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
    pub cost_cents: i64,
    pub unit: UnitOfMeasure,
    pub barcode: Option<String>,
    pub sku: Option<String>,
    pub category_id: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductRow {
    /// Builds the row for a product, stamping the given timestamps.
    /// Caller-side timestamps are never trusted across the boundary.
    pub fn from_product(product: &Product, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        ProductRow {
            id: product.id.clone(),
            name: product.name.clone(),
            price_cents: product.price.cents(),
            cost_cents: product.cost.cents(),
            unit: product.unit,
            barcode: product.barcode.clone(),
            sku: product.sku.clone(),
            category_id: product.category_id.clone(),
            image_url: product.image_url.clone(),
            description: product.description.clone(),
            created_at,
            updated_at,
        }
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            price: Money::from_cents(row.price_cents),
            cost: Money::from_cents(row.cost_cents),
            unit: row.unit,
            barcode: row.barcode,
            sku: row.sku,
            category_id: row.category_id,
            image_url: row.image_url,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// =============================================================================
// Inventory
// =============================================================================

/// Row of the `inventory_batches` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRow {
    pub id: String,
    pub product_id: String,
    pub location_id: String,
    pub quantity_milli: i64,
    pub unit_cost_cents: i64,
    pub expires_at: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl BatchRow {
    pub fn from_batch(batch: &InventoryBatch, created_at: DateTime<Utc>) -> Self {
        BatchRow {
            id: batch.id.clone(),
            product_id: batch.product_id.clone(),
            location_id: batch.location_id.clone(),
            quantity_milli: batch.quantity.milli(),
            unit_cost_cents: batch.unit_cost.cents(),
            expires_at: batch.expires_at,
            created_at,
        }
    }
}

impl From<BatchRow> for InventoryBatch {
    fn from(row: BatchRow) -> Self {
        InventoryBatch {
            id: row.id,
            product_id: row.product_id,
            location_id: row.location_id,
            quantity: Quantity::from_milli(row.quantity_milli),
            unit_cost: Money::from_cents(row.unit_cost_cents),
            expires_at: row.expires_at,
            created_at: row.created_at,
        }
    }
}

/// Row of the `min_stock_levels` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinStockRow {
    pub product_id: String,
    pub store_id: String,
    pub min_quantity_milli: i64,
}

impl From<MinStockRow> for MinStockLevel {
    fn from(row: MinStockRow) -> Self {
        MinStockLevel {
            product_id: row.product_id,
            store_id: row.store_id,
            min_quantity: Quantity::from_milli(row.min_quantity_milli),
        }
    }
}

// =============================================================================
// Sales
// =============================================================================

/// Row of the `sales` table. Lines and discount are jsonb snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleRow {
    pub id: String,
    pub client_token: String,
    pub lines: Vec<SaleLine>,
    pub subtotal_cents: i64,
    pub discount: Discount,
    pub note: Option<String>,
    pub total_cents: i64,
    pub cash_cents: i64,
    pub card_cents: i64,
    pub card_commission_cents: i64,
    pub commission_in_cash: bool,
    pub cashier_id: String,
    pub store_id: String,
    pub created_at: DateTime<Utc>,
}

impl SaleRow {
    /// Builds the insert row for a sale.
    ///
    /// Offline placeholder ids (`offline-sale-<token>`) are replaced with a
    /// fresh UUID; the client token, not the id, is what makes the insert
    /// idempotent.
    pub fn from_sale(sale: &Sale) -> Self {
        let id = if sale.id.starts_with("offline-sale-") {
            uuid::Uuid::new_v4().to_string()
        } else {
            sale.id.clone()
        };

        SaleRow {
            id,
            client_token: sale.client_token.clone(),
            lines: sale.lines.clone(),
            subtotal_cents: sale.subtotal.cents(),
            discount: sale.discount,
            note: sale.note.clone(),
            total_cents: sale.total.cents(),
            cash_cents: sale.cash_tendered.cents(),
            card_cents: sale.card_tendered.cents(),
            card_commission_cents: sale.card_commission.cents(),
            commission_in_cash: sale.commission_in_cash,
            cashier_id: sale.cashier_id.clone(),
            store_id: sale.store_id.clone(),
            created_at: sale.created_at,
        }
    }
}

impl From<SaleRow> for Sale {
    fn from(row: SaleRow) -> Self {
        Sale {
            id: row.id,
            client_token: row.client_token,
            lines: row.lines,
            subtotal: Money::from_cents(row.subtotal_cents),
            discount: row.discount,
            note: row.note,
            total: Money::from_cents(row.total_cents),
            cash_tendered: Money::from_cents(row.cash_cents),
            card_tendered: Money::from_cents(row.card_cents),
            card_commission: Money::from_cents(row.card_commission_cents),
            commission_in_cash: row.commission_in_cash,
            cashier_id: row.cashier_id,
            store_id: row.store_id,
            created_at: row.created_at,
        }
    }
}

// =============================================================================
// Clients
// =============================================================================

/// Row of the `clients` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRow {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub credit_limit_cents: i64,
    pub credit_balance_cents: i64,
}

impl From<&Client> for ClientRow {
    fn from(client: &Client) -> Self {
        ClientRow {
            id: client.id.clone(),
            name: client.name.clone(),
            phone: client.phone.clone(),
            email: client.email.clone(),
            address: client.address.clone(),
            credit_limit_cents: client.credit_limit.cents(),
            credit_balance_cents: client.credit_balance.cents(),
        }
    }
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Client {
            id: row.id,
            name: row.name,
            phone: row.phone,
            email: row.email,
            address: row.address,
            credit_limit: Money::from_cents(row.credit_limit_cents),
            credit_balance: Money::from_cents(row.credit_balance_cents),
        }
    }
}

// =============================================================================
// Expenses & Shopping List
// =============================================================================

/// Row of the `expenses` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseRow {
    pub id: String,
    pub description: String,
    pub expected_cost_cents: i64,
    pub actual_cost_cents: Option<i64>,
    pub approval: ApprovalStatus,
    pub created_at: DateTime<Utc>,
}

impl ExpenseRow {
    pub fn from_expense(expense: &Expense, created_at: DateTime<Utc>) -> Self {
        ExpenseRow {
            id: expense.id.clone(),
            description: expense.description.clone(),
            expected_cost_cents: expense.expected_cost.cents(),
            actual_cost_cents: expense.actual_cost.map(|m| m.cents()),
            approval: expense.approval,
            created_at,
        }
    }
}

impl From<ExpenseRow> for Expense {
    fn from(row: ExpenseRow) -> Self {
        Expense {
            id: row.id,
            description: row.description,
            expected_cost: Money::from_cents(row.expected_cost_cents),
            actual_cost: row.actual_cost_cents.map(Money::from_cents),
            approval: row.approval,
            created_at: row.created_at,
        }
    }
}

/// Row of the `shopping_list_items` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingItemRow {
    pub id: String,
    pub description: String,
    pub expected_cost_cents: i64,
    pub actual_cost_cents: Option<i64>,
    pub purchased: bool,
    pub approval: ApprovalStatus,
    pub created_at: DateTime<Utc>,
}

impl ShoppingItemRow {
    pub fn from_item(item: &ShoppingListItem, created_at: DateTime<Utc>) -> Self {
        ShoppingItemRow {
            id: item.id.clone(),
            description: item.description.clone(),
            expected_cost_cents: item.expected_cost.cents(),
            actual_cost_cents: item.actual_cost.map(|m| m.cents()),
            purchased: item.purchased,
            approval: item.approval,
            created_at,
        }
    }
}

impl From<ShoppingItemRow> for ShoppingListItem {
    fn from(row: ShoppingItemRow) -> Self {
        ShoppingListItem {
            id: row.id,
            description: row.description,
            expected_cost: Money::from_cents(row.expected_cost_cents),
            actual_cost: row.actual_cost_cents.map(Money::from_cents),
            purchased: row.purchased,
            approval: row.approval,
            created_at: row.created_at,
        }
    }
}

// =============================================================================
// Cash Closings
// =============================================================================

/// Row of the `cash_closings` table. `sale_ids` is a jsonb array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashClosingRow {
    pub id: String,
    pub cashier_id: String,
    pub opening_float_cents: i64,
    pub sales_total_cents: i64,
    pub cash_total_cents: i64,
    pub card_total_cents: i64,
    pub closing_float_cents: i64,
    pub sale_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&CashClosing> for CashClosingRow {
    fn from(closing: &CashClosing) -> Self {
        CashClosingRow {
            id: closing.id.clone(),
            cashier_id: closing.cashier_id.clone(),
            opening_float_cents: closing.opening_float.cents(),
            sales_total_cents: closing.sales_total.cents(),
            cash_total_cents: closing.cash_total.cents(),
            card_total_cents: closing.card_total.cents(),
            closing_float_cents: closing.closing_float.cents(),
            sale_ids: closing.sale_ids.clone(),
            created_at: closing.created_at,
        }
    }
}

impl From<CashClosingRow> for CashClosing {
    fn from(row: CashClosingRow) -> Self {
        CashClosing {
            id: row.id,
            cashier_id: row.cashier_id,
            opening_float: Money::from_cents(row.opening_float_cents),
            sales_total: Money::from_cents(row.sales_total_cents),
            cash_total: Money::from_cents(row.cash_total_cents),
            card_total: Money::from_cents(row.card_total_cents),
            closing_float: Money::from_cents(row.closing_float_cents),
            sale_ids: row.sale_ids,
            created_at: row.created_at,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
