//! # mostrador-core: Pure Business Logic for Mostrador
//!
//! This crate is the **heart** of the Mostrador POS core. It contains all
//! business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Mostrador Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 mostrador-store (state store)                   │   │
//! │  │    load_* ──► add_to_cart ──► checkout ──► sync_pending_sales  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ mostrador-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌───────────┐ ┌────────────────┐  │   │
//! │  │   │  money   │ │   cart   │ │ inventory │ │ alerts/transfer│  │   │
//! │  │   │  Money   │ │   Cart   │ │ FEFO      │ │ Stock Bajo,    │  │   │
//! │  │   │ Discount │ │ CartLine │ │ deduct()  │ │ state machine  │  │   │
//! │  │   └──────────┘ └──────────┘ └───────────┘ └────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, InventoryBatch, Client, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`quantity`] - Quantities in integer milliunits (weight-sold lines)
//! - [`cart`] - Cart with product snapshots and stock ceilings
//! - [`inventory`] - The single FEFO deduction helper
//! - [`sale`] - Discounts, checkout totals, the immutable Sale snapshot
//! - [`alerts`] - Low-stock and near-expiration alert derivation
//! - [`transfer`] - Transfer order state machine
//! - [`validation`] - Business rule validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output, always
//! 2. **No I/O**: database, network and file system access are FORBIDDEN here
//! 3. **Integer Math**: money in cents, quantities in milliunits
//! 4. **Explicit Errors**: typed errors, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod alerts;
pub mod cart;
pub mod error;
pub mod inventory;
pub mod money;
pub mod quantity;
pub mod sale;
pub mod transfer;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use alerts::{check_all_alerts, AlertKind, StockAlert, DEFAULT_EXPIRY_LEAD_DAYS};
pub use cart::{Cart, CartLine};
pub use error::{CoreError, CoreResult, ValidationError};
pub use inventory::{deduct, stock_on_hand, Deduction};
pub use money::Money;
pub use quantity::{Quantity, UnitOfMeasure};
pub use sale::{CheckoutPayment, Discount, Sale, SaleLine, SaleTotals};
pub use transfer::{TransferEvent, TransferItem, TransferOrder, TransferStatus};
pub use types::*;
pub use validation::{cost_exceeds_price_warning, validate_product, validate_quantity};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart.
///
/// Prevents runaway carts and keeps transaction sizes reasonable.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line, in whole units.
///
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_UNITS: i64 = 999;
