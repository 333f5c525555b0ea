//! # Error Types
//!
//! Domain-specific error types for mostrador-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  mostrador-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  mostrador-cache errors   → CacheError  (storage failures)            │
//! │  mostrador-gateway errors → GatewayError (network/API failures)       │
//! │  mostrador-store errors   → StoreError  (wraps all of the above)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product ID, quantities, etc.)
//! 3. Errors are enum variants, never String

use thiserror::Error;

use crate::quantity::Quantity;
use crate::transfer::TransferStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent business rule violations. They should be caught and
/// translated to user-friendly messages at the UI boundary.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Not enough stock at the session's store to satisfy the request.
    ///
    /// Checkout policy is atomic: any shortfall rejects the whole sale
    /// rather than silently under-fulfilling it.
    #[error("Insufficient stock for {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: Quantity,
        requested: Quantity,
    },

    /// Checkout was attempted with an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max} units)")]
    QuantityTooLarge { requested: Quantity, max: i64 },

    /// A transfer order was asked to move backward or skip a state.
    ///
    /// The only legal walk is solicitado → enviado → recibido.
    #[error("Transfer cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        from: TransferStatus,
        to: TransferStatus,
    },

    /// Shipped/received quantities do not line up with the order items.
    #[error("Transfer has {expected} items but {given} quantities were provided")]
    TransferItemMismatch { expected: usize, given: usize },

    /// Referenced product is not in the loaded catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when user input doesn't meet requirements. Used for early
/// validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be zero or positive.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid barcode characters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
