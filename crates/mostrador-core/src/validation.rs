//! # Validation Module
//!
//! Input validation for catalog management.
//!
//! Validation here is the last line before data reaches the gateway; the
//! UI layer does its own immediate feedback and the remote schema has its
//! own constraints.

use crate::error::ValidationError;
use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::Product;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a product display name: non-empty, at most 200 characters.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }
    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }
    Ok(())
}

/// Validates a barcode: digits only, 6 to 14 characters (covers EAN-8,
/// UPC-A, EAN-13, ITF-14).
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    let barcode = barcode.trim();

    if barcode.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }
    if !barcode.chars().all(|c| c.is_ascii_digit()) || barcode.len() < 6 || barcode.len() > 14 {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must be 6-14 digits".to_string(),
        });
    }
    Ok(())
}

/// Validates that a price or cost is not negative.
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates that a quantity is strictly positive.
pub fn validate_quantity(field: &str, quantity: Quantity) -> ValidationResult<()> {
    if !quantity.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Product Validation
// =============================================================================

/// Validates a product before it is sent to the gateway.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_product_name(&product.name)?;
    validate_amount("price", product.price)?;
    validate_amount("cost", product.cost)?;
    if let Some(barcode) = &product.barcode {
        validate_barcode(barcode)?;
    }
    Ok(())
}

/// Cost above price is suspicious but legal (loss leaders, promotions);
/// it is surfaced as a warning, never enforced.
pub fn cost_exceeds_price_warning(product: &Product) -> Option<String> {
    if product.cost > product.price {
        Some(format!(
            "Cost {} exceeds price {} for '{}'",
            product.cost, product.price, product.name
        ))
    } else {
        None
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
