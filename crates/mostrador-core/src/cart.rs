//! # Cart
//!
//! The session-scoped cart: ordered product snapshots with quantities.
//!
//! ## Stock Ceiling
//! Adding a line checks against the stock computed for the session's
//! store. Callers pass `None` when no inventory data is loaded at all
//! (pure offline, data unavailable); in that case stock is treated as
//! unlimited and the add always succeeds.
//!
//! The cart itself is ephemeral; the state store mirrors it to the local
//! cache after every mutation for crash/reload recovery.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::quantity::{Quantity, UnitOfMeasure};
use crate::sale::SaleLine;
use crate::types::Product;
use crate::{MAX_CART_LINES, MAX_LINE_UNITS};

/// A cart line: frozen product data plus quantity.
///
/// Price and name are captured when the product is added; later catalog
/// edits do not change a cart in progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub unit_price: Money,
    pub unit: UnitOfMeasure,
    pub quantity: Quantity,
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    fn from_product(product: &Product, quantity: Quantity) -> Self {
        CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            unit: product.unit,
            quantity,
            added_at: Utc::now(),
        }
    }

    /// Line total (unit price × quantity).
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by `product_id`; adding the same product accumulates
/// - Quantities are strictly positive
/// - At most [`MAX_CART_LINES`] lines
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Cart {
    pub lines: Vec<CartLine>,
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Quantity of a product already in the cart.
    pub fn quantity_of(&self, product_id: &str) -> Quantity {
        self.lines
            .iter()
            .find(|l| l.product_id == product_id)
            .map(|l| l.quantity)
            .unwrap_or(Quantity::zero())
    }

    /// Adds one unit of a piece-sold product.
    ///
    /// `stock` is the available quantity at the session's store, or `None`
    /// when inventory data is unavailable (treated as unlimited). The add
    /// is refused when in-cart + 1 would exceed stock.
    pub fn add(&mut self, product: &Product, stock: Option<Quantity>) -> CoreResult<()> {
        self.add_quantity(product, Quantity::from_units(1), stock)
    }

    /// Adds a weighed quantity of a weight-sold product.
    ///
    /// Rejects when `weight` plus what is already in the cart exceeds the
    /// available stock.
    pub fn add_weighed(
        &mut self,
        product: &Product,
        weight: Quantity,
        stock: Option<Quantity>,
    ) -> CoreResult<()> {
        if !weight.is_positive() {
            return Err(CoreError::Validation(crate::error::ValidationError::MustBePositive {
                field: "weight".to_string(),
            }));
        }
        self.add_quantity(product, weight, stock)
    }

    fn add_quantity(
        &mut self,
        product: &Product,
        quantity: Quantity,
        stock: Option<Quantity>,
    ) -> CoreResult<()> {
        let in_cart = self.quantity_of(&product.id);
        let wanted = in_cart + quantity;

        if let Some(stock) = stock {
            if wanted > stock {
                return Err(CoreError::InsufficientStock {
                    product_id: product.id.clone(),
                    available: stock,
                    requested: wanted,
                });
            }
        }

        if wanted > Quantity::from_units(MAX_LINE_UNITS) {
            return Err(CoreError::QuantityTooLarge {
                requested: wanted,
                max: MAX_LINE_UNITS,
            });
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            line.quantity = wanted;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge { max: MAX_CART_LINES });
        }

        self.lines.push(CartLine::from_product(product, quantity));
        Ok(())
    }

    /// Removes a line by product id. Unknown products are a no-op.
    pub fn remove(&mut self, product_id: &str) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.created_at = Utc::now();
    }

    /// Subtotal before discount and commission.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(|l| l.line_total()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Freezes the cart into denormalized sale lines.
    pub fn to_sale_lines(&self) -> Vec<SaleLine> {
        self.lines
            .iter()
            .map(|l| SaleLine {
                product_id: l.product_id.clone(),
                name: l.name.clone(),
                unit_price: l.unit_price,
                quantity: l.quantity,
            })
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price_cents: i64, unit: UnitOfMeasure) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            price: Money::from_cents(price_cents),
            cost: Money::from_cents(price_cents / 2),
            unit,
            barcode: None,
            sku: None,
            category_id: None,
            image_url: None,
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_accumulates_same_product() {
        let mut cart = Cart::new();
        let p = product("p1", 1000, UnitOfMeasure::Unit);

        cart.add(&p, None).unwrap();
        cart.add(&p, None).unwrap();

        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.quantity_of("p1"), Quantity::from_units(2));
        assert_eq!(cart.subtotal().cents(), 2000);
    }

    #[test]
    fn test_add_refuses_to_exceed_stock() {
        let mut cart = Cart::new();
        let p = product("p1", 1000, UnitOfMeasure::Unit);
        let stock = Some(Quantity::from_units(2));

        cart.add(&p, stock).unwrap();
        cart.add(&p, stock).unwrap();
        let err = cart.add(&p, stock).unwrap_err();

        assert!(matches!(err, CoreError::InsufficientStock { .. }));
        assert_eq!(cart.quantity_of("p1"), Quantity::from_units(2));
    }

    #[test]
    fn test_no_stock_data_means_unlimited() {
        let mut cart = Cart::new();
        let p = product("p1", 1000, UnitOfMeasure::Unit);

        for _ in 0..50 {
            cart.add(&p, None).unwrap();
        }
        assert_eq!(cart.quantity_of("p1"), Quantity::from_units(50));
    }

    #[test]
    fn test_add_weighed_accumulates_and_checks_stock() {
        let mut cart = Cart::new();
        let p = product("queso", 18000, UnitOfMeasure::Kg);
        let stock = Some(Quantity::from_milli(1000)); // 1 kg on hand

        cart.add_weighed(&p, Quantity::from_milli(450), stock).unwrap();
        cart.add_weighed(&p, Quantity::from_milli(450), stock).unwrap();
        let err = cart
            .add_weighed(&p, Quantity::from_milli(200), stock)
            .unwrap_err();

        assert!(matches!(err, CoreError::InsufficientStock { .. }));
        assert_eq!(cart.quantity_of("queso"), Quantity::from_milli(900));
    }

    #[test]
    fn test_add_weighed_rejects_non_positive_weight() {
        let mut cart = Cart::new();
        let p = product("queso", 18000, UnitOfMeasure::Kg);
        assert!(cart.add_weighed(&p, Quantity::zero(), None).is_err());
    }

    #[test]
    fn test_price_frozen_at_add_time() {
        let mut cart = Cart::new();
        let mut p = product("p1", 1000, UnitOfMeasure::Unit);
        cart.add(&p, None).unwrap();

        p.price = Money::from_cents(9999);

        assert_eq!(cart.lines[0].unit_price.cents(), 1000);
    }

    #[test]
    fn test_to_sale_lines_snapshot() {
        let mut cart = Cart::new();
        let p = product("p1", 1000, UnitOfMeasure::Unit);
        cart.add(&p, None).unwrap();

        let lines = cart.to_sale_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].line_total().cents(), 1000);
    }
}
