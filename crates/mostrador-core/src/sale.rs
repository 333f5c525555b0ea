//! # Sale Module
//!
//! Discounts, checkout totals and the immutable `Sale` snapshot.
//!
//! ## Totals Contract
//! ```text
//! subtotal   = Σ (line.unit_price × line.quantity)
//! discounted = subtotal - discount(subtotal)
//! total      = discounted + commission      (if commission NOT in cash)
//!            = discounted                   (if commission absorbed)
//! ```
//! The discount and the commission are each applied exactly once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::quantity::Quantity;

// =============================================================================
// Discount
// =============================================================================

/// A sale-level discount.
///
/// Percentages are carried in basis points (1000 bps = 10%) so fractional
/// percentages stay exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Discount {
    #[default]
    None,
    Percentage {
        bps: u32,
    },
    Amount {
        amount: Money,
    },
}

impl Discount {
    /// Convenience constructor from whole percent ("10% off").
    pub const fn percent(pct: u32) -> Self {
        Discount::Percentage { bps: pct * 100 }
    }

    /// The discount amount for a given subtotal.
    ///
    /// Fixed amounts are clamped to the subtotal; a discount never turns
    /// a sale negative.
    pub fn amount_off(&self, subtotal: Money) -> Money {
        match self {
            Discount::None => Money::zero(),
            Discount::Percentage { bps } => subtotal.percentage_of(*bps),
            Discount::Amount { amount } => {
                if *amount > subtotal {
                    subtotal
                } else {
                    *amount
                }
            }
        }
    }
}

// =============================================================================
// Sale Totals
// =============================================================================

/// Computed checkout totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleTotals {
    pub subtotal: Money,
    pub discount_amount: Money,
    pub commission: Money,
    pub total: Money,
}

impl SaleTotals {
    /// Applies the discount to the subtotal, then adds the card commission
    /// unless it is absorbed in cash.
    pub fn compute(
        subtotal: Money,
        discount: &Discount,
        card_commission: Money,
        commission_in_cash: bool,
    ) -> SaleTotals {
        let discount_amount = discount.amount_off(subtotal);
        let discounted = subtotal - discount_amount;
        let commission = if commission_in_cash {
            Money::zero()
        } else {
            card_commission
        };

        SaleTotals {
            subtotal,
            discount_amount,
            commission,
            total: discounted + commission,
        }
    }
}

// =============================================================================
// Payment Input
// =============================================================================

/// Tender and adjustments captured at the register for one checkout.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CheckoutPayment {
    /// Cash tendered.
    pub cash: Money,
    /// Card tendered.
    pub card: Money,
    /// Card-commission amount passed on by the terminal.
    pub card_commission: Money,
    /// When true the commission is absorbed in cash and does not raise
    /// the total.
    pub commission_in_cash: bool,
    pub discount: Discount,
    pub note: Option<String>,
}

// =============================================================================
// Sale
// =============================================================================

/// A denormalized sale line: product data frozen at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLine {
    pub product_id: String,
    /// Name at time of sale (frozen).
    pub name: String,
    /// Unit price at time of sale (frozen).
    pub unit_price: Money,
    pub quantity: Quantity,
}

impl SaleLine {
    /// Line total (unit price × quantity).
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// A completed sale. Immutable after checkout except for being bundled
/// into a cash closing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    /// Local id. Offline sales use `offline-sale-<token>` until the
    /// server assigns the canonical id on replay.
    pub id: String,
    /// Client-generated idempotency token. The server-side insert is a
    /// no-op when it has seen the token before, so offline replay cannot
    /// duplicate a sale.
    pub client_token: String,
    pub lines: Vec<SaleLine>,
    pub subtotal: Money,
    pub discount: Discount,
    pub note: Option<String>,
    pub total: Money,
    pub cash_tendered: Money,
    pub card_tendered: Money,
    pub card_commission: Money,
    pub commission_in_cash: bool,
    pub cashier_id: String,
    pub store_id: String,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Composes the immutable sale snapshot from cart lines and payment.
    ///
    /// Totals are derived here and nowhere else; callers must not adjust
    /// them afterwards.
    pub fn compose(
        lines: Vec<SaleLine>,
        payment: &CheckoutPayment,
        cashier_id: &str,
        store_id: &str,
        client_token: &str,
        id: &str,
        created_at: DateTime<Utc>,
    ) -> Sale {
        let subtotal: Money = lines.iter().map(|l| l.line_total()).sum();
        let totals = SaleTotals::compute(
            subtotal,
            &payment.discount,
            payment.card_commission,
            payment.commission_in_cash,
        );

        Sale {
            id: id.to_string(),
            client_token: client_token.to_string(),
            lines,
            subtotal: totals.subtotal,
            discount: payment.discount,
            note: payment.note.clone(),
            total: totals.total,
            cash_tendered: payment.cash,
            card_tendered: payment.card,
            card_commission: payment.card_commission,
            commission_in_cash: payment.commission_in_cash,
            cashier_id: cashier_id.to_string(),
            store_id: store_id.to_string(),
            created_at,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product: &str, price_cents: i64, units: i64) -> SaleLine {
        SaleLine {
            product_id: product.to_string(),
            name: format!("Product {}", product),
            unit_price: Money::from_cents(price_cents),
            quantity: Quantity::from_units(units),
        }
    }

    #[test]
    fn test_spec_scenario_percentage_discount() {
        // 3 × $10.00, 10% discount, no commission → subtotal $30.00, total $27.00.
        let totals = SaleTotals::compute(
            Money::from_cents(3000),
            &Discount::percent(10),
            Money::zero(),
            false,
        );

        assert_eq!(totals.subtotal.cents(), 3000);
        assert_eq!(totals.discount_amount.cents(), 300);
        assert_eq!(totals.total.cents(), 2700);
    }

    #[test]
    fn test_amount_discount_clamped_to_subtotal() {
        let totals = SaleTotals::compute(
            Money::from_cents(500),
            &Discount::Amount {
                amount: Money::from_cents(900),
            },
            Money::zero(),
            false,
        );

        assert_eq!(totals.total, Money::zero());
    }

    #[test]
    fn test_commission_added_when_not_absorbed() {
        let totals = SaleTotals::compute(
            Money::from_cents(1000),
            &Discount::None,
            Money::from_cents(35),
            false,
        );
        assert_eq!(totals.total.cents(), 1035);
    }

    #[test]
    fn test_commission_absorbed_in_cash_leaves_total() {
        let totals = SaleTotals::compute(
            Money::from_cents(1000),
            &Discount::None,
            Money::from_cents(35),
            true,
        );
        assert_eq!(totals.commission, Money::zero());
        assert_eq!(totals.total.cents(), 1000);
    }

    #[test]
    fn test_discount_and_commission_each_applied_once() {
        let totals = SaleTotals::compute(
            Money::from_cents(2000),
            &Discount::percent(50),
            Money::from_cents(100),
            false,
        );
        // 2000 - 1000 + 100, not discounted twice nor commission doubled.
        assert_eq!(totals.total.cents(), 1100);
    }

    #[test]
    fn test_compose_snapshot() {
        let payment = CheckoutPayment {
            cash: Money::from_cents(2700),
            discount: Discount::percent(10),
            ..Default::default()
        };

        let sale = Sale::compose(
            vec![line("p1", 1000, 3)],
            &payment,
            "cashier-1",
            "storeA",
            "tok-1",
            "sale-1",
            Utc::now(),
        );

        assert_eq!(sale.subtotal.cents(), 3000);
        assert_eq!(sale.total.cents(), 2700);
        assert_eq!(sale.lines.len(), 1);
        assert_eq!(sale.client_token, "tok-1");
    }

    #[test]
    fn test_discount_serde_tagged() {
        let json = serde_json::to_string(&Discount::percent(10)).unwrap();
        assert!(json.contains("\"type\":\"percentage\""));
        let back: Discount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Discount::Percentage { bps: 1000 });
    }
}
