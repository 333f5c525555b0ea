//! # Quantity Module
//!
//! Quantities in integer milliunits, plus the unit-of-measure catalog.
//!
//! ## Why Milliunits?
//! Weight-sold products (kg, g, l, ...) need fractional quantities: a
//! customer buys 0.450 kg of cheese. Floats would reintroduce the rounding
//! problems the integer `Money` type exists to avoid, so quantities use the
//! same trick one level down: 1.000 unit = 1000 milliunits. Whole-unit
//! products always carry multiples of 1000.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

// =============================================================================
// Quantity Type
// =============================================================================

/// A stock or cart quantity in milliunits (1.000 unit = 1000).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Quantity(i64);

impl Quantity {
    /// Creates a quantity from whole units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Quantity(units * 1000)
    }

    /// Creates a quantity from milliunits.
    #[inline]
    pub const fn from_milli(milli: i64) -> Self {
        Quantity(milli)
    }

    /// Returns the raw milliunit count.
    #[inline]
    pub const fn milli(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit part, truncated toward zero.
    #[inline]
    pub const fn whole_units(&self) -> i64 {
        self.0 / 1000
    }

    /// Zero quantity.
    #[inline]
    pub const fn zero() -> Self {
        Quantity(0)
    }

    /// Checks if the quantity is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the quantity is strictly positive.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Subtraction clamped at zero. Batch quantities never go negative.
    #[inline]
    pub fn saturating_sub(self, other: Quantity) -> Quantity {
        Quantity((self.0 - other.0).max(0))
    }

    /// Returns the smaller of two quantities.
    #[inline]
    pub fn min(self, other: Quantity) -> Quantity {
        Quantity(self.0.min(other.0))
    }
}

/// Displays whole units plainly ("3") and fractions with three decimals
/// ("2.500").
impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 1000 == 0 {
            write!(f, "{}", self.0 / 1000)
        } else {
            let sign = if self.0 < 0 { "-" } else { "" };
            write!(f, "{}{}.{:03}", sign, (self.0 / 1000).abs(), (self.0 % 1000).abs())
        }
    }
}

impl Add for Quantity {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Quantity(self.0 + other.0)
    }
}

impl AddAssign for Quantity {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Quantity {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Quantity(self.0 - other.0)
    }
}

impl SubAssign for Quantity {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl std::iter::Sum for Quantity {
    fn sum<I: Iterator<Item = Quantity>>(iter: I) -> Self {
        iter.fold(Quantity::zero(), |acc, q| acc + q)
    }
}

// =============================================================================
// Unit of Measure
// =============================================================================

/// How a product is sold: by the piece or by weight/measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitOfMeasure {
    /// Sold by the piece (integer counts).
    #[default]
    Unit,
    Kg,
    G,
    Lb,
    Oz,
    L,
    Ml,
    M,
    Cm,
}

impl UnitOfMeasure {
    /// Whether cart lines for this unit carry fractional quantities.
    ///
    /// Everything except `Unit` is entered from a scale or tape measure.
    pub const fn is_weighed(&self) -> bool {
        !matches!(self, UnitOfMeasure::Unit)
    }

    /// The wire/display abbreviation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            UnitOfMeasure::Unit => "unit",
            UnitOfMeasure::Kg => "kg",
            UnitOfMeasure::G => "g",
            UnitOfMeasure::Lb => "lb",
            UnitOfMeasure::Oz => "oz",
            UnitOfMeasure::L => "l",
            UnitOfMeasure::Ml => "ml",
            UnitOfMeasure::M => "m",
            UnitOfMeasure::Cm => "cm",
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
