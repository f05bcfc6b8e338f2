//! # Quantity Module
//!
//! Ingredient quantities in tenths of a unit.
//!
//! Inventory is tracked with one decimal digit of precision: half a scoop of
//! pearls is `Quantity::from_tenths(5)`, a cup is `Quantity::ONE`. Like
//! [`Money`](crate::money::Money), the value is an integer so depletion sums
//! are exact.
//!
//! ## Sign Convention
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  A Quantity used as a ledger delta is CONSUMPTION:                     │
//! │                                                                         │
//! │    +6.0  → on_hand decreases by 6.0   (recipe, cup, ADD, EXTRA)        │
//! │    -2.0  → on_hand increases by 2.0   (REMOVE, LESS)                   │
//! │                                                                         │
//! │  Stored modification magnitudes are always >= 0; the kind picks sign.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub};
use ts_rs::TS;

/// An ingredient amount in tenths of a unit.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Quantity(i64);

impl Quantity {
    /// Nothing.
    pub const ZERO: Quantity = Quantity(0);

    /// One whole unit (one cup, one pump).
    pub const ONE: Quantity = Quantity(10);

    /// Creates a quantity from tenths of a unit.
    #[inline]
    pub const fn from_tenths(tenths: i64) -> Self {
        Quantity(tenths)
    }

    /// Creates a quantity of whole units.
    ///
    /// ```rust
    /// use teahouse_core::quantity::Quantity;
    ///
    /// assert_eq!(Quantity::from_units(2).tenths(), 20);
    /// ```
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Quantity(units * 10)
    }

    /// Returns the raw value in tenths.
    #[inline]
    pub const fn tenths(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the magnitude.
    #[inline]
    pub const fn abs(&self) -> Self {
        Quantity(self.0.saturating_abs())
    }

    /// Multiplies a per-drink amount by the line quantity.
    ///
    /// ```rust
    /// use teahouse_core::quantity::Quantity;
    ///
    /// // 0.5 units of syrup per drink, 3 drinks
    /// assert_eq!(Quantity::from_tenths(5).scale(3), Quantity::from_tenths(15));
    /// ```
    ///
    /// Saturates at the `i64` bounds. Validated requests stay far below them.
    #[inline]
    pub const fn scale(&self, line_quantity: i64) -> Self {
        Quantity(self.0.saturating_mul(line_quantity))
    }
}

/// Renders as units with one decimal: "6.0", "-0.5".
impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{}{}.{}", sign, abs / 10, abs % 10)
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

impl Neg for Quantity {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Quantity(-self.0)
    }
}
