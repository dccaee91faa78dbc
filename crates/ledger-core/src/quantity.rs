//! # Quantity Module
//!
//! Fixed-point decimal with two places, stored as integer hundredths.
//!
//! Used for stock quantities, purchase/sale quantities, truck capacity (tons)
//! and distances (km): every two-decimal measure of the ledger.
//!
//! ```rust
//! use ledger_core::Quantity;
//!
//! let received = Quantity::from_units(100);
//! let sold = Quantity::from_hundredths(3_050); // 30.50
//!
//! assert_eq!((received - sold).to_string(), "69.50");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use ts_rs::TS;

/// A two-decimal quantity in hundredths.
///
/// Signed: stock can go negative when more is sold than was bought, and
/// stock adjustments carry a sign.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Quantity(i64);

impl Quantity {
    /// Creates a quantity from hundredths (`1250` = 12.50).
    #[inline]
    pub const fn from_hundredths(hundredths: i64) -> Self {
        Quantity(hundredths)
    }

    /// Creates a quantity from whole units (`12` = 12.00).
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Quantity(units * 100)
    }

    /// Returns the raw value in hundredths.
    #[inline]
    pub const fn hundredths(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Quantity(0)
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
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
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

impl Neg for Quantity {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Quantity(-self.0)
    }
}

impl Sum for Quantity {
    fn sum<I: Iterator<Item = Quantity>>(iter: I) -> Self {
        iter.fold(Quantity::zero(), |acc, q| acc + q)
    }
}
