//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Ledger amounts have two decimal places. Storing them as integer       │
//! │  cents keeps sums, totals and balances exact:                          │
//! │    30 × 10.00 − 250.00 = 50.00  (3000000 − 25000 = 5000 cents)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use ledger_core::money::Money;
//!
//! let price = Money::from_cents(1099); // 10.99
//! let doubled = price * 2;             // 21.98
//! let total = price + Money::from_cents(500);
//!
//! assert_eq!(doubled.cents(), 2198);
//! assert_eq!(total.to_string(), "15.99");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::quantity::Quantity;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: a sale's balance due goes negative on overpayment
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Stored as INTEGER**: the database column holds the same cents value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use ledger_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ## Example
    /// ```rust
    /// use ledger_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    ///
    /// ## Note
    /// For negative amounts only the major unit carries the sign.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Creates a Money value from whole units (no minor part).
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor-unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies a unit price by a fixed-point quantity.
    ///
    /// The exact product is in hundredths of a cent; it is rounded half
    /// away from zero back to cents.
    ///
    /// ## Example
    /// ```rust
    /// use ledger_core::{Money, Quantity};
    ///
    /// let unit_price = Money::from_cents(299);          // 2.99
    /// let qty = Quantity::from_hundredths(250);          // 2.50
    /// assert_eq!(unit_price.multiply_quantity(qty).cents(), 748); // 7.475 → 7.48
    /// ```
    pub fn multiply_quantity(&self, qty: Quantity) -> Money {
        // i128 so that 99,999,999.99 × 99,999,999.99 cannot overflow
        let product = self.0 as i128 * qty.hundredths() as i128;
        let rounded = if product >= 0 {
            (product + 50) / 100
        } else {
            (product - 50) / 100
        };
        Money(rounded as i64)
    }

    /// Ratio `self / base × 100` for display, or `0.0` when `base` is zero.
    ///
    /// ## Example
    /// ```rust
    /// use ledger_core::money::Money;
    ///
    /// let margin = Money::from_cents(250);
    /// assert_eq!(margin.percentage_of(Money::from_cents(1000)), 25.0);
    /// assert_eq!(margin.percentage_of(Money::zero()), 0.0);
    /// ```
    pub fn percentage_of(&self, base: Money) -> f64 {
        if base.is_zero() {
            return 0.0;
        }
        self.0 as f64 / base.0 as f64 * 100.0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal display (`"1234.56"`, `"-5.50"`), no currency symbol.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by a whole count.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, count: i64) -> Self {
        Money(self.0 * count)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
