//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    45.00 is stored as 4500. Tax rounding happens exactly once, at a     │
//! │    single well-defined point (`Money::tax`), with a documented rule.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use minimart_core::money::Money;
//!
//! let price = Money::from_cents(4500); // 45.00
//! let total = price + Money::from_cents(500);
//! assert_eq!(total.cents(), 5000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::TaxRate;

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: stock ledgers and adjustments need negative deltas,
///   so money math must tolerate signed intermediates too
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - Every monetary value in the system flows through this type; the UI
///   layer is the only place a decimal string ever appears
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ```rust
    /// use minimart_core::money::Money;
    ///
    /// let price = Money::from_cents(4500); // 45.00
    /// assert_eq!(price.cents(), 4500);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -5.50, not -4.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates tax, rounding half away from zero to whole cents.
    ///
    /// ## Rounding Rule
    /// ```text
    /// tax = round(amount × rate, 2 decimal places, half-away-from-zero)
    /// ```
    /// Half-away-from-zero is the rule cash registers and tax offices
    /// expect: 0.825 → 0.83, -0.825 → -0.83.
    ///
    /// ## Example
    /// ```rust
    /// use minimart_core::money::Money;
    /// use minimart_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_cents(4500); // 45.00
    /// let rate = TaxRate::from_bps(700);      // 7%
    /// assert_eq!(subtotal.tax(rate).cents(), 315); // 3.15
    /// ```
    pub fn tax(&self, rate: TaxRate) -> Money {
        // i128 intermediates: amount_cents * bps cannot overflow
        let numer = self.0 as i128 * rate.bps() as i128;
        let cents = if numer >= 0 {
            (numer + 5_000) / 10_000
        } else {
            -((-numer + 5_000) / 10_000)
        };
        Money::from_cents(cents as i64)
    }

    /// Multiplies money by a quantity (line total = unit price × qty).
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Display implementation shows money in a human-readable format.
///
/// This is for receipts and debugging; localization is out of scope.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
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

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}
