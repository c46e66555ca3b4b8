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
//! │    245.81 × 50% = 122.905  →  122.90 or 122.91 depending on the bits   │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    24581 cents × 5000 bps = 12291 cents (rounded half away from zero)  │
//! │    Balance = 24581 - 12291 = 12290 cents, deposit + balance == total   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use lodging_core::money::Money;
//! use lodging_core::types::Percent;
//!
//! let nightly = Money::from_cents(7500); // $75.00
//! let subtotal = nightly.times(3);       // $225.00
//! let tax = subtotal.percentage(Percent::from_bps(925));
//! assert_eq!(tax.cents(), 2081);         // $20.81
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::types::Percent;

/// Basis points in 100%.
const BPS_SCALE: i128 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for surcharges expressed as
///   negative discounts
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  Site.base_price ──► rule override? ──► price_per_night × nights        │
/// │                                              │                          │
/// │                                              ▼                          │
/// │                         subtotal ──► discount ──► tax ──► total         │
/// │                                                            │            │
/// │                                          deposit ◄─────────┴──► balance │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use lodging_core::money::Money;
    ///
    /// let nightly = Money::from_cents(7500); // Represents $75.00
    /// assert_eq!(nightly.cents(), 7500);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (dollars and cents).
    ///
    /// ## Example
    /// ```rust
    /// use lodging_core::money::Money;
    ///
    /// let nightly = Money::from_major_minor(72, 50); // $72.50
    /// assert_eq!(nightly.cents(), 7250);
    ///
    /// let negative = Money::from_major_minor(-5, 50); // -$5.50
    /// assert_eq!(negative.cents(), -550);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Creates a Money value from whole dollars.
    #[inline]
    pub const fn from_dollars(dollars: i64) -> Self {
        Money(dollars * 100)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
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

    /// Multiplies a nightly amount by a number of nights.
    ///
    /// ## Example
    /// ```rust
    /// use lodging_core::money::Money;
    ///
    /// let nightly = Money::from_cents(7500);
    /// assert_eq!(nightly.times(3).cents(), 22500); // $225.00
    /// ```
    #[inline]
    pub const fn times(&self, nights: u32) -> Self {
        Money(self.0 * nights as i64)
    }

    /// Returns `pct` of this amount, rounded to the cent.
    ///
    /// ## Rounding
    /// Half away from zero, so a negative percentage (a surcharge) rounds
    /// symmetrically with its positive counterpart:
    /// ```text
    ///   $10.00 ×  8.25% =  $0.825 →  $0.83
    ///   $10.00 × -8.25% = -$0.825 → -$0.83
    /// ```
    ///
    /// ## Example
    /// ```rust
    /// use lodging_core::money::Money;
    /// use lodging_core::types::Percent;
    ///
    /// let total = Money::from_cents(24581);
    /// let deposit = total.percentage(Percent::from_bps(5000));
    /// assert_eq!(deposit.cents(), 12291);
    /// ```
    pub fn percentage(&self, pct: Percent) -> Money {
        // i128 so large totals times 10_000 bps cannot overflow
        let scaled = self.0 as i128 * pct.bps() as i128;
        Money::from_cents(div_round_half_away(scaled, BPS_SCALE) as i64)
    }

    /// Returns the smaller of two amounts.
    #[inline]
    pub fn min(self, other: Money) -> Money {
        if other.0 < self.0 {
            other
        } else {
            self
        }
    }
}

/// Integer division rounding half away from zero. `denominator` must be positive.
fn div_round_half_away(numerator: i128, denominator: i128) -> i128 {
    let half = denominator / 2;
    if numerator >= 0 {
        (numerator + half) / denominator
    } else {
        (numerator - half) / denominator
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for debugging and seed output. The checkout UI formats amounts
/// itself.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
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

/// Multiplication by i64.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
