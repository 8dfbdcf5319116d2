//! # Money Module
//!
//! Provides the `Money` type for fines, penalty rates and caps.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  With floats:                                                           │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A fine of 12 days × 0.35/day summed over a year of revenue             │
//! │  drifts by fractions of a cent per penalty.                             │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    12 × 35 cents = 420 cents, exactly                                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use akul_core::money::Money;
//!
//! let per_day: Money = "10.00".parse().unwrap();
//! let fine = per_day.checked_multiply_days(5).unwrap();
//! assert_eq!(fine.cents(), 5000);
//! assert_eq!(fine.to_string(), "50.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  Settings.penalty_per_day ──► overdue_days × rate ──► Circulation.fine │
/// │                                      │                                  │
/// │  Settings.max_penalty ───────► cap (when enabled)                       │
/// │                                      │                                  │
/// │                                      ▼                                  │
/// │                               Penalty.amount ──► chart revenue series   │
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
    /// use akul_core::money::Money;
    ///
    /// let fine = Money::from_cents(1050);
    /// assert_eq!(fine.cents(), 1050);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
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

    /// Multiplies a per-day rate by a number of days.
    ///
    /// ## User Workflow
    /// ```text
    /// Rate: 10.00/day, 5 days late
    ///      │
    ///      ▼
    /// checked_multiply_days(5) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Fine: 50.00
    /// ```
    ///
    /// Returns `None` when the product does not fit in an `i64`.
    #[inline]
    pub const fn checked_multiply_days(&self, days: i64) -> Option<Self> {
        match self.0.checked_mul(days) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Converts to a floating point number of major units.
    ///
    /// ## Note
    /// For chart series only. Never feed the result back into arithmetic.
    #[inline]
    pub fn to_major_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Parses decimal text such as `"10"`, `"10.5"` or `"10.50"`.
///
/// ## Rules
/// - Surrounding whitespace is ignored
/// - At most two fractional digits
/// - Negative amounts are rejected (fines are never negative)
///
/// ## Example
/// ```rust
/// use akul_core::money::Money;
///
/// assert_eq!("10.5".parse::<Money>().unwrap().cents(), 1050);
/// assert!("10.505".parse::<Money>().is_err());
/// assert!("-1".parse::<Money>().is_err());
/// ```
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        if s.is_empty() {
            return Err(ValidationError::Required {
                field: "amount".to_string(),
            });
        }
        if s.starts_with('-') {
            return Err(invalid("must not be negative"));
        }

        let (major_text, minor_text) = match s.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (s, ""),
        };

        if minor_text.len() > 2 {
            return Err(invalid("at most two decimal places"));
        }
        if major_text.is_empty() && minor_text.is_empty() {
            return Err(invalid("not a number"));
        }
        let all_digits = |text: &str| text.chars().all(|c| c.is_ascii_digit());
        if !all_digits(major_text) || !all_digits(minor_text) {
            return Err(invalid("not a number"));
        }

        let major: i64 = if major_text.is_empty() {
            0
        } else {
            major_text.parse().map_err(|_| invalid("too large"))?
        };
        let minor: i64 = match minor_text.len() {
            0 => 0,
            1 => minor_text.parse::<i64>().map_err(|_| invalid("not a number"))? * 10,
            _ => minor_text.parse().map_err(|_| invalid("not a number"))?,
        };

        major
            .checked_mul(100)
            .and_then(|cents| cents.checked_add(minor))
            .map(Money)
            .ok_or_else(|| invalid("too large"))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders as a plain decimal with two places, e.g. `50.00`.
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

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(5000).to_string(), "50.00");
        assert_eq!(Money::from_cents(1005).to_string(), "10.05");
        assert_eq!(Money::from_cents(0).to_string(), "0.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
    }

    #[test]
    fn test_parse() {
        assert_eq!("10".parse::<Money>().unwrap().cents(), 1000);
        assert_eq!("10.5".parse::<Money>().unwrap().cents(), 1050);
        assert_eq!(" 10.50 ".parse::<Money>().unwrap().cents(), 1050);
        assert_eq!(".75".parse::<Money>().unwrap().cents(), 75);
        assert_eq!("0".parse::<Money>().unwrap().cents(), 0);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            "".parse::<Money>(),
            Err(ValidationError::Required { .. })
        ));
        assert!("abc".parse::<Money>().is_err());
        assert!("1.2.3".parse::<Money>().is_err());
        assert!("1.234".parse::<Money>().is_err());
        assert!("-5".parse::<Money>().is_err());
        assert!(".".parse::<Money>().is_err());
        assert!("99999999999999999999".parse::<Money>().is_err());
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(250);
        assert_eq!((a + b).cents(), 1250);
        assert_eq!((a - b).cents(), 750);
        assert_eq!((b * 4).cents(), 1000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 1500);
    }

    #[test]
    fn test_checked_multiply_days() {
        let rate = Money::from_cents(1000);
        assert_eq!(rate.checked_multiply_days(5), Some(Money::from_cents(5000)));
        assert_eq!(rate.checked_multiply_days(0), Some(Money::zero()));

        let huge = Money::from_cents(i64::MAX / 10);
        assert_eq!(huge.checked_multiply_days(19), None);
    }

    #[test]
    fn test_to_major_f64() {
        assert!((Money::from_cents(1234).to_major_f64() - 12.34).abs() < 1e-9);
    }
}
