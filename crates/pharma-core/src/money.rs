//! # Money Module
//!
//! Provides the `Money` type for handling prices and sale amounts safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The pharmacy server stores price as FLOAT and sends JSON numbers:     │
//! │    { "price": 0.1 } × 3 = 0.30000000000000004  ❌ WRONG!               │
//! │                                                                         │
//! │  OUR SOLUTION: Parse the decimal text into integer cents               │
//! │    "0.10" → 10 cents, × 3 = 30 cents → "0.30"                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use pharma_core::money::Money;
//!
//! let price = Money::parse_decimal("5.00").unwrap();
//! let total = price.multiply_quantity(10);
//! assert_eq!(total, Money::from_cents(5000));
//! assert_eq!(total.to_string(), "$50.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Where Money is Used
/// ```text
/// Product.price ──► SaleTotals.unit_price ──► SaleTotals.total
///                                                   │
///                                                   └──► SaleRecord.amount ──► POST /api/record-sale
///
/// GET /api/sales-stats ──► SalesStats.total_revenue
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use pharma_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Parses decimal text such as `"12.99"`, `"5"` or `"0.125"` into cents.
    ///
    /// ## Rules
    /// - Optional leading sign, digits, optional `.` and fraction digits
    /// - The first two fraction digits are exact
    /// - The third fraction digit rounds half-up (away from zero)
    /// - Exponents, thousands separators and currency symbols are rejected
    ///
    /// ## Example
    /// ```rust
    /// use pharma_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal("12.99").unwrap().cents(), 1299);
    /// assert_eq!(Money::parse_decimal("0.125").unwrap().cents(), 13);
    /// assert!(Money::parse_decimal("1e3").is_err());
    /// ```
    pub fn parse_decimal(input: &str) -> Result<Money, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        let text = input.trim();
        let (negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        let (whole, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid("expected a decimal number"));
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("expected a plain decimal number"));
        }

        let whole_value: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("value is too large"))?
        };

        let digit = |i: usize| frac.as_bytes().get(i).map_or(0, |b| i64::from(b - b'0'));
        let mut cents = digit(0) * 10 + digit(1);
        if digit(2) >= 5 {
            cents += 1;
        }

        let total = whole_value
            .checked_mul(100)
            .and_then(|v| v.checked_add(cents))
            .ok_or_else(|| invalid("value is too large"))?;

        Ok(Money(if negative { -total } else { total }))
    }

    /// Returns the value in cents.
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

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use pharma_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299); // $2.99
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.cents(), 897); // $8.97
    /// ```
    ///
    /// Saturates at the `i64` bounds instead of wrapping.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Returns the amount as a float, for the JSON wire format only.
    ///
    /// The server reads amounts with `float()`, so cents are divided once
    /// here at the boundary and never used for further arithmetic.
    #[inline]
    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money as `$12.99` (debugging and terminal output).
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
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

// =============================================================================
// Wire Format
// =============================================================================

/// Serde adapter for amounts the pharmacy server sends as decimals.
///
/// Use with `#[serde(with = "pharma_core::money::decimal")]`.
///
/// ## Accepted Inputs
/// - JSON number: `12.99`, `5`, `5.0`
/// - Numeric string: `"12.99"`
/// - `null`: read as zero (nullable FLOAT column)
///
/// Serialization writes a JSON number (`12.99`).
pub mod decimal {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Money;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum DecimalRepr {
        Number(serde_json::Number),
        Text(String),
        Null,
    }

    pub fn serialize<S>(money: &Money, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(money.to_f64())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Money, D::Error>
    where
        D: Deserializer<'de>,
    {
        match DecimalRepr::deserialize(deserializer)? {
            // serde_json prints floats in shortest round-trip form ("12.99")
            DecimalRepr::Number(n) => Money::parse_decimal(&n.to_string()).map_err(D::Error::custom),
            DecimalRepr::Text(text) => Money::parse_decimal(&text).map_err(D::Error::custom),
            DecimalRepr::Null => Ok(Money::zero()),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
