//! The ZorBit reward-point amount.
//!
//! Awards can be fractional (a late approval earns half a ZorBit), so
//! amounts are kept as integer hundredths and only turned into decimal
//! numbers at the JSON boundary. Arithmetic on balances therefore never
//! accumulates floating-point error.

use std::fmt;
use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Number of stored units per whole ZorBit.
const UNITS_PER_ZORBIT: i64 = 100;

/// A signed amount of ZorBits with two decimal places of precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ZorBits(i64);

impl ZorBits {
    /// Zero ZorBits.
    pub const ZERO: Self = Self(0);

    /// Largest amount an administrator may credit in one award.
    pub const MAX_AWARD: Self = Self::whole(1_000_000);

    /// Creates an amount from a whole number of ZorBits.
    #[must_use]
    pub const fn whole(n: i64) -> Self {
        Self(n.saturating_mul(UNITS_PER_ZORBIT))
    }

    /// Creates an amount from hundredths of a ZorBit (the storage unit).
    #[must_use]
    pub const fn from_hundredths(units: i64) -> Self {
        Self(units)
    }

    /// Returns the amount in hundredths of a ZorBit.
    #[must_use]
    pub const fn hundredths(self) -> i64 {
        self.0
    }

    /// Converts a decimal amount, rounding to the nearest hundredth.
    ///
    /// Returns `None` for non-finite input.
    #[must_use]
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        Some(Self((value * UNITS_PER_ZORBIT as f64).round() as i64))
    }

    /// Returns the amount as a decimal number.
    #[must_use]
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / UNITS_PER_ZORBIT as f64
    }

    /// Returns `true` when the amount is strictly greater than zero.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl Add for ZorBits {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for ZorBits {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for ZorBits {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl std::iter::Sum for ZorBits {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for ZorBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / UNITS_PER_ZORBIT;
        let frac = (self.0 % UNITS_PER_ZORBIT).abs();
        let sign = if self.0 < 0 && whole == 0 { "-" } else { "" };
        match frac {
            0 => write!(f, "{sign}{whole}"),
            f_ if f_ % 10 == 0 => write!(f, "{sign}{whole}.{}", f_ / 10),
            f_ => write!(f, "{sign}{whole}.{f_:02}"),
        }
    }
}

impl Serialize for ZorBits {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % UNITS_PER_ZORBIT == 0 {
            serializer.serialize_i64(self.0 / UNITS_PER_ZORBIT)
        } else {
            serializer.serialize_f64(self.as_f64())
        }
    }
}

impl<'de> Deserialize<'de> for ZorBits {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Self::from_f64(value)
            .ok_or_else(|| serde::de::Error::custom("ZorBit amount must be a finite number"))
    }
}
