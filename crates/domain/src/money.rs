// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A monetary amount held at two decimal places.
///
/// Construction always rounds half away from zero to cents, so every value
/// in the ledger has an exact minor-unit representation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates an amount, rounding to cents.
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        Self(amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Creates an amount from integer minor units.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Largest magnitude the ledger can store: `i64::MAX` minor units.
    #[must_use]
    pub fn max_storable() -> Self {
        Self::from_cents(i64::MAX)
    }

    /// Returns whether the amount fits in an `i64` of cents.
    #[must_use]
    pub fn is_storable(self) -> bool {
        self.0.abs() <= Self::max_storable().0
    }

    /// Converts to integer minor units for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount does not fit in an `i64` of cents.
    pub fn to_cents(self) -> Result<i64, DomainError> {
        self.0
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.round().to_i64())
            .ok_or_else(|| DomainError::InvalidInput {
                field: "amount",
                message: format!("{self} is out of range"),
            })
    }

    /// Returns the underlying decimal.
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Returns whether the amount is exactly zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Returns whether the amount is greater than zero.
    #[must_use]
    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Returns whether the amount is below zero.
    #[must_use]
    pub fn is_negative(self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Adds, returning `None` if the sum leaves the storable range.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0
            .checked_add(other.0)
            .map(Self::new)
            .filter(|sum| sum.is_storable())
    }

    /// Adds, clamping the sum to the storable range.
    #[must_use]
    pub fn saturating_add(self, other: Self) -> Self {
        self.checked_add(other).unwrap_or_else(|| {
            if other.is_negative() {
                Self(-Self::max_storable().0)
            } else {
                Self::max_storable()
            }
        })
    }

    /// Subtracts, flooring the result at zero.
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        if other >= self {
            return Self::ZERO;
        }
        self.0
            .checked_sub(other.0)
            .map_or_else(Self::max_storable, Self::new)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

/// Totals saturate at the storable range rather than overflowing.
impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
