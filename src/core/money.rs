use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::{AppError, Currency, Result};

/// Fixed-point currency value: integer minor units tagged with a currency.
///
/// Immutable. Every binary operation requires both operands to share a
/// currency and fails with `CurrencyMismatch` otherwise. Arithmetic is
/// checked; overflow surfaces as `AppError::Overflow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    currency: Currency,
    minor_units: i64,
}

impl Money {
    pub fn new(currency: Currency, minor_units: i64) -> Self {
        Self {
            currency,
            minor_units,
        }
    }

    pub fn zero(currency: Currency) -> Self {
        Self::new(currency, 0)
    }

    /// Build a Money value from a decimal, rounding half away from zero to
    /// the currency's minor-unit precision.
    pub fn from_decimal(currency: Currency, amount: Decimal) -> Result<Self> {
        let scale = currency.scale();
        let mut rounded = currency.round(amount);
        rounded.rescale(scale);
        if rounded.scale() != scale {
            return Err(AppError::overflow(format!(
                "{} cannot be represented in {}",
                amount, currency
            )));
        }

        let minor_units = i64::try_from(rounded.mantissa()).map_err(|_| {
            AppError::overflow(format!("{} exceeds the {} minor-unit range", amount, currency))
        })?;

        Ok(Self::new(currency, minor_units))
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn minor_units(&self) -> i64 {
        self.minor_units
    }

    /// Decimal representation at the currency's native precision
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.minor_units, self.currency.scale())
    }

    pub fn add(&self, other: &Money) -> Result<Money> {
        self.ensure_same_currency(other)?;
        let minor_units = self
            .minor_units
            .checked_add(other.minor_units)
            .ok_or_else(|| AppError::overflow(format!("{} + {}", self, other)))?;
        Ok(Money::new(self.currency, minor_units))
    }

    pub fn subtract(&self, other: &Money) -> Result<Money> {
        self.ensure_same_currency(other)?;
        let minor_units = self
            .minor_units
            .checked_sub(other.minor_units)
            .ok_or_else(|| AppError::overflow(format!("{} - {}", self, other)))?;
        Ok(Money::new(self.currency, minor_units))
    }

    pub fn negate(&self) -> Result<Money> {
        let minor_units = self
            .minor_units
            .checked_neg()
            .ok_or_else(|| AppError::overflow(format!("-({})", self)))?;
        Ok(Money::new(self.currency, minor_units))
    }

    /// Multiply by a decimal factor, rounding the product to currency precision
    pub fn multiply(&self, factor: Decimal) -> Result<Money> {
        let product = self
            .to_decimal()
            .checked_mul(factor)
            .ok_or_else(|| AppError::overflow(format!("{} * {}", self, factor)))?;
        Money::from_decimal(self.currency, product)
    }

    pub fn max(&self, other: &Money) -> Result<Money> {
        Ok(if self.greater_than(other)? { *self } else { *other })
    }

    pub fn min(&self, other: &Money) -> Result<Money> {
        Ok(if self.greater_than(other)? { *other } else { *self })
    }

    pub fn greater_than(&self, other: &Money) -> Result<bool> {
        self.ensure_same_currency(other)?;
        Ok(self.minor_units > other.minor_units)
    }

    pub fn is_zero(&self) -> bool {
        self.minor_units == 0
    }

    pub fn is_negative(&self) -> bool {
        self.minor_units < 0
    }

    /// Sum an iterator of Money values, starting from zero in `currency`
    pub fn sum<'a, I>(currency: Currency, values: I) -> Result<Money>
    where
        I: IntoIterator<Item = &'a Money>,
    {
        values
            .into_iter()
            .try_fold(Money::zero(currency), |acc, value| acc.add(value))
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<()> {
        if self.currency != other.currency {
            return Err(AppError::CurrencyMismatch {
                expected: self.currency,
                found: other.currency,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.currency, self.to_decimal())
    }
}
