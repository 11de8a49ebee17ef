use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::error::AppError;

/// Supported ISO-4217 currencies with their minor-unit exponent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    AUD,
    BHD,
    CAD,
    CHF,
    EUR,
    GBP,
    /// Indonesian Rupiah (no decimal places)
    IDR,
    /// Japanese Yen (no decimal places)
    JPY,
    KRW,
    KWD,
    /// Malaysian Ringgit (2 decimal places)
    MYR,
    /// US Dollar (2 decimal places)
    USD,
}

impl Currency {
    /// Returns the minor-unit exponent for this currency
    /// - IDR/JPY/KRW: 0
    /// - BHD/KWD: 3
    /// - everything else: 2
    pub fn scale(&self) -> u32 {
        match self {
            Currency::IDR | Currency::JPY | Currency::KRW => 0,
            Currency::BHD | Currency::KWD => 3,
            _ => 2,
        }
    }

    /// Rounds a decimal value to this currency's precision, half away from zero
    pub fn round(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.scale(), RoundingStrategy::MidpointAwayFromZero)
    }

    /// Returns the smallest unit for this currency
    pub fn smallest_unit(&self) -> Decimal {
        Decimal::new(1, self.scale())
    }

    /// Formats an amount for display with the correct decimal places
    pub fn format_amount(&self, amount: Decimal) -> String {
        let scale = self.scale();
        if scale == 0 {
            format!("{} {}", self, self.round(amount))
        } else {
            format!("{} {:.width$}", self, self.round(amount), width = scale as usize)
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Currency::AUD => "AUD",
            Currency::BHD => "BHD",
            Currency::CAD => "CAD",
            Currency::CHF => "CHF",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::IDR => "IDR",
            Currency::JPY => "JPY",
            Currency::KRW => "KRW",
            Currency::KWD => "KWD",
            Currency::MYR => "MYR",
            Currency::USD => "USD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "AUD" => Ok(Currency::AUD),
            "BHD" => Ok(Currency::BHD),
            "CAD" => Ok(Currency::CAD),
            "CHF" => Ok(Currency::CHF),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            "IDR" => Ok(Currency::IDR),
            "JPY" => Ok(Currency::JPY),
            "KRW" => Ok(Currency::KRW),
            "KWD" => Ok(Currency::KWD),
            "MYR" => Ok(Currency::MYR),
            "USD" => Ok(Currency::USD),
            _ => Err(AppError::validation(format!("Invalid currency: {}", s))),
        }
    }
}

impl TryFrom<&str> for Currency {
    type Error = AppError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}
