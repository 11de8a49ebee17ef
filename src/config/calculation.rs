use serde::Deserialize;

use crate::core::{AppError, Result};

/// Highest number of decimal places accepted for prorated quantities
const MAX_PRORATION_PRECISION: u32 = 10;

/// Knobs for the calculation core, passed explicitly to calculators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CalculationConfig {
    /// Decimal places kept on prorated quantities (visible to the customer)
    pub proration_precision: u32,
    /// Fail with `UnknownRate` instead of dropping unresolvable rate ids
    pub strict_rate_resolution: bool,
}

impl Default for CalculationConfig {
    fn default() -> Self {
        Self {
            proration_precision: 4,
            strict_rate_resolution: false,
        }
    }
}

impl CalculationConfig {
    pub fn strict() -> Self {
        Self {
            strict_rate_resolution: true,
            ..Self::default()
        }
    }

    pub(crate) fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let proration_precision = match lookup("PRORATION_PRECISION") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                AppError::Configuration(format!("Invalid PRORATION_PRECISION: {}", raw))
            })?,
            None => defaults.proration_precision,
        };

        let strict_rate_resolution = match lookup("STRICT_RATE_RESOLUTION") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                AppError::Configuration(format!("Invalid STRICT_RATE_RESOLUTION: {}", raw))
            })?,
            None => defaults.strict_rate_resolution,
        };

        Ok(Self {
            proration_precision,
            strict_rate_resolution,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.proration_precision > MAX_PRORATION_PRECISION {
            return Err(AppError::Configuration(format!(
                "Proration precision cannot exceed {} decimal places",
                MAX_PRORATION_PRECISION
            )));
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
