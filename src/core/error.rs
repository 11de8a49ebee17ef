use rust_decimal::Decimal;

use crate::core::currency::Currency;

/// Crate-wide Result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Calculation error type
///
/// Every variant is deterministic: retrying an identical calculation yields
/// the identical error.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Arithmetic between Money values of different currencies
    #[error("Currency mismatch: expected {expected}, found {found}")]
    CurrencyMismatch { expected: Currency, found: Currency },

    /// Tier list is unordered, overlapping, non-contiguous or not open-ended
    #[error("Invalid tier: {0}")]
    InvalidTier(String),

    /// Plan or add-on cannot be priced (e.g. custom pricing without an amount)
    #[error("Pricing error: {0}")]
    Pricing(String),

    /// A rate identifier failed to resolve during strict expansion
    #[error("Unknown rate: {0}")]
    UnknownRate(String),

    /// Calculation would produce a negative document total
    #[error("Calculated total is negative ({total}), check {field}")]
    NegativeTotal { field: &'static str, total: Decimal },

    /// Money arithmetic exceeded the representable range
    #[error("Overflow: {0}")]
    Overflow(String),

    /// Malformed input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

// Helper functions for common error scenarios
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn invalid_tier(msg: impl Into<String>) -> Self {
        AppError::InvalidTier(msg.into())
    }

    pub fn pricing(msg: impl Into<String>) -> Self {
        AppError::Pricing(msg.into())
    }

    pub fn unknown_rate(id: impl Into<String>) -> Self {
        AppError::UnknownRate(id.into())
    }

    pub fn overflow(msg: impl Into<String>) -> Self {
        AppError::Overflow(msg.into())
    }

    /// Field context to present to the end user, where one applies
    pub fn field(&self) -> Option<&'static str> {
        match self {
            AppError::NegativeTotal { field, .. } => Some(field),
            AppError::UnknownRate(_) => Some("rates"),
            AppError::InvalidTier(_) | AppError::Pricing(_) => Some("items"),
            _ => None,
        }
    }
}
