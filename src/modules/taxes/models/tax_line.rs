use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::modules::rates::{AppliedRate, RateKind, RateScope};

/// Tax computed by an external assessment (remote API or local table)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxLine {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_id: Option<String>,
    /// Informational percentage the assessor used, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<Decimal>,
    pub amount: Decimal,
}

impl TaxLine {
    pub fn new(name: impl Into<String>, amount: Decimal) -> Self {
        Self {
            name: name.into(),
            rate_id: None,
            rate: None,
            amount,
        }
    }

    /// Assessed taxes are flat, subtotal-level amounts
    pub fn into_applied_rate(self, order: i64) -> AppliedRate {
        AppliedRate {
            rate_id: self.rate_id,
            name: Some(self.name),
            order: Some(order),
            ..AppliedRate::flat(RateKind::Tax, RateScope::Subtotal, self.amount)
        }
    }
}
