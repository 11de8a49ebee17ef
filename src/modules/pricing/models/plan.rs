use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};
use crate::modules::pricing::models::tier::{Tier, TierSet};

/// How a plan turns a quantity into priced lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingMode {
    PerUnit,
    Volume,
    Tiered,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingInterval {
    Day,
    Week,
    Month,
    Year,
}

/// Plan (or add-on) price definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub pricing_mode: PricingMode,
    /// Unit price for per-unit plans
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiers: Option<TierSet>,
    pub interval: BillingInterval,
    pub interval_count: u32,
}

impl Plan {
    pub fn per_unit(id: impl Into<String>, name: impl Into<String>, amount: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            pricing_mode: PricingMode::PerUnit,
            amount: Some(amount),
            tiers: None,
            interval: BillingInterval::Month,
            interval_count: 1,
        }
    }

    /// Custom-priced plan: the amount is supplied by each subscription
    pub fn custom(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            pricing_mode: PricingMode::Custom,
            amount: None,
            ..Self::per_unit(id, name, Decimal::ZERO)
        }
    }

    pub fn tiered(id: impl Into<String>, name: impl Into<String>, tiers: Vec<Tier>) -> Result<Self> {
        Self::with_tiers(id, name, PricingMode::Tiered, tiers)
    }

    pub fn volume(id: impl Into<String>, name: impl Into<String>, tiers: Vec<Tier>) -> Result<Self> {
        Self::with_tiers(id, name, PricingMode::Volume, tiers)
    }

    fn with_tiers(
        id: impl Into<String>,
        name: impl Into<String>,
        pricing_mode: PricingMode,
        tiers: Vec<Tier>,
    ) -> Result<Self> {
        Ok(Self {
            pricing_mode,
            amount: None,
            tiers: Some(TierSet::new(tiers)?),
            ..Self::per_unit(id, name, Decimal::ZERO)
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_interval(mut self, interval: BillingInterval, interval_count: u32) -> Self {
        self.interval = interval;
        self.interval_count = interval_count;
        self
    }

    /// Billing cycle length as `(interval, count)`
    pub fn cycle(&self) -> (BillingInterval, u32) {
        (self.interval, self.interval_count)
    }

    /// Check that the pricing mode has what it needs to price a quantity
    pub fn validate(&self) -> Result<()> {
        if self.interval_count == 0 {
            return Err(AppError::validation(format!(
                "plan {} must have an interval_count of at least 1",
                self.id
            )));
        }

        match self.pricing_mode {
            PricingMode::PerUnit if self.amount.is_none() => Err(AppError::pricing(format!(
                "per-unit plan {} has no amount",
                self.id
            ))),
            PricingMode::Volume | PricingMode::Tiered if self.tiers.is_none() => {
                Err(AppError::invalid_tier(format!("plan {} has no tiers", self.id)))
            }
            _ => Ok(()),
        }
    }
}
