use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Currency, Result};
use crate::modules::pricing::Plan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    PastDue,
    Trialing,
    Canceled,
    Finished,
}

impl SubscriptionStatus {
    /// Trialing, canceled and finished subscriptions are never prorated
    pub fn is_prorating(&self) -> bool {
        matches!(self, Self::Active | Self::PastDue)
    }
}

/// Add-on attached to a subscription at one point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonSnapshot {
    pub plan: Plan,
    /// Catalog item the add-on was created from; identifies the add-on
    /// across snapshots when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_item_id: Option<String>,
    pub quantity: Decimal,
    /// Explicit amount for custom-priced add-ons
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AddonSnapshot {
    pub fn new(plan: Plan, quantity: Decimal) -> Self {
        Self {
            plan,
            catalog_item_id: None,
            quantity,
            amount: None,
            description: None,
        }
    }

    pub fn with_catalog_item(mut self, catalog_item_id: impl Into<String>) -> Self {
        self.catalog_item_id = Some(catalog_item_id.into());
        self
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Catalog item id, falling back to the plan id
    pub fn identity(&self) -> &str {
        self.catalog_item_id.as_deref().unwrap_or(&self.plan.id)
    }
}

/// Billing-relevant state of a subscription before or after a change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionSnapshot {
    pub subscription_id: String,
    pub currency: Currency,
    pub status: SubscriptionStatus,
    pub plan: Plan,
    pub quantity: Decimal,
    /// Explicit amount for custom-priced plans
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub addons: Vec<AddonSnapshot>,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
}

impl SubscriptionSnapshot {
    pub fn new(
        subscription_id: impl Into<String>,
        currency: Currency,
        plan: Plan,
        quantity: Decimal,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            currency,
            status: SubscriptionStatus::Active,
            plan,
            quantity,
            amount: None,
            addons: Vec::new(),
            period_start,
            period_end,
        }
    }

    pub fn with_status(mut self, status: SubscriptionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_plan(mut self, plan: Plan) -> Self {
        self.plan = plan;
        self
    }

    pub fn with_addon(mut self, addon: AddonSnapshot) -> Self {
        self.addons.push(addon);
        self
    }

    pub fn find_addon(&self, identity: &str) -> Option<&AddonSnapshot> {
        self.addons.iter().find(|addon| addon.identity() == identity)
    }

    pub fn validate(&self) -> Result<()> {
        if self.period_end <= self.period_start {
            return Err(AppError::validation(format!(
                "subscription {}: period end {} must be after period start {}",
                self.subscription_id, self.period_end, self.period_start
            )));
        }

        if self.quantity < Decimal::ZERO {
            return Err(AppError::validation(format!(
                "subscription {}: quantity cannot be negative",
                self.subscription_id
            )));
        }

        if let Some(addon) = self.addons.iter().find(|addon| addon.quantity < Decimal::ZERO) {
            return Err(AppError::validation(format!(
                "subscription {}: add-on {} quantity cannot be negative",
                self.subscription_id,
                addon.identity()
            )));
        }

        let mut identities = HashSet::with_capacity(self.addons.len());
        if let Some(addon) = self.addons.iter().find(|addon| !identities.insert(addon.identity())) {
            return Err(AppError::validation(format!(
                "subscription {}: add-on {} is listed more than once",
                self.subscription_id,
                addon.identity()
            )));
        }

        self.plan.validate()
    }
}
