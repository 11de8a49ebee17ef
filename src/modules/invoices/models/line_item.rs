// Line items of an invoice, estimate or credit note, and pending lines
// produced by subscription proration.
//
// `amount` is always derived by the calculator as round(quantity × unit_cost),
// less any tax-inclusive portion, and rendered at the currency's precision.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Currency, Money, Result};
use crate::modules::pricing::PricedLine;
use crate::modules::rates::{AppliedRate, RateField};

fn default_true() -> bool {
    true
}

/// Calculated line item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Fractional quantities are allowed (prorated lines carry 4 decimals)
    pub quantity: Decimal,

    pub unit_cost: Decimal,

    /// Pre-discount, pre-tax amount of the line
    #[serde(default)]
    pub amount: Decimal,

    #[serde(default = "default_true")]
    pub taxable: bool,

    #[serde(default = "default_true")]
    pub discountable: bool,

    #[serde(default)]
    pub discounts: Vec<AppliedRate>,

    #[serde(default)]
    pub taxes: Vec<AppliedRate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_item_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_start: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_end: Option<DateTime<Utc>>,

    #[serde(default)]
    pub prorated: bool,
}

impl LineItem {
    pub fn new(name: impl Into<String>, quantity: Decimal, unit_cost: Decimal) -> Self {
        Self {
            item_type: None,
            name: name.into(),
            description: None,
            quantity,
            unit_cost,
            amount: Decimal::ZERO,
            taxable: true,
            discountable: true,
            discounts: Vec::new(),
            taxes: Vec::new(),
            subscription_id: None,
            plan_id: None,
            catalog_item_id: None,
            period_start: None,
            period_end: None,
            prorated: false,
        }
    }

    /// Build a line from a priced plan entry; the tier range (if any) is
    /// appended to the plan description.
    pub fn from_priced(priced: &PricedLine) -> Self {
        let description = [priced.description.as_deref(), priced.tier_description.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            item_type: Some("plan".to_string()),
            plan_id: Some(priced.plan_id.clone()),
            description: (!description.is_empty()).then_some(description),
            ..Self::new(priced.name.clone(), priced.quantity, priced.unit_cost)
        }
    }

    pub fn with_discounts(mut self, discounts: Vec<AppliedRate>) -> Self {
        self.discounts = discounts;
        self
    }

    pub fn with_taxes(mut self, taxes: Vec<AppliedRate>) -> Self {
        self.taxes = taxes;
        self
    }

    /// round(quantity × unit_cost) in `currency`
    pub fn gross_amount(&self, currency: Currency) -> Result<Money> {
        let raw = self.quantity.checked_mul(self.unit_cost).ok_or_else(|| {
            AppError::overflow(format!(
                "line item '{}': {} × {}",
                self.name, self.quantity, self.unit_cost
            ))
        })?;
        Money::from_decimal(currency, raw)
    }
}

/// Line item as submitted in a calculation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemInput {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub quantity: Decimal,

    pub unit_cost: Decimal,

    #[serde(default = "default_true")]
    pub taxable: bool,

    #[serde(default = "default_true")]
    pub discountable: bool,

    #[serde(default)]
    pub discounts: RateField,

    #[serde(default)]
    pub taxes: RateField,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_item_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_start: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_end: Option<DateTime<Utc>>,

    #[serde(default)]
    pub prorated: bool,
}

impl LineItemInput {
    pub fn new(name: impl Into<String>, quantity: Decimal, unit_cost: Decimal) -> Self {
        LineItem::new(name, quantity, unit_cost).into()
    }

    pub fn with_discounts(mut self, discounts: impl Into<RateField>) -> Self {
        self.discounts = discounts.into();
        self
    }

    pub fn with_taxes(mut self, taxes: impl Into<RateField>) -> Self {
        self.taxes = taxes.into();
        self
    }

    /// Everything but the rate lists, which the calculator expands separately
    pub(crate) fn into_line_item(self) -> (LineItem, RateField, RateField) {
        let item = LineItem {
            item_type: self.item_type,
            name: self.name,
            description: self.description,
            quantity: self.quantity,
            unit_cost: self.unit_cost,
            amount: Decimal::ZERO,
            taxable: self.taxable,
            discountable: self.discountable,
            discounts: Vec::new(),
            taxes: Vec::new(),
            subscription_id: self.subscription_id,
            plan_id: self.plan_id,
            catalog_item_id: self.catalog_item_id,
            period_start: self.period_start,
            period_end: self.period_end,
            prorated: self.prorated,
        };
        (item, self.discounts, self.taxes)
    }
}

impl From<LineItem> for LineItemInput {
    fn from(item: LineItem) -> Self {
        Self {
            item_type: item.item_type,
            name: item.name,
            description: item.description,
            quantity: item.quantity,
            unit_cost: item.unit_cost,
            taxable: item.taxable,
            discountable: item.discountable,
            discounts: item.discounts.into(),
            taxes: item.taxes.into(),
            subscription_id: item.subscription_id,
            plan_id: item.plan_id,
            catalog_item_id: item.catalog_item_id,
            period_start: item.period_start,
            period_end: item.period_end,
            prorated: item.prorated,
        }
    }
}
