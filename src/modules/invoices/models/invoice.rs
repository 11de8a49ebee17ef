// Calculation request and result for invoices, estimates and credit notes.
//
// A CalculatedInvoice is produced fresh by every calculation; recalculating
// the same value yields an identical result.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::line_item::{LineItem, LineItemInput};
use crate::core::{Currency, Money, Result};
use crate::modules::rates::{AppliedRate, RateField};

/// Input to `InvoiceCalculator::prepare`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub currency: Currency,

    #[serde(default)]
    pub items: Vec<LineItemInput>,

    /// Subtotal-level discounts (number, id list or inline objects)
    #[serde(default)]
    pub discounts: RateField,

    /// Subtotal-level taxes
    #[serde(default)]
    pub taxes: RateField,

    #[serde(default)]
    pub shipping: RateField,
}

impl CalculationRequest {
    pub fn new(currency: Currency) -> Self {
        Self {
            currency,
            items: Vec::new(),
            discounts: RateField::default(),
            taxes: RateField::default(),
            shipping: RateField::default(),
        }
    }

    pub fn with_item(mut self, item: impl Into<LineItemInput>) -> Self {
        self.items.push(item.into());
        self
    }

    pub fn with_discounts(mut self, discounts: impl Into<RateField>) -> Self {
        self.discounts = discounts.into();
        self
    }

    pub fn with_taxes(mut self, taxes: impl Into<RateField>) -> Self {
        self.taxes = taxes.into();
        self
    }

    pub fn with_shipping(mut self, shipping: impl Into<RateField>) -> Self {
        self.shipping = shipping.into();
        self
    }
}

/// Calculated document: normalized items and rates with derived totals.
///
/// All amounts are decimals at the currency's native precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatedInvoice {
    pub currency: Currency,
    pub items: Vec<LineItem>,
    pub discounts: Vec<AppliedRate>,
    pub taxes: Vec<AppliedRate>,
    pub shipping: Vec<AppliedRate>,
    pub subtotal: Decimal,
    pub total: Decimal,
}

impl CalculatedInvoice {
    /// Uncalculated document; run it through `InvoiceCalculator::calculate_invoice`
    pub fn new(currency: Currency, items: Vec<LineItem>) -> Self {
        Self {
            currency,
            items,
            discounts: Vec::new(),
            taxes: Vec::new(),
            shipping: Vec::new(),
            subtotal: Decimal::ZERO,
            total: Decimal::ZERO,
        }
    }

    pub fn subtotal_money(&self) -> Result<Money> {
        Money::from_decimal(self.currency, self.subtotal)
    }

    pub fn total_money(&self) -> Result<Money> {
        Money::from_decimal(self.currency, self.total)
    }

    /// Sum of subtotal-level discount amounts
    pub fn discount_total(&self) -> Decimal {
        self.discounts.iter().map(|rate| rate.amount).sum()
    }

    /// Sum of item-level and subtotal-level tax amounts
    pub fn tax_total(&self) -> Decimal {
        let item_taxes: Decimal = self
            .items
            .iter()
            .flat_map(|item| item.taxes.iter())
            .map(|rate| rate.amount)
            .sum();
        item_taxes + self.taxes.iter().map(|rate| rate.amount).sum::<Decimal>()
    }

    pub fn shipping_total(&self) -> Decimal {
        self.shipping.iter().map(|rate| rate.amount).sum()
    }
}
