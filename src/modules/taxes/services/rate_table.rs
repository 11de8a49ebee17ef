use rust_decimal::Decimal;
use tracing::debug;

use crate::core::{AppError, Money, Result};
use crate::modules::invoices::CalculatedInvoice;
use crate::modules::taxes::models::TaxLine;
use crate::modules::taxes::services::tax_assessor::TaxAssessor;

const MAX_RATE_SCALE: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
struct TableEntry {
    name: String,
    rate_id: Option<String>,
    percent: Decimal,
}

/// Local assessor that applies a fixed table of percentages to the taxable
/// part of the discounted subtotal
#[derive(Debug, Clone, Default)]
pub struct RateTableTaxAssessor {
    entries: Vec<TableEntry>,
}

impl RateTableTaxAssessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a percentage tax (0 to 100, at most 4 decimal places)
    pub fn with_rate(
        mut self,
        name: impl Into<String>,
        rate_id: Option<&str>,
        percent: Decimal,
    ) -> Result<Self> {
        Self::validate_percent(percent)?;
        self.entries.push(TableEntry {
            name: name.into(),
            rate_id: rate_id.map(str::to_string),
            percent,
        });
        Ok(self)
    }

    pub fn validate_percent(percent: Decimal) -> Result<()> {
        if percent < Decimal::ZERO {
            return Err(AppError::validation("Tax rate cannot be negative"));
        }

        if percent > Decimal::ONE_HUNDRED {
            return Err(AppError::validation("Tax rate cannot exceed 100%"));
        }

        if percent.normalize().scale() > MAX_RATE_SCALE {
            return Err(AppError::validation(
                "Tax rate cannot have more than 4 decimal places",
            ));
        }

        Ok(())
    }

    /// Taxable share of the subtotal after item and subtotal discounts.
    ///
    /// Subtotal discounts are spread over items in proportion to their
    /// discounted amounts.
    pub fn taxable_base(invoice: &CalculatedInvoice) -> Result<Money> {
        let currency = invoice.currency;
        let mut taxable = Money::zero(currency);
        for item in invoice.items.iter().filter(|item| item.taxable) {
            let discounts: Decimal = item.discounts.iter().map(|rate| rate.amount).sum();
            taxable = taxable.add(&Money::from_decimal(currency, item.amount - discounts)?)?;
        }

        let subtotal = invoice.subtotal_money()?;
        if subtotal.is_zero() || subtotal.is_negative() {
            return Ok(taxable);
        }

        let share = taxable
            .to_decimal()
            .checked_div(subtotal.to_decimal())
            .ok_or_else(|| AppError::overflow("taxable share of subtotal"))?;
        let discount = Money::from_decimal(currency, invoice.discount_total())?.multiply(share)?;
        taxable.subtract(&discount)
    }
}

impl TaxAssessor for RateTableTaxAssessor {
    fn assess(&self, invoice: &CalculatedInvoice) -> Result<Vec<TaxLine>> {
        let base = Self::taxable_base(invoice)?;

        let mut lines = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let amount = base.multiply(entry.percent / Decimal::ONE_HUNDRED)?;
            lines.push(TaxLine {
                name: entry.name.clone(),
                rate_id: entry.rate_id.clone(),
                rate: Some(entry.percent),
                amount: amount.to_decimal(),
            });
        }

        debug!(
            base = %base.to_decimal(),
            lines = lines.len(),
            "assessed taxes from rate table"
        );
        Ok(lines)
    }

    fn adjust(&self, invoice: &CalculatedInvoice) -> Result<Vec<TaxLine>> {
        self.assess(invoice)
    }

    fn void(&self, _invoice: &CalculatedInvoice) -> Result<()> {
        Ok(())
    }
}
