use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::CalculationConfig;
use crate::core::{AppError, Currency, Money, Result};
use crate::modules::invoices::models::{CalculatedInvoice, CalculationRequest, LineItem};
use crate::modules::rates::{AppliedRate, RateExpander, RateKind, RateResolver, RateScope};
use crate::modules::taxes::{TaxAssessor, TaxLine};

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Turns line items plus discount/tax/shipping rates into subtotal and total.
///
/// Pipeline, per run:
/// 1. item amount = round(quantity × unit_cost), backing out inclusive taxes
/// 2. item discounts, each against the item's own amount
/// 3. item taxes against the discounted item amount
/// 4. subtotal = Σ discounted item amounts
/// 5. subtotal discounts, each against the subtotal less prior discounts
/// 6. shipping, then subtotal taxes against the discounted subtotal
/// 7. total, which must not be negative
pub struct InvoiceCalculator<'a> {
    resolver: &'a dyn RateResolver,
    config: CalculationConfig,
}

/// Per-item outcome of steps 1-3
struct CalculatedLine {
    item: LineItem,
    net: Money,
    tax: Money,
}

impl<'a> InvoiceCalculator<'a> {
    pub fn new(resolver: &'a dyn RateResolver, config: CalculationConfig) -> Self {
        Self { resolver, config }
    }

    /// Expand every rate reference in `request` and run the calculation.
    pub fn prepare(&self, request: CalculationRequest) -> Result<CalculatedInvoice> {
        let expander = RateExpander::with_strict(self.resolver, self.config.strict_rate_resolution);
        let currency = request.currency;

        let mut items = Vec::with_capacity(request.items.len());
        for input in request.items {
            let (mut item, discounts, taxes) = input.into_line_item();
            item.discounts =
                expander.expand_list(&discounts.into_refs(), RateKind::Discount, RateScope::Item)?;
            item.taxes = expander.expand_list(&taxes.into_refs(), RateKind::Tax, RateScope::Item)?;
            items.push(item);
        }

        let calc = CalculatedInvoice {
            currency,
            items,
            discounts: expander.expand_list(
                &request.discounts.into_refs(),
                RateKind::Discount,
                RateScope::Subtotal,
            )?,
            taxes: expander.expand_list(
                &request.taxes.into_refs(),
                RateKind::Tax,
                RateScope::Subtotal,
            )?,
            shipping: expander.expand_list(
                &request.shipping.into_refs(),
                RateKind::Shipping,
                RateScope::Subtotal,
            )?,
            subtotal: Decimal::ZERO,
            total: Decimal::ZERO,
        };

        Self::calculate_invoice(&calc)
    }

    /// Re-derive every amount of `calc` from quantities, unit costs and rate
    /// values. Rates are applied in `order` within each list and nothing that
    /// was derived by a previous run feeds into this one.
    pub fn calculate_invoice(calc: &CalculatedInvoice) -> Result<CalculatedInvoice> {
        let currency = calc.currency;
        let zero = Money::zero(currency);

        let mut items = Vec::with_capacity(calc.items.len());
        let mut subtotal = zero;
        let mut item_taxes = zero;
        for item in &calc.items {
            let mut item = item.clone();
            RateExpander::sort(&mut item.discounts);
            RateExpander::sort(&mut item.taxes);
            let line = Self::calculate_line(currency, &item)?;
            subtotal = subtotal.add(&line.net)?;
            item_taxes = item_taxes.add(&line.tax)?;
            items.push(line.item);
        }

        let sorted = |rates: &[AppliedRate]| {
            let mut rates = rates.to_vec();
            RateExpander::sort(&mut rates);
            rates
        };

        // Subtotal discounts apply sequentially to the reduced subtotal
        let mut discounted = subtotal;
        let mut discounts = Vec::with_capacity(calc.discounts.len());
        for rate in &sorted(&calc.discounts) {
            let amount = Self::rate_amount(currency, rate, &discounted)?;
            discounted = discounted.subtract(&amount)?;
            discounts.push(with_amount(rate, amount));
        }
        let discount_total = subtotal.subtract(&discounted)?;

        let mut shipping_total = zero;
        let mut shipping = Vec::with_capacity(calc.shipping.len());
        for rate in &sorted(&calc.shipping) {
            let amount = Self::rate_amount(currency, rate, &discounted)?;
            shipping_total = shipping_total.add(&amount)?;
            shipping.push(with_amount(rate, amount));
        }

        let mut subtotal_taxes = zero;
        let mut taxes = Vec::with_capacity(calc.taxes.len());
        for rate in &sorted(&calc.taxes) {
            let amount = Self::rate_amount(currency, rate, &discounted)?;
            subtotal_taxes = subtotal_taxes.add(&amount)?;
            taxes.push(with_amount(rate, amount));
        }

        let tax_total = item_taxes.add(&subtotal_taxes)?;
        let total = discounted.add(&shipping_total)?.add(&tax_total)?;

        debug!(
            %currency,
            items = items.len(),
            subtotal = %subtotal.to_decimal(),
            discounts = %discount_total.to_decimal(),
            shipping = %shipping_total.to_decimal(),
            taxes = %tax_total.to_decimal(),
            total = %total.to_decimal(),
            "calculated invoice"
        );

        if total.is_negative() {
            let field = if subtotal.is_negative() {
                "items"
            } else if discounted.is_negative() {
                "discounts"
            } else if tax_total.is_negative() {
                "taxes"
            } else if shipping_total.is_negative() {
                "shipping"
            } else {
                "discounts"
            };
            warn!(field, total = %total.to_decimal(), "calculation produced a negative total");
            return Err(AppError::NegativeTotal {
                field,
                total: total.to_decimal(),
            });
        }

        Ok(CalculatedInvoice {
            currency,
            items,
            discounts,
            taxes,
            shipping,
            subtotal: subtotal.to_decimal(),
            total: total.to_decimal(),
        })
    }

    fn calculate_line(currency: Currency, item: &LineItem) -> Result<CalculatedLine> {
        let zero = Money::zero(currency);
        let gross = item.gross_amount(currency)?;

        let mut taxes: Vec<Option<Money>> = vec![None; item.taxes.len()];

        // Back inclusive taxes out of the stated amount
        let inclusive: Vec<usize> = item
            .taxes
            .iter()
            .enumerate()
            .filter(|(_, rate)| item.taxable && rate.inclusive)
            .map(|(index, _)| index)
            .collect();

        let base = if inclusive.is_empty() {
            gross
        } else {
            Self::back_out_inclusive(currency, item, &gross, &inclusive, &mut taxes)?
        };

        // Item discounts each apply to the item's own amount, never beyond what remains
        let mut discounted = base;
        let mut discounts = Vec::with_capacity(item.discounts.len());
        for rate in &item.discounts {
            let amount = if !item.discountable {
                zero
            } else {
                let raw = if rate.is_percent {
                    percent_of(&base, rate.value)?
                } else {
                    Money::from_decimal(currency, rate.value)?
                };
                if base.is_negative() {
                    raw
                } else {
                    raw.min(&discounted.max(&zero)?)?
                }
            };
            discounted = discounted.subtract(&amount)?;
            discounts.push(with_amount(rate, amount));
        }

        // Exclusive taxes on the discounted amount
        for (index, rate) in item.taxes.iter().enumerate() {
            if taxes[index].is_some() {
                continue;
            }
            let amount = if item.taxable {
                Self::rate_amount(currency, rate, &discounted)?
            } else {
                zero
            };
            taxes[index] = Some(amount);
        }

        let mut tax_total = zero;
        let mut applied_taxes = Vec::with_capacity(item.taxes.len());
        for (rate, amount) in item.taxes.iter().zip(taxes) {
            let amount = amount.unwrap_or(zero);
            tax_total = tax_total.add(&amount)?;
            applied_taxes.push(with_amount(rate, amount));
        }

        Ok(CalculatedLine {
            item: LineItem {
                amount: base.to_decimal(),
                discounts,
                taxes: applied_taxes,
                ..item.clone()
            },
            net: discounted,
            tax: tax_total,
        })
    }

    /// Split `gross` into a pre-tax base and inclusive tax amounts:
    /// base = (gross − flat inclusive) × 100 / (100 + Σ inclusive percents).
    /// The last percent tax absorbs the rounding remainder.
    fn back_out_inclusive(
        currency: Currency,
        item: &LineItem,
        gross: &Money,
        inclusive: &[usize],
        taxes: &mut [Option<Money>],
    ) -> Result<Money> {
        let mut flat_total = Money::zero(currency);
        let mut percent_total = Decimal::ZERO;
        for &index in inclusive {
            let rate = &item.taxes[index];
            if rate.is_percent {
                percent_total += rate.value;
            } else {
                let amount = Money::from_decimal(currency, rate.value)?;
                flat_total = flat_total.add(&amount)?;
                taxes[index] = Some(amount);
            }
        }

        let pre_percent = gross.subtract(&flat_total)?;
        let divisor = ONE_HUNDRED + percent_total;
        if divisor <= Decimal::ZERO {
            return Err(AppError::validation(format!(
                "line item '{}': inclusive tax rates sum to {}%",
                item.name, percent_total
            )));
        }
        let factor = ONE_HUNDRED
            .checked_div(divisor)
            .ok_or_else(|| AppError::overflow("inclusive tax factor"))?;
        let base = pre_percent.multiply(factor)?;

        let percent_indexes: Vec<usize> = inclusive
            .iter()
            .copied()
            .filter(|&index| item.taxes[index].is_percent)
            .collect();
        let mut remaining = pre_percent.subtract(&base)?;
        for (position, &index) in percent_indexes.iter().enumerate() {
            let amount = if position + 1 == percent_indexes.len() {
                remaining
            } else {
                percent_of(&base, item.taxes[index].value)?
            };
            remaining = remaining.subtract(&amount)?;
            taxes[index] = Some(amount);
        }

        Ok(base)
    }

    /// Percent of `base`, or the flat value
    fn rate_amount(currency: Currency, rate: &AppliedRate, base: &Money) -> Result<Money> {
        if rate.is_percent {
            percent_of(base, rate.value)
        } else {
            Money::from_decimal(currency, rate.value)
        }
    }

    /// First pass, external assessment, then a second pass with the assessed
    /// lines replacing the document-level taxes. An empty assessment leaves
    /// the first pass untouched.
    pub fn assess_taxes(
        calc: &CalculatedInvoice,
        assessor: &dyn TaxAssessor,
    ) -> Result<CalculatedInvoice> {
        let first = Self::calculate_invoice(calc)?;
        let lines = assessor.assess(&first)?;
        Self::apply_tax_lines(first, lines)
    }

    /// Same as [`InvoiceCalculator::assess_taxes`] for an already-assessed
    /// document whose contents changed.
    pub fn reassess_taxes(
        calc: &CalculatedInvoice,
        assessor: &dyn TaxAssessor,
    ) -> Result<CalculatedInvoice> {
        let first = Self::calculate_invoice(calc)?;
        let lines = assessor.adjust(&first)?;
        Self::apply_tax_lines(first, lines)
    }

    /// Release a previously assessed document with the external calculator
    pub fn void_taxes(calc: &CalculatedInvoice, assessor: &dyn TaxAssessor) -> Result<()> {
        assessor.void(calc)
    }

    fn apply_tax_lines(first: CalculatedInvoice, lines: Vec<TaxLine>) -> Result<CalculatedInvoice> {
        if lines.is_empty() {
            return Ok(first);
        }

        debug!(lines = lines.len(), "applying assessed taxes");
        let mut next = first;
        next.taxes = lines
            .into_iter()
            .enumerate()
            .map(|(position, line)| line.into_applied_rate(position as i64 + 1))
            .collect();
        Self::calculate_invoice(&next)
    }
}

fn percent_of(base: &Money, percent: Decimal) -> Result<Money> {
    let factor = percent
        .checked_div(ONE_HUNDRED)
        .ok_or_else(|| AppError::overflow(format!("{}%", percent)))?;
    base.multiply(factor)
}

fn with_amount(rate: &AppliedRate, amount: Money) -> AppliedRate {
    AppliedRate {
        amount: amount.to_decimal(),
        ..rate.clone()
    }
}
