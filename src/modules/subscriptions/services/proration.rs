use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, warn};

use crate::config::CalculationConfig;
use crate::core::{AppError, Result};
use crate::modules::invoices::LineItem;
use crate::modules::pricing::{Plan, PricedLine, PricingEngine, PricingMode};
use crate::modules::subscriptions::models::{AddonSnapshot, SubscriptionSnapshot};

const PLAN_LINE: &str = "plan";
const ADDON_LINE: &str = "addon";

/// The base plan or one add-on of a snapshot
#[derive(Debug, Clone, Copy)]
struct Subject<'s> {
    plan: &'s Plan,
    quantity: Decimal,
    amount: Option<Decimal>,
    description: Option<&'s str>,
    catalog_item_id: Option<&'s str>,
    item_type: &'static str,
}

impl<'s> Subject<'s> {
    fn base(snapshot: &'s SubscriptionSnapshot) -> Self {
        Self {
            plan: &snapshot.plan,
            quantity: snapshot.quantity,
            amount: snapshot.amount,
            description: None,
            catalog_item_id: None,
            item_type: PLAN_LINE,
        }
    }

    fn addon(addon: &'s AddonSnapshot) -> Self {
        Self {
            plan: &addon.plan,
            quantity: addon.quantity,
            amount: addon.amount,
            description: addon.description.as_deref(),
            catalog_item_id: addon.catalog_item_id.as_deref(),
            item_type: ADDON_LINE,
        }
    }

    /// Single unit price, for plans that have one
    fn unit_price(&self) -> Option<Decimal> {
        match self.plan.pricing_mode {
            PricingMode::PerUnit => self.plan.amount,
            PricingMode::Custom => self.amount,
            PricingMode::Volume | PricingMode::Tiered => None,
        }
    }

    fn same_tier_pricing(&self, other: &Subject<'_>) -> bool {
        self.plan.pricing_mode == other.plan.pricing_mode && self.plan.tiers == other.plan.tiers
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    Added,
    Removed,
}

/// Computes pending line items for a mid-cycle subscription change.
///
/// Every line covers `[at, before.period_end)` and carries a quantity
/// prorated by the remaining share of the current billing period.
#[derive(Debug, Clone)]
pub struct Proration {
    before: SubscriptionSnapshot,
    after: SubscriptionSnapshot,
    at: DateTime<Utc>,
    config: CalculationConfig,
    engine: PricingEngine,
}

impl Proration {
    pub fn new(
        before: SubscriptionSnapshot,
        after: SubscriptionSnapshot,
        at: DateTime<Utc>,
    ) -> Result<Self> {
        if before.currency != after.currency {
            return Err(AppError::CurrencyMismatch {
                expected: before.currency,
                found: after.currency,
            });
        }

        before.validate()?;
        after.validate()?;

        Ok(Self {
            before,
            after,
            at,
            config: CalculationConfig::default(),
            engine: PricingEngine::new(),
        })
    }

    pub fn with_config(mut self, config: CalculationConfig) -> Self {
        self.config = config;
        self
    }

    /// Share of the current period left at `at`, rounded for display
    pub fn percent_remaining(&self) -> Decimal {
        self.round_quantity(self.remaining_fraction())
    }

    /// Exact share of `[period_start, period_end)` after `at`, clamped to [0, 1]
    fn remaining_fraction(&self) -> Decimal {
        let start = self.before.period_start;
        let end = self.before.period_end;

        if self.at >= end {
            return Decimal::ZERO;
        }
        if self.at <= start {
            return Decimal::ONE;
        }

        // Both spans are positive here; the period was validated in `new`
        let total = Decimal::from((end - start).num_milliseconds());
        let remaining = Decimal::from((end - self.at).num_milliseconds());
        (remaining / total).clamp(Decimal::ZERO, Decimal::ONE)
    }

    fn round_quantity(&self, quantity: Decimal) -> Decimal {
        quantity.round_dp_with_strategy(
            self.config.proration_precision,
            RoundingStrategy::MidpointAwayFromZero,
        )
    }

    fn prorate(&self, quantity: Decimal, fraction: Decimal) -> Result<Decimal> {
        quantity
            .checked_mul(fraction)
            .map(|raw| self.round_quantity(raw))
            .ok_or_else(|| AppError::overflow(format!("prorating quantity {}", quantity)))
    }

    /// Credit and charge lines for every changed dimension: base plan first,
    /// then add-ons in `after` order, then add-ons that were removed.
    pub fn line_items(&self) -> Result<Vec<LineItem>> {
        if !self.before.status.is_prorating() || !self.after.status.is_prorating() {
            warn!(
                subscription_id = %self.before.subscription_id,
                before = ?self.before.status,
                after = ?self.after.status,
                "subscription status does not prorate, skipping"
            );
            return Ok(Vec::new());
        }

        let fraction = self.remaining_fraction();
        if fraction.is_zero() {
            debug!(
                subscription_id = %self.before.subscription_id,
                at = %self.at,
                "nothing left of the current period to prorate"
            );
            return Ok(Vec::new());
        }

        let mut lines = Vec::new();

        let cycle_changed = self.before.plan.cycle() != self.after.plan.cycle();
        self.diff(
            Some(Subject::base(&self.before)),
            Some(Subject::base(&self.after)),
            cycle_changed,
            fraction,
            &mut lines,
        )?;

        for addon in &self.after.addons {
            let previous = self.before.find_addon(addon.identity()).map(Subject::addon);
            self.diff(previous, Some(Subject::addon(addon)), false, fraction, &mut lines)?;
        }

        for addon in &self.before.addons {
            if self.after.find_addon(addon.identity()).is_none() {
                self.diff(Some(Subject::addon(addon)), None, false, fraction, &mut lines)?;
            }
        }

        debug!(
            subscription_id = %self.before.subscription_id,
            percent_remaining = %self.round_quantity(fraction),
            lines = lines.len(),
            "computed proration"
        );

        Ok(lines)
    }

    fn diff(
        &self,
        before: Option<Subject<'_>>,
        after: Option<Subject<'_>>,
        cycle_changed: bool,
        fraction: Decimal,
        lines: &mut Vec<LineItem>,
    ) -> Result<()> {
        let (before, after) = match (before, after) {
            (None, None) => return Ok(()),
            (Some(before), None) => {
                return self.push_priced(&before, Change::Removed, before.quantity, fraction, lines)
            }
            (None, Some(after)) => {
                return self.push_priced(&after, Change::Added, after.quantity, fraction, lines)
            }
            (Some(before), Some(after)) => (before, after),
        };

        // A new billing cycle is billed fresh at the next boundary; only the
        // unused part of the old plan is credited
        if before.plan.id != after.plan.id || cycle_changed {
            self.push_priced(&before, Change::Removed, before.quantity, fraction, lines)?;
            if !cycle_changed {
                self.push_priced(&after, Change::Added, after.quantity, fraction, lines)?;
            }
            return Ok(());
        }

        let quantity_changed = before.quantity != after.quantity;

        match (before.unit_price(), after.unit_price()) {
            (Some(old_price), Some(new_price)) => {
                if old_price != new_price && quantity_changed {
                    self.push_priced(&before, Change::Removed, before.quantity, fraction, lines)?;
                    self.push_priced(&after, Change::Added, after.quantity, fraction, lines)?;
                } else if quantity_changed {
                    let delta = after.quantity - before.quantity;
                    let change = if delta > Decimal::ZERO {
                        Change::Added
                    } else {
                        Change::Removed
                    };
                    self.push_priced(&after, change, delta.abs(), fraction, lines)?;
                } else if old_price != new_price {
                    self.push_price_change(&after, new_price - old_price, fraction, lines)?;
                }
            }
            _ => {
                // Tiered and volume plans have no single unit cost to diff
                if quantity_changed || !before.same_tier_pricing(&after) {
                    self.push_priced(&before, Change::Removed, before.quantity, fraction, lines)?;
                    self.push_priced(&after, Change::Added, after.quantity, fraction, lines)?;
                }
            }
        }

        Ok(())
    }

    fn push_priced(
        &self,
        subject: &Subject<'_>,
        change: Change,
        quantity: Decimal,
        fraction: Decimal,
        lines: &mut Vec<LineItem>,
    ) -> Result<()> {
        if quantity.is_zero() {
            return Ok(());
        }

        for entry in self.engine.price(subject.plan, quantity, subject.amount)? {
            let signed = match change {
                Change::Added => entry.quantity,
                Change::Removed => -entry.quantity,
            };
            let prorated = self.prorate(signed, fraction)?;
            if prorated.is_zero() {
                continue;
            }

            let note = match change {
                Change::Added => format!("(added {})", entry.quantity.normalize()),
                Change::Removed => format!("(removed {})", entry.quantity.normalize()),
            };
            lines.push(self.line(subject, entry, prorated, note)?);
        }

        Ok(())
    }

    /// One line for the price difference over the new quantity
    fn push_price_change(
        &self,
        subject: &Subject<'_>,
        difference: Decimal,
        fraction: Decimal,
        lines: &mut Vec<LineItem>,
    ) -> Result<()> {
        let prorated = self.prorate(subject.quantity, fraction)?;
        if prorated.is_zero() {
            return Ok(());
        }

        let note = if difference > Decimal::ZERO {
            "(increased price)"
        } else {
            "(decreased price)"
        };
        let entry = PricedLine {
            plan_id: subject.plan.id.clone(),
            name: subject.plan.name.clone(),
            description: subject.plan.description.clone(),
            tier_description: None,
            quantity: subject.quantity,
            unit_cost: difference,
        };
        lines.push(self.line(subject, entry, prorated, note.to_string())?);

        Ok(())
    }

    fn line(
        &self,
        subject: &Subject<'_>,
        mut entry: PricedLine,
        quantity: Decimal,
        note: String,
    ) -> Result<LineItem> {
        if let Some(description) = subject.description {
            entry.description = Some(description.to_string());
        }

        let mut item = LineItem::from_priced(&entry);
        item.description = Some(match item.description {
            Some(prefix) => format!("{}\n{}", prefix, note),
            None => note,
        });
        item.item_type = Some(subject.item_type.to_string());
        item.quantity = quantity;
        item.subscription_id = Some(self.before.subscription_id.clone());
        item.catalog_item_id = subject.catalog_item_id.map(str::to_string);
        item.period_start = Some(self.at);
        item.period_end = Some(self.before.period_end);
        item.prorated = true;
        item.amount = item.gross_amount(self.before.currency)?.to_decimal();

        Ok(item)
    }
}
