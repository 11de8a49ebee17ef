use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{AppError, Result};
use crate::modules::pricing::models::{Plan, PricingMode, Tier, TierSet};

/// One priced entry produced by expanding a plan and a quantity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    pub plan_id: String,
    pub name: String,
    pub description: Option<String>,
    /// Tier range description for tiered/volume plans
    pub tier_description: Option<String>,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
}

/// PricingEngine expands plan definitions into priced line entries
#[derive(Debug, Clone, Copy)]
pub struct PricingEngine;

impl PricingEngine {
    pub fn new() -> Self {
        Self
    }

    /// Price `quantity` units of `plan`.
    ///
    /// - per-unit: one entry at the plan amount
    /// - volume: one entry for the full quantity at the containing tier's cost
    /// - tiered: one entry per tier intersected by `[1, quantity]`, ascending
    /// - custom: one entry at `explicit_amount`, which is required
    pub fn price(
        &self,
        plan: &Plan,
        quantity: Decimal,
        explicit_amount: Option<Decimal>,
    ) -> Result<Vec<PricedLine>> {
        plan.validate()?;

        if quantity < Decimal::ZERO {
            return Err(AppError::validation(format!(
                "cannot price a negative quantity ({}) of plan {}",
                quantity, plan.id
            )));
        }

        let lines = match plan.pricing_mode {
            PricingMode::PerUnit => {
                let unit_cost = plan.amount.ok_or_else(|| {
                    AppError::pricing(format!("per-unit plan {} has no amount", plan.id))
                })?;
                vec![Self::line(plan, None, quantity, unit_cost)]
            }
            PricingMode::Custom => {
                let unit_cost = explicit_amount.ok_or_else(|| {
                    AppError::pricing(format!(
                        "custom-priced plan {} requires an explicit amount",
                        plan.id
                    ))
                })?;
                vec![Self::line(plan, None, quantity, unit_cost)]
            }
            PricingMode::Volume => {
                let tier = Self::tiers(plan)?.find(quantity).ok_or_else(|| {
                    AppError::invalid_tier(format!(
                        "no tier of plan {} covers quantity {}",
                        plan.id, quantity
                    ))
                })?;
                vec![Self::line(plan, Some(tier), quantity, tier.unit_cost)]
            }
            PricingMode::Tiered => Self::tiers(plan)?
                .iter()
                .filter_map(|tier| {
                    let portion = Self::portion_in_tier(tier, quantity);
                    (portion > Decimal::ZERO)
                        .then(|| Self::line(plan, Some(tier), portion, tier.unit_cost))
                })
                .collect(),
        };

        debug!(
            plan_id = %plan.id,
            mode = ?plan.pricing_mode,
            %quantity,
            entries = lines.len(),
            "priced plan"
        );

        Ok(lines)
    }

    /// Part of `quantity` falling within `(lower_bound, max_qty]`
    fn portion_in_tier(tier: &Tier, quantity: Decimal) -> Decimal {
        let lower = tier.lower_bound();
        let upper = tier
            .upper_bound()
            .map_or(quantity, |max| max.min(quantity));
        (upper - lower).max(Decimal::ZERO)
    }

    fn tiers(plan: &Plan) -> Result<&TierSet> {
        plan.tiers
            .as_ref()
            .ok_or_else(|| AppError::invalid_tier(format!("plan {} has no tiers", plan.id)))
    }

    fn line(plan: &Plan, tier: Option<&Tier>, quantity: Decimal, unit_cost: Decimal) -> PricedLine {
        PricedLine {
            plan_id: plan.id.clone(),
            name: plan.name.clone(),
            description: plan.description.clone(),
            tier_description: tier.map(Tier::describe),
            quantity,
            unit_cost,
        }
    }
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::new()
    }
}
