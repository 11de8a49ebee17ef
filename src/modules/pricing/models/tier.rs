use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Result};

/// A quantity range with its own unit price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_qty: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_qty: Option<u64>,
    pub unit_cost: Decimal,
}

impl Tier {
    pub fn new(min_qty: Option<u64>, max_qty: Option<u64>, unit_cost: Decimal) -> Self {
        Self {
            min_qty,
            max_qty,
            unit_cost,
        }
    }

    /// Quantity at which this tier starts, as displayed to customers
    pub fn display_min(&self) -> u64 {
        self.min_qty.unwrap_or(1)
    }

    /// Exclusive lower bound: a quantity `q` falls in this tier when
    /// `lower_bound < q <= max_qty`
    pub fn lower_bound(&self) -> Decimal {
        Decimal::from(self.min_qty.unwrap_or(0).saturating_sub(1))
    }

    pub fn upper_bound(&self) -> Option<Decimal> {
        self.max_qty.map(Decimal::from)
    }

    pub fn contains(&self, quantity: Decimal) -> bool {
        // The first tier starts at 0 or 1, so 0 is covered by it
        let lower = self.lower_bound();
        let above_lower = if lower.is_zero() {
            quantity >= Decimal::ZERO
        } else {
            quantity > lower
        };
        let below_upper = self.upper_bound().map_or(true, |max| quantity <= max);
        above_lower && below_upper
    }

    /// Human-readable tier range, e.g. `"51 - 100 tier"` or `"101+ tier"`
    pub fn describe(&self) -> String {
        match self.max_qty {
            Some(max) => format!("{} - {} tier", self.display_min(), max),
            None => format!("{}+ tier", self.display_min()),
        }
    }
}

/// Validated tier list: ascending, contiguous, non-overlapping, open-ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Tier>", into = "Vec<Tier>")]
pub struct TierSet {
    tiers: Vec<Tier>,
}

impl TierSet {
    pub fn new(tiers: Vec<Tier>) -> Result<Self> {
        let first = tiers
            .first()
            .ok_or_else(|| AppError::invalid_tier("at least one tier is required"))?;

        if first.min_qty.unwrap_or(0) > 1 {
            return Err(AppError::invalid_tier(format!(
                "first tier must start at 0 or 1, got {}",
                first.display_min()
            )));
        }

        for (index, tier) in tiers.iter().enumerate() {
            if tier.unit_cost < Decimal::ZERO {
                return Err(AppError::invalid_tier(format!(
                    "tier {} has a negative unit cost",
                    index + 1
                )));
            }

            if let (Some(min), Some(max)) = (tier.min_qty, tier.max_qty) {
                if max < min {
                    return Err(AppError::invalid_tier(format!(
                        "tier {} ends ({}) before it starts ({})",
                        index + 1,
                        max,
                        min
                    )));
                }
            }

            if index == 0 {
                continue;
            }

            let previous = &tiers[index - 1];
            let previous_max = previous.max_qty.ok_or_else(|| {
                AppError::invalid_tier("only the last tier may be open-ended")
            })?;
            let expected_min = previous_max.checked_add(1).ok_or_else(|| {
                AppError::invalid_tier(format!(
                    "tier {} ends at the largest quantity, so only the last tier may reach it",
                    index
                ))
            })?;
            let min = tier.min_qty.unwrap_or(expected_min);

            if min < expected_min {
                return Err(AppError::invalid_tier(format!(
                    "tier {} overlaps the previous tier (starts at {}, previous ends at {})",
                    index + 1,
                    min,
                    previous_max
                )));
            }
            if min > expected_min {
                return Err(AppError::invalid_tier(format!(
                    "gap between tiers: quantities {} - {} are not covered",
                    expected_min,
                    min - 1
                )));
            }
        }

        if tiers.last().and_then(|tier| tier.max_qty).is_some() {
            return Err(AppError::invalid_tier(
                "the last tier must be open-ended",
            ));
        }

        // Normalise implicit minimums so descriptions read "51 - 100 tier"
        let mut normalized = tiers;
        for index in 1..normalized.len() {
            if normalized[index].min_qty.is_none() {
                normalized[index].min_qty =
                    normalized[index - 1].max_qty.and_then(|max| max.checked_add(1));
            }
        }

        Ok(Self { tiers: normalized })
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tier> {
        self.tiers.iter()
    }

    /// The single tier containing `quantity`
    pub fn find(&self, quantity: Decimal) -> Option<&Tier> {
        self.tiers.iter().find(|tier| tier.contains(quantity))
    }
}

impl TryFrom<Vec<Tier>> for TierSet {
    type Error = AppError;

    fn try_from(tiers: Vec<Tier>) -> Result<Self> {
        TierSet::new(tiers)
    }
}

impl From<TierSet> for Vec<Tier> {
    fn from(set: TierSet) -> Self {
        set.tiers
    }
}
