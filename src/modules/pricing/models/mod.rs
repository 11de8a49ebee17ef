pub mod plan;
pub mod tier;

pub use plan::{BillingInterval, Plan, PricingMode};
pub use tier::{Tier, TierSet};
