pub mod models;
pub mod services;

pub use models::{BillingInterval, Plan, PricingMode, Tier, TierSet};
pub use services::{PricedLine, PricingEngine};
