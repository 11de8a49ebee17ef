pub mod pricing_engine;

pub use pricing_engine::{PricedLine, PricingEngine};
