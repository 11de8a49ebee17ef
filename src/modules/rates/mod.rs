pub mod models;
pub mod repositories;
pub mod services;

pub use models::{AppliedRate, InlineRate, Rate, RateField, RateKind, RateRef, RateScope};
pub use repositories::{InMemoryRateRepository, RateResolver};
pub use services::RateExpander;
