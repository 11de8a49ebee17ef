pub mod applied_rate;
pub mod rate;

pub use applied_rate::{AppliedRate, InlineRate, RateField, RateRef};
pub use rate::{Rate, RateKind, RateScope};
