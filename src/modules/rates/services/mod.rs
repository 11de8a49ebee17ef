pub mod rate_expander;

pub use rate_expander::RateExpander;
