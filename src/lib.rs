//! Billing calculation core
//!
//! Money arithmetic, plan pricing, discount/tax/shipping rate resolution,
//! invoice totals and subscription proration.

pub mod config;
pub mod core;
pub mod modules;

// Re-export commonly used types
pub use core::{AppError, Currency, Money, Result};
pub use modules::invoices;
pub use modules::pricing;
pub use modules::rates;
pub use modules::subscriptions;
pub use modules::taxes;
