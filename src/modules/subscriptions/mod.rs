pub mod models;
pub mod services;

pub use models::{AddonSnapshot, SubscriptionSnapshot, SubscriptionStatus};
pub use services::Proration;
