pub mod subscription;

pub use subscription::{AddonSnapshot, SubscriptionSnapshot, SubscriptionStatus};
