pub mod proration;

pub use proration::Proration;
