pub mod models;
pub mod services;

pub use models::TaxLine;
pub use services::{NoopTaxAssessor, RateTableTaxAssessor, TaxAssessor};
