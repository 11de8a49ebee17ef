pub mod rate_table;
pub mod tax_assessor;

pub use rate_table::RateTableTaxAssessor;
pub use tax_assessor::{NoopTaxAssessor, TaxAssessor};
