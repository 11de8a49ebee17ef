use crate::core::Result;
use crate::modules::invoices::CalculatedInvoice;
use crate::modules::taxes::models::TaxLine;

/// External sales-tax capability.
///
/// The calculator runs a first pass, hands the result to `assess` (new
/// documents) or `adjust` (changed documents), and re-runs with the returned
/// lines when there are any.
pub trait TaxAssessor: Send + Sync {
    fn assess(&self, invoice: &CalculatedInvoice) -> Result<Vec<TaxLine>>;

    fn adjust(&self, invoice: &CalculatedInvoice) -> Result<Vec<TaxLine>>;

    fn void(&self, invoice: &CalculatedInvoice) -> Result<()>;
}

/// Assessor for accounts without an external tax calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTaxAssessor;

impl TaxAssessor for NoopTaxAssessor {
    fn assess(&self, _invoice: &CalculatedInvoice) -> Result<Vec<TaxLine>> {
        Ok(Vec::new())
    }

    fn adjust(&self, _invoice: &CalculatedInvoice) -> Result<Vec<TaxLine>> {
        Ok(Vec::new())
    }

    fn void(&self, _invoice: &CalculatedInvoice) -> Result<()> {
        Ok(())
    }
}
