// Invoices module: document calculation

pub mod models;
pub mod services;

pub use models::{CalculatedInvoice, CalculationRequest, LineItem, LineItemInput};
pub use services::InvoiceCalculator;
