mod invoice;
mod line_item;

pub use invoice::{CalculatedInvoice, CalculationRequest};
pub use line_item::{LineItem, LineItemInput};
