pub mod invoices;
pub mod pricing;
pub mod rates;
pub mod subscriptions;
pub mod taxes;
