//! `gigforge-invoicing` — the Invoice entity and interval arithmetic.

pub mod interval;
pub mod invoice;

pub use interval::{interval_hours, invoice_value, max_intervals};
pub use invoice::{Invoice, InvoiceState};
