pub mod billing;
pub mod config;
pub mod error;
pub mod estimator;
pub mod format;
pub mod leads;
pub mod notify;
pub mod pdf;
pub mod rate_limit;

pub use billing::{
    compute_invoice_totals, generate_invoice_number, number_to_words, Customer, Invoice,
    InvoiceItem, InvoiceStatus, InvoiceTotals,
};
pub use config::{Company, Config, State};
pub use error::{Result, SolarError};
pub use estimator::{estimate, CalculatorInput, CalculatorResult};
pub use leads::{submit_lead, Lead, LeadSource, LeadStats, LeadStatus, NewLead};
