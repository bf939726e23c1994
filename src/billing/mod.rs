//! Invoice lines, GST totals, numbering and amount-in-words.

mod generator;
mod invoice;
mod item;
mod number;
mod totals;
mod words;

pub use generator::{
    build_items, create_invoice, existing_invoice_pdf, format_quantity, invoice_pdf_path,
    parse_date, render_invoice, DocumentLine, DocumentParty, InvoiceDocument, InvoiceDraft,
};
pub use invoice::{Customer, Invoice, InvoiceStatus, ParseStatusError};
pub use item::InvoiceItem;
pub use number::{
    format_invoice_number, generate_invoice_number, parse_invoice_number, random_invoice_number,
    INVOICE_PREFIX, MAX_SEQUENCE,
};
pub use totals::{compute_invoice_totals, InvoiceTotals, CGST_RATE, SGST_RATE};
pub use words::{number_to_words, rupees_in_words};
