use serde::{Deserialize, Serialize};

use super::item::InvoiceItem;

/// Central GST share of the 18% slab.
pub const CGST_RATE: f64 = 0.09;
/// State GST share of the 18% slab.
pub const SGST_RATE: f64 = 0.09;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal: f64,
    pub cgst: f64,
    pub sgst: f64,
    pub total: f64,
}

/// Subtotal of all lines plus the CGST/SGST split, each tax rounded to
/// whole rupees.
pub fn compute_invoice_totals(items: &[InvoiceItem]) -> InvoiceTotals {
    let subtotal: f64 = items.iter().map(InvoiceItem::amount).sum();
    let cgst = (subtotal * CGST_RATE).round();
    let sgst = (subtotal * SGST_RATE).round();
    InvoiceTotals {
        subtotal,
        cgst,
        sgst,
        total: subtotal + cgst + sgst,
    }
}
