use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::item::InvoiceItem;
use super::totals::{compute_invoice_totals, InvoiceTotals};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gstin: Option<String>,
}

/// Billing state of an invoice. Any state may move to any other through an
/// explicit admin action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 5] = [
        InvoiceStatus::Draft,
        InvoiceStatus::Sent,
        InvoiceStatus::Paid,
        InvoiceStatus::Overdue,
        InvoiceStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "Draft",
            InvoiceStatus::Sent => "Sent",
            InvoiceStatus::Paid => "Paid",
            InvoiceStatus::Overdue => "Overdue",
            InvoiceStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown status '{0}'")]
pub struct ParseStatusError(pub String);

impl FromStr for InvoiceStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InvoiceStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub invoice_number: String,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub status: InvoiceStatus,
    #[serde(default)]
    pub notes: String,
    pub subtotal: f64,
    pub cgst: f64,
    pub sgst: f64,
    pub total: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub customer: Customer,
    pub items: Vec<InvoiceItem>,
}

impl Invoice {
    pub fn new(
        invoice_number: String,
        date: NaiveDate,
        due_date: NaiveDate,
        customer: Customer,
        items: Vec<InvoiceItem>,
        notes: String,
        now: DateTime<Utc>,
    ) -> Self {
        let mut invoice = Self {
            invoice_number,
            date,
            due_date,
            status: InvoiceStatus::Draft,
            notes,
            subtotal: 0.0,
            cgst: 0.0,
            sgst: 0.0,
            total: 0.0,
            created_at: now,
            updated_at: now,
            customer,
            items,
        };
        invoice.apply_totals(compute_invoice_totals(&invoice.items));
        invoice
    }

    pub fn totals(&self) -> InvoiceTotals {
        InvoiceTotals {
            subtotal: self.subtotal,
            cgst: self.cgst,
            sgst: self.sgst,
            total: self.total,
        }
    }

    /// Recompute the stored totals from the lines. Returns true when the
    /// stored figures were stale.
    pub fn recompute_totals(&mut self) -> bool {
        let fresh = compute_invoice_totals(&self.items);
        let stale = fresh != self.totals();
        self.apply_totals(fresh);
        stale
    }

    pub fn replace_items(&mut self, items: Vec<InvoiceItem>, now: DateTime<Utc>) {
        self.items = items;
        self.recompute_totals();
        self.updated_at = now;
    }

    pub fn set_status(&mut self, status: InvoiceStatus, now: DateTime<Utc>) -> InvoiceStatus {
        let previous = std::mem::replace(&mut self.status, status);
        self.updated_at = now;
        previous
    }

    /// A sent invoice past its due date. Nothing flips the status on its
    /// own; see [`crate::config::State::mark_overdue`].
    pub fn is_past_due(&self, today: NaiveDate) -> bool {
        self.status == InvoiceStatus::Sent && self.due_date < today
    }

    /// Case-insensitive substring match on the invoice number or customer name.
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        self.invoice_number.to_lowercase().contains(&query)
            || self.customer.name.to_lowercase().contains(&query)
    }

    fn apply_totals(&mut self, totals: InvoiceTotals) {
        self.subtotal = totals.subtotal;
        self.cgst = totals.cgst;
        self.sgst = totals.sgst;
        self.total = totals.total;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer() -> Customer {
        Customer {
            name: "Ramesh Kumar".to_string(),
            address: "Station Road".to_string(),
            city: "Motihari".to_string(),
            phone: "+91 90000 00000".to_string(),
            email: "ramesh@example.com".to_string(),
            gstin: None,
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample(now: DateTime<Utc>) -> Invoice {
        Invoice::new(
            "RS-2026-0001".to_string(),
            date("2026-03-01"),
            date("2026-03-15"),
            customer(),
            vec![InvoiceItem::new("Panel", "85414011", 2.0, 18_500.0).unwrap()],
            String::new(),
            now,
        )
    }

    #[test]
    fn new_invoice_is_draft_with_totals() {
        let invoice = sample(Utc::now());
        assert_eq!(invoice.status, InvoiceStatus::Draft);
        assert_eq!(invoice.total, 43_660.0);
        assert_eq!(invoice.cgst, invoice.sgst);
    }

    #[test]
    fn any_status_can_follow_any_other() {
        let now = Utc::now();
        let mut invoice = sample(now);
        for from in InvoiceStatus::ALL {
            for to in InvoiceStatus::ALL {
                invoice.set_status(from, now);
                assert_eq!(invoice.set_status(to, now), from);
                assert_eq!(invoice.status, to);
            }
        }
    }

    #[test]
    fn stale_totals_are_detected() {
        let mut invoice = sample(Utc::now());
        invoice.total = 1.0;
        assert!(invoice.recompute_totals());
        assert_eq!(invoice.total, 43_660.0);
        assert!(!invoice.recompute_totals());
    }

    #[test]
    fn past_due_only_applies_to_sent() {
        let mut invoice = sample(Utc::now());
        let later = date("2026-04-01");
        assert!(!invoice.is_past_due(later));

        invoice.status = InvoiceStatus::Sent;
        assert!(invoice.is_past_due(later));
        assert!(!invoice.is_past_due(date("2026-03-15")));
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Paid".parse::<InvoiceStatus>(), Ok(InvoiceStatus::Paid));
        assert_eq!(" cancelled ".parse::<InvoiceStatus>(), Ok(InvoiceStatus::Cancelled));
        assert!("void".parse::<InvoiceStatus>().is_err());
    }

    #[test]
    fn search_matches_number_or_customer() {
        let invoice = sample(Utc::now());
        assert!(invoice.matches_search("rs-2026-00"));
        assert!(invoice.matches_search(" kumar "));
        assert!(invoice.matches_search(""));
        assert!(!invoice.matches_search("Sunita"));
        assert!(!invoice.matches_search("Motihari"));
    }
}
