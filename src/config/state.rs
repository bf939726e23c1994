use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::billing::{
    format_invoice_number, random_invoice_number, Invoice, InvoiceStatus, MAX_SEQUENCE,
};
use crate::error::{Result, SolarError};
use crate::leads::{Lead, LeadSource, LeadStatus, NewLead};
use crate::rate_limit::RateLimiter;

/// Random draws before falling back to the lowest free sequence.
const RANDOM_ATTEMPTS: usize = 32;

/// Everything the desk persists: invoices, leads and rate-limit windows.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct State {
    #[serde(default)]
    pub counter: Counter,
    #[serde(default)]
    pub rate_limits: RateLimiter,
    #[serde(default)]
    pub invoices: Vec<Invoice>,
    #[serde(default)]
    pub leads: Vec<Lead>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Counter {
    pub last_lead_id: u32,
}

impl State {
    /// Bring hand-edited data back in line: totals are recomputed from
    /// the stored lines and the lead counter never trails existing ids.
    pub fn normalize(&mut self) {
        for invoice in &mut self.invoices {
            if invoice.recompute_totals() {
                tracing::warn!(
                    invoice = %invoice.invoice_number,
                    "stored totals did not match line items; recomputed"
                );
            }
        }
        let max_id = self.leads.iter().map(|l| l.id).max().unwrap_or(0);
        self.counter.last_lead_id = self.counter.last_lead_id.max(max_id);
    }

    pub fn has_invoice(&self, number: &str) -> bool {
        self.invoices.iter().any(|i| i.invoice_number == number)
    }

    /// Issue an invoice number for `year` that no stored invoice uses.
    pub fn issue_invoice_number<R: Rng + ?Sized>(&self, year: i32, rng: &mut R) -> Result<String> {
        for _ in 0..RANDOM_ATTEMPTS {
            let candidate = random_invoice_number(rng, year);
            if !self.has_invoice(&candidate) {
                return Ok(candidate);
            }
            tracing::debug!(%candidate, "invoice number collision, drawing again");
        }
        (1..=MAX_SEQUENCE)
            .map(|seq| format_invoice_number(year, seq))
            .find(|candidate| !self.has_invoice(candidate))
            .ok_or(SolarError::InvoiceNumbersExhausted(year))
    }

    pub fn insert_invoice(&mut self, invoice: Invoice) -> Result<&Invoice> {
        if self.has_invoice(&invoice.invoice_number) {
            return Err(SolarError::DuplicateInvoiceNumber(invoice.invoice_number));
        }
        self.invoices.push(invoice);
        Ok(&self.invoices[self.invoices.len() - 1])
    }

    /// Invoices newest first, as listed by the CLI.
    pub fn invoices_newest_first(&self) -> Vec<&Invoice> {
        let mut invoices: Vec<&Invoice> = self.invoices.iter().rev().collect();
        invoices.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        invoices
    }

    /// Accept either a 1-based index from `list` or a full invoice number.
    pub fn resolve_invoice(&self, reference: &str) -> Result<String> {
        if let Ok(idx) = reference.parse::<usize>() {
            let invoices = self.invoices_newest_first();
            if idx == 0 || idx > invoices.len() {
                return Err(SolarError::InvalidInvoiceIndex(reference.to_string()));
            }
            return Ok(invoices[idx - 1].invoice_number.clone());
        }

        if self.has_invoice(reference) {
            Ok(reference.to_string())
        } else {
            Err(SolarError::InvoiceNotFound(reference.to_string()))
        }
    }

    pub fn invoice(&self, number: &str) -> Result<&Invoice> {
        self.invoices
            .iter()
            .find(|i| i.invoice_number == number)
            .ok_or_else(|| SolarError::InvoiceNotFound(number.to_string()))
    }

    pub fn invoice_mut(&mut self, number: &str) -> Result<&mut Invoice> {
        self.invoices
            .iter_mut()
            .find(|i| i.invoice_number == number)
            .ok_or_else(|| SolarError::InvoiceNotFound(number.to_string()))
    }

    pub fn set_invoice_status(
        &mut self,
        number: &str,
        status: InvoiceStatus,
        now: DateTime<Utc>,
    ) -> Result<InvoiceStatus> {
        let invoice = self.invoice_mut(number)?;
        let previous = invoice.set_status(status, now);
        tracing::info!(invoice = number, from = %previous, to = %status, "invoice status changed");
        Ok(previous)
    }

    /// Move every sent invoice whose due date has passed to `overdue`.
    /// Returns the affected invoice numbers.
    pub fn mark_overdue(&mut self, today: NaiveDate, now: DateTime<Utc>) -> Vec<String> {
        let mut changed = Vec::new();
        for invoice in self.invoices.iter_mut().filter(|i| i.is_past_due(today)) {
            invoice.set_status(InvoiceStatus::Overdue, now);
            changed.push(invoice.invoice_number.clone());
        }
        if !changed.is_empty() {
            tracing::info!(count = changed.len(), "marked invoices overdue");
        }
        changed
    }

    pub fn remove_invoice(&mut self, number: &str) -> Result<Invoice> {
        let idx = self
            .invoices
            .iter()
            .position(|i| i.invoice_number == number)
            .ok_or_else(|| SolarError::InvoiceNotFound(number.to_string()))?;
        Ok(self.invoices.remove(idx))
    }

    pub fn add_lead(&mut self, new_lead: NewLead, now: DateTime<Utc>) -> &Lead {
        self.counter.last_lead_id += 1;
        let lead = new_lead.into_lead(self.counter.last_lead_id, now);
        self.leads.push(lead);
        &self.leads[self.leads.len() - 1]
    }

    pub fn lead_mut(&mut self, id: u32) -> Result<&mut Lead> {
        self.leads
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(SolarError::LeadNotFound(id))
    }

    pub fn remove_lead(&mut self, id: u32) -> Result<Lead> {
        let idx = self
            .leads
            .iter()
            .position(|l| l.id == id)
            .ok_or(SolarError::LeadNotFound(id))?;
        Ok(self.leads.remove(idx))
    }

    /// Leads newest first, optionally filtered, at most `limit` of them.
    pub fn query_leads(
        &self,
        status: Option<LeadStatus>,
        source: Option<LeadSource>,
        limit: usize,
    ) -> Vec<&Lead> {
        let mut leads: Vec<&Lead> = self
            .leads
            .iter()
            .filter(|l| status.map_or(true, |s| l.status == s))
            .filter(|l| source.map_or(true, |s| l.source == s))
            .collect();
        leads.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        leads.truncate(limit);
        leads
    }
}
