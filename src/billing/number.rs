use chrono::{Datelike, Local};
use rand::Rng;

pub const INVOICE_PREFIX: &str = "RS";
pub const MAX_SEQUENCE: u32 = 9999;

/// Random invoice number for the current year, e.g. `RS-2026-0417`.
///
/// Not unique on its own; [`crate::config::State::issue_invoice_number`]
/// checks candidates against the stored invoices.
pub fn generate_invoice_number() -> String {
    let mut rng = rand::rng();
    random_invoice_number(&mut rng, Local::now().year())
}

pub fn random_invoice_number<R: Rng + ?Sized>(rng: &mut R, year: i32) -> String {
    format_invoice_number(year, rng.random_range(1..=MAX_SEQUENCE))
}

pub fn format_invoice_number(year: i32, seq: u32) -> String {
    format!("{INVOICE_PREFIX}-{year}-{seq:04}")
}

/// Year and sequence of a well-formed invoice number.
pub fn parse_invoice_number(number: &str) -> Option<(i32, u32)> {
    let mut parts = number.split('-');
    if parts.next()? != INVOICE_PREFIX {
        return None;
    }
    let year = parts.next()?;
    let seq = parts.next()?;
    if parts.next().is_some() || year.len() != 4 || seq.len() != 4 {
        return None;
    }
    if !year.bytes().chain(seq.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((year.parse().ok()?, seq.parse().ok()?))
}
