use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rand::Rng;
use serde::Serialize;

use super::invoice::{Customer, Invoice};
use super::item::InvoiceItem;
use super::words::number_to_words;
use crate::config::{resolve_output_dir, BankDetails, CatalogItem, Config, InvoiceSettings, State};
use crate::error::{Result, SolarError};
use crate::format::format_money_exact;
use crate::pdf::generate_pdf;

/// Parse item input like "panel-440w:6" into (item_id, quantity)
fn parse_item_input(input: &str) -> Result<(&str, f64)> {
    let (item_id, qty_str) = input
        .split_once(':')
        .filter(|(id, qty)| !id.is_empty() && !qty.contains(':'))
        .ok_or_else(|| SolarError::InvalidItemFormat(input.to_string()))?;

    let quantity: f64 = qty_str
        .trim()
        .parse()
        .map_err(|_| SolarError::invalid("quantity", format!("'{qty_str}' is not a number")))?;

    Ok((item_id.trim(), quantity))
}

/// Parse a custom line "NAME;HSN;QTY;RATE"
fn parse_line_input(input: &str) -> Result<InvoiceItem> {
    let parts: Vec<&str> = input.split(';').map(str::trim).collect();
    let [name, hsn, qty, rate] = parts[..] else {
        return Err(SolarError::InvalidLineFormat(input.to_string()));
    };
    if name.is_empty() {
        return Err(SolarError::InvalidLineFormat(input.to_string()));
    }

    let quantity: f64 = qty
        .parse()
        .map_err(|_| SolarError::invalid("quantity", format!("'{qty}' is not a number")))?;
    let rate: f64 = rate
        .parse()
        .map_err(|_| SolarError::invalid("rate", format!("'{rate}' is not a number")))?;

    InvoiceItem::new(name, hsn, quantity, rate)
}

/// Resolve catalog references and custom lines into invoice items, catalog
/// items first, each group in the order given.
pub fn build_items(
    catalog: &BTreeMap<String, CatalogItem>,
    item_inputs: &[String],
    line_inputs: &[String],
) -> Result<Vec<InvoiceItem>> {
    let mut items = Vec::with_capacity(item_inputs.len() + line_inputs.len());

    for input in item_inputs {
        let (item_id, quantity) = parse_item_input(input)?;
        let entry = catalog
            .get(item_id)
            .ok_or_else(|| SolarError::ItemNotFound(item_id.to_string()))?;
        items.push(InvoiceItem::new(&entry.name, &entry.hsn, quantity, entry.rate)?);
    }

    for input in line_inputs {
        items.push(parse_line_input(input)?);
    }

    if items.is_empty() {
        return Err(SolarError::NoItems);
    }
    Ok(items)
}

/// Parse a YYYY-MM-DD date argument.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| SolarError::InvalidDate(input.to_string()))
}

/// Everything needed to raise a new invoice.
#[derive(Debug, Clone)]
pub struct InvoiceDraft {
    pub customer: Customer,
    pub items: Vec<InvoiceItem>,
    /// Defaults to today.
    pub date: Option<NaiveDate>,
    /// Defaults to `date + due_days`.
    pub due_date: Option<NaiveDate>,
    pub notes: String,
}

/// Number, date and store a new draft invoice.
pub fn create_invoice<'a, R: Rng + ?Sized>(
    state: &'a mut State,
    settings: &InvoiceSettings,
    draft: InvoiceDraft,
    today: NaiveDate,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<&'a Invoice> {
    if draft.customer.name.trim().is_empty() {
        return Err(SolarError::invalid("customer name", "must not be empty"));
    }
    if draft.items.is_empty() {
        return Err(SolarError::NoItems);
    }

    let date = draft.date.unwrap_or(today);
    let due_date = match draft.due_date {
        Some(due) => due,
        None => date
            .checked_add_signed(Duration::days(i64::from(settings.due_days)))
            .ok_or_else(|| SolarError::InvalidDate(date.to_string()))?,
    };
    if due_date < date {
        return Err(SolarError::invalid(
            "due date",
            format!("{due_date} is before the invoice date {date}"),
        ));
    }

    let number = state.issue_invoice_number(today.year(), rng)?;
    let invoice = Invoice::new(
        number,
        date,
        due_date,
        draft.customer,
        draft.items,
        draft.notes,
        now,
    );
    tracing::info!(
        invoice = %invoice.invoice_number,
        total = invoice.total,
        lines = invoice.items.len(),
        "invoice created"
    );
    state.insert_invoice(invoice)
}

/// A line item as printed on the PDF
#[derive(Debug, Serialize)]
pub struct DocumentLine {
    pub index: usize,
    pub name: String,
    pub hsn: String,
    pub quantity: String,
    pub rate: String,
    pub amount: String,
}

/// Party block on the PDF (seller or buyer)
#[derive(Debug, Serialize)]
pub struct DocumentParty {
    pub name: String,
    pub tagline: Option<String>,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub email: String,
    pub gstin: Option<String>,
}

/// Complete invoice data for PDF generation, amounts preformatted
#[derive(Debug, Serialize)]
pub struct InvoiceDocument {
    pub number: String,
    pub date: String,
    pub due_date: String,
    pub status: String,
    pub seller: DocumentParty,
    pub buyer: DocumentParty,
    pub items: Vec<DocumentLine>,
    pub subtotal: String,
    pub cgst: String,
    pub sgst: String,
    pub total: String,
    pub amount_in_words: String,
    pub notes: Option<String>,
    pub bank: Option<BankDetails>,
    pub upi_id: Option<String>,
}

impl InvoiceDocument {
    pub fn new(invoice: &Invoice, config: &Config) -> Result<Self> {
        let symbol = config.invoice.currency_symbol.as_str();
        let company = &config.company;

        let items = invoice
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| DocumentLine {
                index: i + 1,
                name: item.name().to_string(),
                hsn: item.hsn().to_string(),
                quantity: format_quantity(item.quantity()),
                rate: format_money_exact(item.rate(), symbol),
                amount: format_money_exact(item.amount(), symbol),
            })
            .collect();

        Ok(Self {
            number: invoice.invoice_number.clone(),
            date: invoice.date.format("%d %B %Y").to_string(),
            due_date: invoice.due_date.format("%d %B %Y").to_string(),
            status: invoice.status.label().to_string(),
            seller: DocumentParty {
                name: company.name.clone(),
                tagline: company.tagline.clone(),
                address: company.address.clone(),
                city: company.city.clone(),
                phone: company.phone.clone(),
                email: company.email.clone(),
                gstin: Some(company.gstin.clone()).filter(|g| !g.is_empty()),
            },
            buyer: DocumentParty {
                name: invoice.customer.name.clone(),
                tagline: None,
                address: invoice.customer.address.clone(),
                city: invoice.customer.city.clone(),
                phone: invoice.customer.phone.clone(),
                email: invoice.customer.email.clone(),
                gstin: invoice.customer.gstin.clone(),
            },
            items,
            subtotal: format_money_exact(invoice.subtotal, symbol),
            cgst: format_money_exact(invoice.cgst, symbol),
            sgst: format_money_exact(invoice.sgst, symbol),
            total: format_money_exact(invoice.total, symbol),
            amount_in_words: number_to_words(invoice.total)?,
            notes: Some(invoice.notes.clone()).filter(|n| !n.trim().is_empty()),
            bank: company.bank.clone(),
            upi_id: company.upi_id.clone(),
        })
    }
}

/// "6" for whole quantities, "2.5" otherwise.
pub fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{quantity:.0}")
    } else {
        let text = format!("{quantity:.3}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Where the PDF for `number` lives.
pub fn invoice_pdf_path(cfg_dir: &Path, config: &Config, number: &str) -> PathBuf {
    resolve_output_dir(&config.pdf.output_dir, cfg_dir).join(format!("{number}.pdf"))
}

/// Render the PDF for a stored invoice, replacing any earlier copy.
pub fn render_invoice(cfg_dir: &Path, config: &Config, invoice: &Invoice) -> Result<PathBuf> {
    let document = InvoiceDocument::new(invoice, config)?;
    let pdf_path = invoice_pdf_path(cfg_dir, config, &invoice.invoice_number);
    if let Some(parent) = pdf_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    generate_pdf(&document, &pdf_path)?;
    tracing::info!(invoice = %invoice.invoice_number, path = %pdf_path.display(), "pdf written");
    Ok(pdf_path)
}

/// Get the PDF path for an invoice that has already been rendered
pub fn existing_invoice_pdf(cfg_dir: &Path, config: &Config, number: &str) -> Result<PathBuf> {
    let pdf_path = invoice_pdf_path(cfg_dir, config, number);
    if !pdf_path.exists() {
        return Err(SolarError::InvoiceFileNotFound(pdf_path));
    }
    Ok(pdf_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::{parse_invoice_number, InvoiceStatus};
    use crate::config::{CATALOG_TEMPLATE, CONFIG_TEMPLATE};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn catalog() -> BTreeMap<String, CatalogItem> {
        toml::from_str(CATALOG_TEMPLATE).unwrap()
    }

    fn customer() -> Customer {
        Customer {
            name: "Ramesh Kumar".to_string(),
            address: "Station Road".to_string(),
            city: "Motihari".to_string(),
            phone: "9876543210".to_string(),
            email: "ramesh@example.com".to_string(),
            gstin: None,
        }
    }

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn item_inputs() {
        assert_eq!(parse_item_input("panel-440w:6").unwrap(), ("panel-440w", 6.0));
        assert!(matches!(
            parse_item_input("panel-440w"),
            Err(SolarError::InvalidItemFormat(_))
        ));
        assert!(matches!(
            parse_item_input("panel-440w:six"),
            Err(SolarError::InvalidInput { field: "quantity", .. })
        ));
    }

    #[test]
    fn catalog_and_custom_lines() {
        let items = build_items(
            &catalog(),
            &["panel-540w:6".to_string()],
            &["Site survey;998314;1;2500".to_string()],
        )
        .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].hsn(), "85414011");
        assert_eq!(items[0].amount(), 132_000.0);
        assert_eq!(items[1].name(), "Site survey");
        assert_eq!(items[1].amount(), 2_500.0);
    }

    #[test]
    fn unknown_and_empty() {
        assert!(matches!(
            build_items(&catalog(), &["solar-kettle:1".to_string()], &[]),
            Err(SolarError::ItemNotFound(id)) if id == "solar-kettle"
        ));
        assert!(matches!(build_items(&catalog(), &[], &[]), Err(SolarError::NoItems)));
        assert!(matches!(
            build_items(&catalog(), &[], &["just a name".to_string()]),
            Err(SolarError::InvalidLineFormat(_))
        ));
        assert!(matches!(
            build_items(&catalog(), &["amc:0".to_string()], &[]),
            Err(SolarError::InvalidInput { field: "quantity", .. })
        ));
    }

    #[test]
    fn create_defaults_due_date_and_numbers_by_year() {
        let mut state = State::default();
        let mut rng = StdRng::seed_from_u64(7);
        let items = build_items(&catalog(), &["panel-440w:2".to_string()], &[]).unwrap();
        let draft = InvoiceDraft {
            customer: customer(),
            items,
            date: None,
            due_date: None,
            notes: String::new(),
        };

        let invoice = create_invoice(
            &mut state,
            &InvoiceSettings::default(),
            draft,
            date("2026-03-01"),
            Utc::now(),
            &mut rng,
        )
        .unwrap();

        assert_eq!(invoice.status, InvoiceStatus::Draft);
        assert_eq!(invoice.date, date("2026-03-01"));
        assert_eq!(invoice.due_date, date("2026-03-15"));
        assert_eq!(invoice.total, 43_660.0);
        assert_eq!(parse_invoice_number(&invoice.invoice_number).map(|(y, _)| y), Some(2026));
        assert_eq!(state.invoices.len(), 1);
    }

    #[test]
    fn create_rejects_due_before_date() {
        let mut state = State::default();
        let mut rng = StdRng::seed_from_u64(1);
        let draft = InvoiceDraft {
            customer: customer(),
            items: vec![InvoiceItem::new("AMC", "998714", 1.0, 6_000.0).unwrap()],
            date: Some(date("2026-03-10")),
            due_date: Some(date("2026-03-01")),
            notes: String::new(),
        };
        let err = create_invoice(
            &mut state,
            &InvoiceSettings::default(),
            draft,
            date("2026-03-10"),
            Utc::now(),
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, SolarError::InvalidInput { field: "due date", .. }));
        assert!(state.invoices.is_empty());
    }

    #[test]
    fn document_is_preformatted() {
        let config: Config = toml::from_str(CONFIG_TEMPLATE).unwrap();
        let invoice = Invoice::new(
            "RS-2026-0042".to_string(),
            date("2026-03-01"),
            date("2026-03-15"),
            customer(),
            vec![InvoiceItem::new("Panel", "85414011", 2.0, 18_500.0).unwrap()],
            "Thank you".to_string(),
            Utc::now(),
        );

        let doc = InvoiceDocument::new(&invoice, &config).unwrap();
        assert_eq!(doc.date, "01 March 2026");
        assert_eq!(doc.items[0].quantity, "2");
        assert_eq!(doc.subtotal, "₹37,000.00");
        assert_eq!(doc.cgst, "₹3,330.00");
        assert_eq!(doc.total, "₹43,660.00");
        assert_eq!(
            doc.amount_in_words,
            "Forty Three Thousand Six Hundred and Sixty Rupees Only"
        );
        assert_eq!(doc.notes.as_deref(), Some("Thank you"));
        assert!(doc.buyer.gstin.is_none());
    }

    #[test]
    fn quantities() {
        assert_eq!(format_quantity(6.0), "6");
        assert_eq!(format_quantity(2.5), "2.5");
        assert_eq!(format_quantity(0.125), "0.125");
    }
}
