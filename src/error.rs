use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SolarError {
    #[error("Config directory not found at {0}. Run 'solarbook init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write {path}: {reason}")]
    StateWrite { path: PathBuf, reason: String },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Item '{0}' not found in catalog.toml")]
    ItemNotFound(String),

    #[error("Invalid item format '{0}'. Expected 'item:quantity' (e.g., 'panel-440w:6')")]
    InvalidItemFormat(String),

    #[error("Invalid line format '{0}'. Expected 'NAME;HSN;QTY;RATE'")]
    InvalidLineFormat(String),

    #[error("No items specified. Use --item <id>:<quantity> or --line to add line items.")]
    NoItems,

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invoice '{0}' not found")]
    InvoiceNotFound(String),

    #[error("Invalid invoice index '{0}'. Use 'solarbook list' to see available invoices.")]
    InvalidInvoiceIndex(String),

    #[error("Invoice number {0} is already in use")]
    DuplicateInvoiceNumber(String),

    #[error("All invoice numbers for {0} are in use")]
    InvoiceNumbersExhausted(i32),

    #[error("Invoice file not found: {0}")]
    InvoiceFileNotFound(PathBuf),

    #[error("Lead #{0} not found")]
    LeadNotFound(u32),

    #[error("Invalid lead: {0}")]
    InvalidLead(String),

    #[error("Too many requests from {caller}. Please try again in {retry_after_secs} seconds.")]
    RateLimited { caller: String, retry_after_secs: i64 },

    #[error("Typst not found. Install it from https://typst.app/ or run: cargo install typst-cli")]
    TypstNotFound,

    #[error("Failed to generate PDF: {0}")]
    PdfGeneration(String),

    #[error("Failed to send notification: {0}")]
    Notification(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SolarError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        SolarError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SolarError>;
