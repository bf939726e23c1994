use serde::{Deserialize, Serialize};

use crate::error::{Result, SolarError};

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub company: Company,
    #[serde(default)]
    pub invoice: InvoiceSettings,
    #[serde(default)]
    pub limits: LimitSettings,
    #[serde(default)]
    pub notify: NotifySettings,
    #[serde(default)]
    pub pdf: PdfSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Company {
    pub name: String,
    #[serde(default)]
    pub tagline: Option<String>,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub email: String,
    pub gstin: String,
    #[serde(default)]
    pub upi_id: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub bank: Option<BankDetails>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BankDetails {
    pub account_name: String,
    pub bank: String,
    pub account: String,
    pub ifsc: String,
    pub branch: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct InvoiceSettings {
    pub due_days: u32,
    pub currency_symbol: String,
}

impl Default for InvoiceSettings {
    fn default() -> Self {
        Self {
            due_days: 14,
            currency_symbol: "₹".to_string(),
        }
    }
}

/// Submission gate for lead forms.
#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub struct LimitSettings {
    pub max_requests: u32,
    pub window_secs: i64,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window_secs: 60,
        }
    }
}

impl LimitSettings {
    /// Longest accepted window: one week.
    pub const MAX_WINDOW_SECS: i64 = 7 * 24 * 60 * 60;

    pub fn validate(&self) -> Result<()> {
        if self.max_requests == 0 {
            return Err(SolarError::invalid(
                "limits.max_requests",
                "must be at least 1",
            ));
        }
        if !(1..=Self::MAX_WINDOW_SECS).contains(&self.window_secs) {
            return Err(SolarError::invalid(
                "limits.window_secs",
                format!(
                    "{} must be between 1 and {}",
                    self.window_secs,
                    Self::MAX_WINDOW_SECS
                ),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NotifySettings {
    pub enabled: bool,
    pub from: String,
    pub admin_email: String,
    /// Name of the environment variable holding the Resend API key.
    pub api_key_env: String,
    pub endpoint: String,
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            from: "Solar Desk <onboarding@resend.dev>".to_string(),
            admin_email: String::new(),
            api_key_env: "RESEND_API_KEY".to_string(),
            endpoint: "https://api.resend.com/emails".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PdfSettings {
    pub output_dir: String,
}

impl Default for PdfSettings {
    fn default() -> Self {
        Self {
            output_dir: "output".to_string(),
        }
    }
}
