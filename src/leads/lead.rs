use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{Result, SolarError};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Qualified,
    Converted,
    Lost,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LeadSource {
    #[default]
    Contact,
    Referral,
    Calculator,
    ExitPopup,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown lead {kind} '{value}'")]
pub struct ParseLeadError {
    pub kind: &'static str,
    pub value: String,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 5] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Qualified,
        LeadStatus::Converted,
        LeadStatus::Lost,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Qualified => "qualified",
            LeadStatus::Converted => "converted",
            LeadStatus::Lost => "lost",
        }
    }
}

impl LeadSource {
    pub const ALL: [LeadSource; 4] = [
        LeadSource::Contact,
        LeadSource::Referral,
        LeadSource::Calculator,
        LeadSource::ExitPopup,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LeadSource::Contact => "contact",
            LeadSource::Referral => "referral",
            LeadSource::Calculator => "calculator",
            LeadSource::ExitPopup => "exit_popup",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LeadSource::Contact => "Contact Form",
            LeadSource::Referral => "Referral",
            LeadSource::Calculator => "Calculator",
            LeadSource::ExitPopup => "Exit Popup",
        }
    }

    /// Site page the submission came from.
    pub fn page_url(self) -> Option<&'static str> {
        match self {
            LeadSource::Contact => Some("/contact"),
            LeadSource::Referral => Some("/referral"),
            LeadSource::Calculator => Some("/calculator"),
            LeadSource::ExitPopup => None,
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for LeadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = ParseLeadError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        LeadStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseLeadError {
                kind: "status",
                value: s.to_string(),
            })
    }
}

impl FromStr for LeadSource {
    type Err = ParseLeadError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_");
        LeadSource::ALL
            .into_iter()
            .find(|source| source.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| ParseLeadError {
                kind: "source",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: u32,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub source: LeadSource,
    #[serde(default)]
    pub status: LeadStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referred_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referred_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referred_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_bill: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_url: Option<String>,
}

/// A lead as submitted from one of the site forms, before it is stored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewLead {
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub source: LeadSource,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub referred_name: Option<String>,
    #[serde(default)]
    pub referred_phone: Option<String>,
    #[serde(default)]
    pub referred_email: Option<String>,
    #[serde(default)]
    pub system_size: Option<String>,
    #[serde(default)]
    pub monthly_bill: Option<f64>,
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn blank_opt(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, blank)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl NewLead {
    pub fn validate(&self) -> Result<()> {
        match self.source {
            LeadSource::Referral => {
                if blank(&self.name) || blank(&self.phone) {
                    return Err(SolarError::InvalidLead(
                        "referrer name and phone are required".to_string(),
                    ));
                }
                if blank_opt(&self.referred_name) || blank_opt(&self.referred_phone) {
                    return Err(SolarError::InvalidLead(
                        "friend name and phone are required".to_string(),
                    ));
                }
            }
            _ => {
                if blank(&self.name) || blank(&self.email) || blank(&self.phone) {
                    return Err(SolarError::InvalidLead(
                        "name, email, and phone are required".to_string(),
                    ));
                }
            }
        }

        if !blank(&self.email) && !self.email.contains('@') {
            return Err(SolarError::InvalidLead(format!(
                "'{}' is not an email address",
                self.email
            )));
        }
        if let Some(bill) = self.monthly_bill {
            if !bill.is_finite() || bill < 0.0 {
                return Err(SolarError::InvalidLead(
                    "monthly bill must not be negative".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub(crate) fn into_lead(self, id: u32, now: DateTime<Utc>) -> Lead {
        let message = match (self.source, non_blank(self.message)) {
            (_, Some(message)) => Some(message),
            (LeadSource::Referral, None) => Some(format!(
                "Referral: {} referred {}",
                self.name.trim(),
                self.referred_name.as_deref().unwrap_or_default().trim()
            )),
            (_, None) => None,
        };

        Lead {
            id,
            created_at: now,
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            source: self.source,
            status: LeadStatus::New,
            message,
            notes: None,
            service: non_blank(self.service),
            referred_name: non_blank(self.referred_name),
            referred_phone: non_blank(self.referred_phone),
            referred_email: non_blank(self.referred_email),
            system_size: non_blank(self.system_size),
            monthly_bill: self.monthly_bill,
            page_url: self.source.page_url().map(str::to_string),
        }
    }
}
