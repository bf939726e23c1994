//! Outbound email for new leads.
//!
//! Delivery goes through the Resend HTTP API when it is enabled and a key
//! is present; otherwise messages are only logged.

use std::time::Duration;

use serde::Serialize;
use ureq::Agent;

use crate::config::{Company, NotifySettings};
use crate::error::{Result, SolarError};
use crate::leads::{Lead, LeadSource};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

pub trait Notifier {
    fn send(&self, message: &Message) -> Result<()>;
}

pub struct ResendNotifier {
    agent: Agent,
    endpoint: String,
    api_key: String,
}

impl ResendNotifier {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(10)))
            .build()
            .into();
        Self {
            agent,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

impl Notifier for ResendNotifier {
    fn send(&self, message: &Message) -> Result<()> {
        let body =
            serde_json::to_string(message).map_err(|e| SolarError::Notification(e.to_string()))?;

        self.agent
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .send(body.as_str())
            .map_err(|e| SolarError::Notification(e.to_string()))?;

        tracing::info!(to = ?message.to, subject = %message.subject, "notification sent");
        Ok(())
    }
}

/// Stand-in used when delivery is disabled.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, message: &Message) -> Result<()> {
        tracing::info!(
            to = ?message.to,
            subject = %message.subject,
            "notification not delivered (email disabled)"
        );
        Ok(())
    }
}

pub fn notifier_from_settings(settings: &NotifySettings) -> Box<dyn Notifier> {
    if !settings.enabled {
        return Box::new(LogNotifier);
    }
    match std::env::var(&settings.api_key_env) {
        Ok(key) if !key.trim().is_empty() => {
            Box::new(ResendNotifier::new(settings.endpoint.clone(), key))
        }
        _ => {
            tracing::warn!(
                var = %settings.api_key_env,
                "email notifications enabled but no API key set; logging instead"
            );
            Box::new(LogNotifier)
        }
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn row(label: &str, value: Option<&str>) -> String {
    let value = value.filter(|v| !v.is_empty()).map_or("-".to_string(), escape_html);
    format!("<tr><td style=\"padding:6px 0;font-weight:bold\">{label}:</td><td>{value}</td></tr>")
}

fn table(rows: &[String]) -> String {
    format!(
        "<table style=\"width:100%;border-collapse:collapse\">{}</table>",
        rows.concat()
    )
}

fn wrap(company: &Company, heading: &str, body: &str) -> String {
    let dashboard = company
        .website
        .as_deref()
        .map(|site| {
            format!(
                "<p><a href=\"{}/admin\">View in Dashboard</a></p>",
                site.trim_end_matches('/')
            )
        })
        .unwrap_or_default();
    format!(
        "<div style=\"font-family:sans-serif;max-width:600px;margin:0 auto\">\
         <h1>{}</h1>{body}{dashboard}</div>",
        escape_html(heading)
    )
}

/// Alert for the admin inbox; `None` when no admin address is configured.
pub fn lead_alert(lead: &Lead, company: &Company, settings: &NotifySettings) -> Option<Message> {
    if settings.admin_email.trim().is_empty() {
        return None;
    }

    let (subject, body) = match lead.source {
        LeadSource::Referral => {
            let friend = lead.referred_name.as_deref().unwrap_or_default();
            let subject = format!("New Referral: {} -> {}", lead.name, friend);
            let body = format!(
                "<h3>Referred by:</h3>{}<h3>Friend (potential customer):</h3>{}",
                table(&[
                    row("Name", Some(&lead.name)),
                    row("Phone", Some(&lead.phone)),
                    row("Email", Some(&lead.email)),
                ]),
                table(&[
                    row("Name", lead.referred_name.as_deref()),
                    row("Phone", lead.referred_phone.as_deref()),
                    row("Email", lead.referred_email.as_deref()),
                ]),
            );
            (subject, body)
        }
        source => {
            let topic = lead
                .service
                .clone()
                .or_else(|| lead.system_size.as_ref().map(|size| format!("{size} quote")))
                .unwrap_or_else(|| "General Inquiry".to_string());
            let subject = format!("New Lead: {} - {}", lead.name, topic);
            let bill = lead.monthly_bill.map(|b| format!("{b:.0}"));
            let body = table(&[
                row("Name", Some(&lead.name)),
                row("Email", Some(&lead.email)),
                row("Phone", Some(&lead.phone)),
                row("Source", Some(source.label())),
                row("Service", lead.service.as_deref()),
                row("System size", lead.system_size.as_deref()),
                row("Monthly bill", bill.as_deref()),
                row("Message", lead.message.as_deref()),
            ]);
            (subject, body)
        }
    };

    Some(Message {
        from: settings.from.clone(),
        to: vec![settings.admin_email.clone()],
        html: wrap(company, &format!("New lead for {}", company.name), &body),
        subject,
    })
}

/// Thank-you note for the person who filled in the contact form.
pub fn auto_reply(lead: &Lead, company: &Company, settings: &NotifySettings) -> Option<Message> {
    if lead.email.trim().is_empty() {
        return None;
    }
    let body = format!(
        "<h2>Hi {}!</h2>\
         <p>Thank you for reaching out to us. We've received your inquiry and our \
         solar expert will get back to you within <strong>2 hours</strong>.</p>\
         <p>With the PM Surya Ghar scheme you can get up to Rs 78,000 subsidy on \
         rooftop solar.</p>",
        escape_html(&lead.name)
    );
    Some(Message {
        from: settings.from.clone(),
        to: vec![lead.email.clone()],
        subject: format!("Thank you for contacting {}!", company.name),
        html: wrap(company, &company.name, &body),
    })
}


#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::leads::NewLead;

    fn company() -> Company {
        Company {
            name: "Ratan Solar".to_string(),
            tagline: None,
            address: "Main Road".to_string(),
            city: "Motihari".to_string(),
            phone: "+91 87094 57031".to_string(),
            email: "office@example.com".to_string(),
            gstin: "10AABCR1234F1Z5".to_string(),
            upi_id: None,
            website: Some("https://example.com/".to_string()),
            bank: None,
        }
    }

    fn settings() -> NotifySettings {
        NotifySettings {
            admin_email: "admin@example.com".to_string(),
            ..NotifySettings::default()
        }
    }

    #[test]
    fn contact_alert_escapes_input() {
        let lead = NewLead {
            name: "<b>Ravi</b>".to_string(),
            email: "ravi@example.com".to_string(),
            phone: "9000000000".to_string(),
            service: Some("On-grid 3kW".to_string()),
            ..NewLead::default()
        }
        .into_lead(1, Utc::now());

        let message = lead_alert(&lead, &company(), &settings()).unwrap();
        assert_eq!(message.to, vec!["admin@example.com".to_string()]);
        assert_eq!(message.subject, "New Lead: <b>Ravi</b> - On-grid 3kW");
        assert!(message.html.contains("&lt;b&gt;Ravi&lt;/b&gt;"));
        assert!(message.html.contains("https://example.com/admin"));
    }

    #[test]
    fn referral_alert_names_both_parties() {
        let lead = NewLead {
            name: "Amit".to_string(),
            phone: "9000000001".to_string(),
            source: LeadSource::Referral,
            referred_name: Some("Vikas".to_string()),
            referred_phone: Some("9000000002".to_string()),
            ..NewLead::default()
        }
        .into_lead(2, Utc::now());

        let message = lead_alert(&lead, &company(), &settings()).unwrap();
        assert_eq!(message.subject, "New Referral: Amit -> Vikas");
        assert!(message.html.contains("9000000002"));
    }

    #[test]
    fn no_admin_address_means_no_alert() {
        let lead = NewLead {
            name: "Ravi".to_string(),
            email: "ravi@example.com".to_string(),
            phone: "9000000000".to_string(),
            ..NewLead::default()
        }
        .into_lead(1, Utc::now());
        assert!(lead_alert(&lead, &company(), &NotifySettings::default()).is_none());
        assert!(auto_reply(&lead, &company(), &NotifySettings::default()).is_some());
    }

    #[test]
    fn disabled_settings_fall_back_to_logging() {
        let notifier = notifier_from_settings(&NotifySettings::default());
        let message = Message {
            from: "a@example.com".to_string(),
            to: vec!["b@example.com".to_string()],
            subject: "hi".to_string(),
            html: String::new(),
        };
        assert!(notifier.send(&message).is_ok());
    }
}
