mod lead;
mod stats;

pub use lead::{Lead, LeadSource, LeadStatus, NewLead, ParseLeadError};
pub use stats::{LeadStats, AVERAGE_DEAL_VALUE};

use chrono::{DateTime, Utc};

use crate::config::{Config, State};
use crate::error::Result;
use crate::notify::{self, Message, Notifier};

/// Record a form submission: rate-limit the caller, validate, store the
/// lead and notify. Mail failures are logged and never reject the lead.
pub fn submit_lead(
    state: &mut State,
    config: &Config,
    notifier: &dyn Notifier,
    new_lead: NewLead,
    caller: &str,
    now: DateTime<Utc>,
) -> Result<Lead> {
    state.rate_limits.enforce(caller, config.limits, now)?;
    new_lead.validate()?;

    let lead = state.add_lead(new_lead, now).clone();
    tracing::info!(id = lead.id, source = %lead.source, caller, "lead recorded");

    if let Some(alert) = notify::lead_alert(&lead, &config.company, &config.notify) {
        deliver(notifier, &alert);
    }
    if lead.source == LeadSource::Contact {
        if let Some(reply) = notify::auto_reply(&lead, &config.company, &config.notify) {
            deliver(notifier, &reply);
        }
    }

    Ok(lead)
}

fn deliver(notifier: &dyn Notifier, message: &Message) {
    if let Err(e) = notifier.send(message) {
        tracing::warn!(error = %e, subject = %message.subject, "notification failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LimitSettings, NotifySettings};
    use crate::error::SolarError;
    use crate::notify::testing::RecordingNotifier;

    fn config() -> Config {
        toml::from_str(crate::config::CONFIG_TEMPLATE).unwrap()
    }

    fn contact() -> NewLead {
        NewLead {
            name: "Sunita Devi".to_string(),
            email: "sunita@example.com".to_string(),
            phone: "9876543210".to_string(),
            ..NewLead::default()
        }
    }

    #[test]
    fn contact_lead_is_stored_and_mailed_twice() {
        let mut cfg = config();
        cfg.notify = NotifySettings {
            admin_email: "admin@example.com".to_string(),
            ..NotifySettings::default()
        };
        let mut state = State::default();
        let notifier = RecordingNotifier::default();

        let lead = submit_lead(&mut state, &cfg, &notifier, contact(), "1.2.3.4", Utc::now())
            .unwrap();

        assert_eq!(lead.id, 1);
        assert_eq!(state.leads.len(), 1);
        let sent = notifier.sent.borrow();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].to, vec!["sunita@example.com".to_string()]);
    }

    #[test]
    fn calculator_lead_gets_no_auto_reply() {
        let mut cfg = config();
        cfg.notify.admin_email = "admin@example.com".to_string();
        let mut state = State::default();
        let notifier = RecordingNotifier::default();
        let new_lead = NewLead {
            source: LeadSource::Calculator,
            system_size: Some("4 kW".to_string()),
            monthly_bill: Some(3000.0),
            ..contact()
        };

        submit_lead(&mut state, &cfg, &notifier, new_lead, "1.2.3.4", Utc::now()).unwrap();

        let sent = notifier.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].subject.contains("4 kW quote"));
    }

    #[test]
    fn mail_failure_keeps_the_lead() {
        let mut state = State::default();
        let notifier = RecordingNotifier {
            fail: true,
            ..RecordingNotifier::default()
        };
        let lead = submit_lead(&mut state, &config(), &notifier, contact(), "x", Utc::now());
        assert!(lead.is_ok());
        assert_eq!(state.leads.len(), 1);
    }

    #[test]
    fn sixth_submission_in_a_minute_is_refused() {
        let mut cfg = config();
        cfg.limits = LimitSettings {
            max_requests: 5,
            window_secs: 60,
        };
        let mut state = State::default();
        let notifier = RecordingNotifier::default();
        let now = Utc::now();

        for _ in 0..5 {
            submit_lead(&mut state, &cfg, &notifier, contact(), "5.6.7.8", now).unwrap();
        }
        let err = submit_lead(&mut state, &cfg, &notifier, contact(), "5.6.7.8", now).unwrap_err();
        assert!(matches!(err, SolarError::RateLimited { .. }));
        assert_eq!(state.leads.len(), 5);

        // Another caller is unaffected.
        assert!(submit_lead(&mut state, &cfg, &notifier, contact(), "9.9.9.9", now).is_ok());
    }

    #[test]
    fn invalid_submission_still_counts_against_the_limit() {
        let cfg = config();
        let mut state = State::default();
        let notifier = RecordingNotifier::default();
        let bad = NewLead {
            phone: String::new(),
            ..contact()
        };

        let err = submit_lead(&mut state, &cfg, &notifier, bad, "1.1.1.1", Utc::now()).unwrap_err();
        assert!(matches!(err, SolarError::InvalidLead(_)));
        assert!(state.leads.is_empty());
        assert_eq!(state.rate_limits.window("1.1.1.1").map(|w| w.count), Some(1));
    }
}
