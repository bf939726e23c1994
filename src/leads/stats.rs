use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::lead::{Lead, LeadSource, LeadStatus};

/// Average deal size used to value converted leads.
pub const AVERAGE_DEAL_VALUE: f64 = 150_000.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadStats {
    pub total: usize,
    pub this_week: usize,
    pub this_month: usize,
    pub converted: usize,
    /// Whole percent of leads that converted.
    pub conversion_rate: u32,
    pub estimated_revenue: f64,
    pub by_status: BTreeMap<LeadStatus, usize>,
    pub by_source: BTreeMap<LeadSource, usize>,
}

impl LeadStats {
    pub fn compute(leads: &[Lead], now: DateTime<Utc>) -> Self {
        let week_ago = now - Duration::days(7);
        let month_ago = now - Duration::days(30);

        let mut by_status: BTreeMap<LeadStatus, usize> =
            LeadStatus::ALL.into_iter().map(|s| (s, 0)).collect();
        let mut by_source: BTreeMap<LeadSource, usize> =
            LeadSource::ALL.into_iter().map(|s| (s, 0)).collect();

        for lead in leads {
            *by_status.entry(lead.status).or_default() += 1;
            *by_source.entry(lead.source).or_default() += 1;
        }

        let total = leads.len();
        let converted = by_status[&LeadStatus::Converted];
        let conversion_rate = if total == 0 {
            0
        } else {
            (converted as f64 / total as f64 * 100.0).round() as u32
        };

        Self {
            total,
            this_week: leads.iter().filter(|l| l.created_at > week_ago).count(),
            this_month: leads.iter().filter(|l| l.created_at > month_ago).count(),
            converted,
            conversion_rate,
            estimated_revenue: converted as f64 * AVERAGE_DEAL_VALUE,
            by_status,
            by_source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leads::NewLead;

    fn lead(id: u32, created_at: DateTime<Utc>, status: LeadStatus, source: LeadSource) -> Lead {
        let mut lead = NewLead {
            name: format!("Lead {id}"),
            email: format!("lead{id}@example.com"),
            phone: "9000000000".to_string(),
            source,
            ..NewLead::default()
        }
        .into_lead(id, created_at);
        lead.status = status;
        lead
    }

    #[test]
    fn empty_store() {
        let stats = LeadStats::compute(&[], Utc::now());
        assert_eq!(stats.total, 0);
        assert_eq!(stats.conversion_rate, 0);
        assert_eq!(stats.by_status.len(), 5);
        assert!(stats.by_source.values().all(|&n| n == 0));
    }

    #[test]
    fn windows_and_conversion() {
        let now = Utc::now();
        let leads = vec![
            lead(1, now - Duration::days(1), LeadStatus::Converted, LeadSource::Contact),
            lead(2, now - Duration::days(10), LeadStatus::New, LeadSource::Calculator),
            lead(3, now - Duration::days(40), LeadStatus::Lost, LeadSource::Referral),
        ];
        let stats = LeadStats::compute(&leads, now);

        assert_eq!(stats.total, 3);
        assert_eq!(stats.this_week, 1);
        assert_eq!(stats.this_month, 2);
        assert_eq!(stats.converted, 1);
        assert_eq!(stats.conversion_rate, 33);
        assert_eq!(stats.estimated_revenue, 150_000.0);
        assert_eq!(stats.by_source[&LeadSource::Calculator], 1);
        assert_eq!(stats.by_source[&LeadSource::ExitPopup], 0);
    }
}
