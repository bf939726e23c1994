//! Fixed-window submission gate keyed by caller address.
//!
//! The limiter is plain state: it lives inside [`crate::config::State`] so
//! windows survive between invocations, and every check takes the current
//! time from the caller.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::LimitSettings;
use crate::error::{Result, SolarError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateWindow {
    pub count: u32,
    pub reset_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateLimiter {
    windows: BTreeMap<String, RateWindow>,
}

impl RateLimiter {
    pub fn check(&mut self, caller: &str, limits: LimitSettings, now: DateTime<Utc>) -> Decision {
        self.purge_expired(now);

        match self.windows.get_mut(caller) {
            None => {
                let reset_at = window_end(now, limits.window_secs);
                self.windows
                    .insert(caller.to_string(), RateWindow { count: 1, reset_at });
                Decision {
                    allowed: true,
                    remaining: limits.max_requests.saturating_sub(1),
                    reset_at,
                }
            }
            Some(window) if window.count >= limits.max_requests => Decision {
                allowed: false,
                remaining: 0,
                reset_at: window.reset_at,
            },
            Some(window) => {
                window.count += 1;
                Decision {
                    allowed: true,
                    remaining: limits.max_requests - window.count,
                    reset_at: window.reset_at,
                }
            }
        }
    }

    /// Like [`RateLimiter::check`], but a refusal becomes an error.
    pub fn enforce(
        &mut self,
        caller: &str,
        limits: LimitSettings,
        now: DateTime<Utc>,
    ) -> Result<Decision> {
        limits.validate()?;
        let decision = self.check(caller, limits, now);
        if decision.allowed {
            return Ok(decision);
        }
        tracing::warn!(caller, reset_at = %decision.reset_at, "rate limit exceeded");
        Err(SolarError::RateLimited {
            caller: caller.to_string(),
            retry_after_secs: (decision.reset_at - now).num_seconds().max(1),
        })
    }

    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, window| now <= window.reset_at);
        before - self.windows.len()
    }

    pub fn window(&self, caller: &str) -> Option<&RateWindow> {
        self.windows.get(caller)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

/// End of a window opened at `now`; saturates instead of overflowing and
/// never ends before `now`.
fn window_end(now: DateTime<Utc>, window_secs: i64) -> DateTime<Utc> {
    Duration::try_seconds(window_secs.max(0))
        .and_then(|window| now.checked_add_signed(window))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
