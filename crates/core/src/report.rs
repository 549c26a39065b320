//! Telemetry report type and boundary validation.
//!
//! Bots POST one report at login, periodically while running, and once at
//! logout. The payload shape is fixed; what varies is `logout_time`, whose
//! presence is the login/logout discriminant. Malformed payloads are
//! rejected here, at the boundary, so `None` never leaks into the ledger
//! where a value was required.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{Error, Result};
use crate::record::SessionKey;

/// One telemetry report from a bot process.
///
/// Counter fields carry running totals since the bot process started; a
/// later report for the same session overwrites, never adds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SessionReport {
    #[validate(length(min = 1, max = 64))]
    pub client_id: String,
    pub session_date: NaiveDate,
    pub login_time: DateTime<Utc>,
    /// Absent on login and periodic refreshes, present on logout.
    pub logout_time: Option<DateTime<Utc>>,
    #[validate(length(max = 64))]
    pub device_id: Option<String>,
    #[validate(length(max = 128))]
    pub username: Option<String>,
    #[validate(length(max = 128))]
    pub device_username: Option<String>,
    #[validate(length(max = 32))]
    pub mode: Option<String>,
    /// Cumulative trade count since process start.
    #[serde(default)]
    #[validate(range(min = 0))]
    pub total_trades: i64,
    #[serde(default)]
    pub net_pnl: f64,
    #[serde(default)]
    pub gross_pnl: f64,
    #[serde(default)]
    pub charges: f64,
}

impl SessionReport {
    /// Parse and validate a report from JSON bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let report: Self = serde_json::from_slice(bytes)?;
        report.ensure_valid()?;
        Ok(report)
    }

    /// Validate field constraints and cross-field invariants.
    pub fn ensure_valid(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(Error::missing_field("client_id"));
        }

        Validate::validate(self).map_err(|e| Error::validation(e.to_string()))?;

        // logout_time must not precede login_time when both are known
        if let Some(logout) = self.logout_time {
            if logout < self.login_time {
                return Err(Error::validation(format!(
                    "logout_time {} precedes login_time {}",
                    logout, self.login_time
                )));
            }
        }

        Ok(())
    }

    /// Whether this report opens a session (no logout recorded).
    pub fn is_login(&self) -> bool {
        self.logout_time.is_none()
    }

    /// Returns the natural key this report upserts against.
    pub fn key(&self) -> SessionKey {
        SessionKey {
            client_id: self.client_id.clone(),
            session_date: self.session_date,
            login_time: self.login_time,
        }
    }
}
