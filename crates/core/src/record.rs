//! Session ledger row types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Mode label stamped on a stale row when the auto-close guard forces it shut
/// and the row never reported a mode of its own.
pub const MODE_AUTO_CLOSED: &str = "AUTO-CLOSED";

/// Sentinel mode shown when a day has no visible activity.
pub const MODE_UNKNOWN: &str = "N/A";

/// Natural identity of a session row.
///
/// A bot reports the same `login_time` in every report belonging to one
/// session, so this triple distinguishes "update to a known session" from
/// "new session". It is unrelated to the single-open-session invariant,
/// which keys on (`client_id`, `device_id`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub client_id: String,
    pub session_date: NaiveDate,
    pub login_time: DateTime<Utc>,
}

/// One login-to-logout (or still open) session instance.
///
/// Counter fields are cumulative since the bot process started, not deltas;
/// see [`crate::timeline`] for the fold that turns them back into deltas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub client_id: String,
    /// Trading-terminal identity the bot is logged into.
    pub device_id: Option<String>,
    pub username: Option<String>,
    /// Display name bound to the terminal account.
    pub device_username: Option<String>,
    pub session_date: NaiveDate,
    pub login_time: DateTime<Utc>,
    /// `None` while the session is still open.
    pub logout_time: Option<DateTime<Utc>>,
    pub mode: Option<String>,
    pub total_trades: i64,
    pub net_pnl: f64,
    pub gross_pnl: f64,
    pub charges: f64,
}

impl SessionRecord {
    /// Returns the natural key of this row.
    pub fn key(&self) -> SessionKey {
        SessionKey {
            client_id: self.client_id.clone(),
            session_date: self.session_date,
            login_time: self.login_time,
        }
    }

    /// Whether the session has no recorded logout yet.
    pub fn is_open(&self) -> bool {
        self.logout_time.is_none()
    }
}

/// Client registry entry, synced once at bot signup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ClientProfile {
    #[validate(length(min = 1, max = 64))]
    pub client_id: String,
    #[validate(length(max = 128))]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[validate(length(max = 64))]
    pub device_id: Option<String>,
}
