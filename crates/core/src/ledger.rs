//! Session ledger store abstraction.
//!
//! The `SessionLedger` trait is the injected store handle every component
//! works against. Implementations:
//! - `SqliteLedger` (crate `sqlite-ledger`): SQLite-backed, production
//! - `MockLedger` (integration tests): in-memory, failure-injectable

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{ClientProfile, SessionKey, SessionRecord};
use crate::report::SessionReport;
use crate::Result;

/// How a report landed in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    /// First report for this natural key: a new row was inserted.
    Created,
    /// Known key: the existing row was overwritten in place.
    Updated,
}

/// Result of one transactional report upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub disposition: Disposition,
    /// Stale open sessions force-closed by the auto-close guard. Normally 0
    /// or 1; more than 1 means the single-open invariant had already been
    /// violated and this call repaired it.
    pub auto_closed: u64,
}

/// Auto-close instruction attached to a login upsert.
///
/// Before a new open session is admitted, every row for the same
/// client/device that is still open gets `logout_time = closed_at` and, if
/// it never reported a mode, `fallback_mode`. A report without a device
/// identity can match no stale row, so the guard is a no-op then.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoClose {
    pub device_id: Option<String>,
    pub closed_at: DateTime<Utc>,
    pub fallback_mode: String,
}

/// One reconcile decision, ready for the store to apply atomically.
///
/// The reconciler decides *what* happens (guard or not, which key); the
/// store executes the guard and the keyed upsert inside one transaction so
/// a failure rolls both back together.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportUpsert {
    pub report: SessionReport,
    /// `Some` only for login reports.
    pub auto_close: Option<AutoClose>,
}

/// Persistent session ledger.
///
/// Required operations, per the store boundary contract:
/// 1. transactional upsert keyed by the natural key,
/// 2. atomic close-all-open for a client/device pair,
/// 3. day-range read ordered by login time.
#[async_trait]
pub trait SessionLedger: Send + Sync {
    /// Apply one reconcile decision in a single transaction.
    ///
    /// Runs the auto-close guard (when present), then looks up the natural
    /// key and either inserts a new row or overwrites the existing one.
    /// Identity fields (`device_id`, `username`, `device_username`, `mode`)
    /// are coalesced on update: a `None` in the report keeps the stored
    /// value.
    ///
    /// # Errors
    /// `Error::Persistence` — nothing was applied, including the guard.
    async fn apply_upsert(&self, upsert: &ReportUpsert) -> Result<UpsertOutcome>;

    /// Force-close every open session for a client/device pair.
    ///
    /// Returns the number of rows closed. Exposed standalone for repair
    /// and diagnostics; the reconcile path runs the same operation inside
    /// [`apply_upsert`](Self::apply_upsert).
    async fn close_open_sessions(
        &self,
        client_id: &str,
        device_id: &str,
        closed_at: DateTime<Utc>,
    ) -> Result<u64>;

    /// Point lookup by natural key.
    async fn find_session(&self, key: &SessionKey) -> Result<Option<SessionRecord>>;

    /// All rows for one client on one day, ordered by login time ascending.
    async fn sessions_for_day(
        &self,
        client_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<SessionRecord>>;

    /// Insert or refresh a client registry entry.
    async fn upsert_client(&self, profile: &ClientProfile) -> Result<()>;
}
