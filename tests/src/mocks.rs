//! Mock implementations for testing.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;

use ledger_core::{
    ClientProfile, Disposition, Error, ReportUpsert, Result, SessionKey, SessionLedger,
    SessionRecord, SessionReport, StoreErrorCode, UpsertOutcome,
};

/// In-memory session ledger with the same reconcile semantics as the SQLite
/// store.
///
/// Implements the `SessionLedger` trait the real `SqliteLedger` implements,
/// so tests can drive all production code paths without a database file,
/// and can inject store failures.
#[derive(Default)]
pub struct MockLedger {
    sessions: Mutex<Vec<SessionRecord>>,
    clients: Mutex<HashMap<String, ClientProfile>>,
    should_fail: Mutex<bool>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set failure mode for testing error handling.
    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.lock() = fail;
    }

    /// All rows currently in the ledger.
    pub fn rows(&self) -> Vec<SessionRecord> {
        self.sessions.lock().clone()
    }

    /// Rows with no recorded logout.
    pub fn open_rows(&self) -> Vec<SessionRecord> {
        self.sessions
            .lock()
            .iter()
            .filter(|r| r.is_open())
            .cloned()
            .collect()
    }

    fn fail_if_requested(&self) -> Result<()> {
        if *self.should_fail.lock() {
            return Err(Error::persistence(
                StoreErrorCode::LedgerFailed,
                "mock ledger failure",
            ));
        }
        Ok(())
    }
}

fn record_from(report: &SessionReport) -> SessionRecord {
    SessionRecord {
        client_id: report.client_id.trim().to_string(),
        device_id: report.device_id.clone(),
        username: report.username.clone(),
        device_username: report.device_username.clone(),
        session_date: report.session_date,
        login_time: report.login_time,
        logout_time: report.logout_time,
        mode: report.mode.clone(),
        total_trades: report.total_trades,
        net_pnl: report.net_pnl,
        gross_pnl: report.gross_pnl,
        charges: report.charges,
    }
}

#[async_trait]
impl SessionLedger for MockLedger {
    async fn apply_upsert(&self, upsert: &ReportUpsert) -> Result<UpsertOutcome> {
        self.fail_if_requested()?;

        let report = &upsert.report;
        let client_id = report.client_id.trim();
        let mut sessions = self.sessions.lock();

        let mut auto_closed = 0;
        if let Some(guard) = &upsert.auto_close {
            for row in sessions.iter_mut() {
                let device_matches = match (&guard.device_id, &row.device_id) {
                    (Some(g), Some(d)) => g == d,
                    _ => false,
                };
                if row.client_id == client_id && device_matches && row.is_open() {
                    row.logout_time = Some(guard.closed_at);
                    row.mode.get_or_insert_with(|| guard.fallback_mode.clone());
                    auto_closed += 1;
                }
            }
        }

        let disposition = match sessions.iter_mut().find(|r| {
            r.client_id == client_id
                && r.session_date == report.session_date
                && r.login_time == report.login_time
        }) {
            Some(row) => {
                row.logout_time = report.logout_time;
                row.total_trades = report.total_trades;
                row.net_pnl = report.net_pnl;
                row.gross_pnl = report.gross_pnl;
                row.charges = report.charges;
                // coalesce-on-write, like the SQL path
                if report.device_id.is_some() {
                    row.device_id = report.device_id.clone();
                }
                if report.username.is_some() {
                    row.username = report.username.clone();
                }
                if report.device_username.is_some() {
                    row.device_username = report.device_username.clone();
                }
                if report.mode.is_some() {
                    row.mode = report.mode.clone();
                }
                Disposition::Updated
            }
            None => {
                sessions.push(record_from(report));
                Disposition::Created
            }
        };

        Ok(UpsertOutcome {
            disposition,
            auto_closed,
        })
    }

    async fn close_open_sessions(
        &self,
        client_id: &str,
        device_id: &str,
        closed_at: DateTime<Utc>,
    ) -> Result<u64> {
        self.fail_if_requested()?;

        let mut closed = 0;
        for row in self.sessions.lock().iter_mut() {
            if row.client_id == client_id.trim()
                && row.device_id.as_deref() == Some(device_id)
                && row.is_open()
            {
                row.logout_time = Some(closed_at);
                row.mode
                    .get_or_insert_with(|| ledger_core::MODE_AUTO_CLOSED.to_string());
                closed += 1;
            }
        }
        Ok(closed)
    }

    async fn find_session(&self, key: &SessionKey) -> Result<Option<SessionRecord>> {
        self.fail_if_requested()?;

        Ok(self
            .sessions
            .lock()
            .iter()
            .find(|r| {
                r.client_id == key.client_id.trim()
                    && r.session_date == key.session_date
                    && r.login_time == key.login_time
            })
            .cloned())
    }

    async fn sessions_for_day(
        &self,
        client_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<SessionRecord>> {
        self.fail_if_requested()?;

        let mut rows: Vec<SessionRecord> = self
            .sessions
            .lock()
            .iter()
            .filter(|r| r.client_id == client_id.trim() && r.session_date == date)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.login_time);
        Ok(rows)
    }

    async fn upsert_client(&self, profile: &ClientProfile) -> Result<()> {
        self.fail_if_requested()?;

        self.clients
            .lock()
            .insert(profile.client_id.trim().to_string(), profile.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ledger_core::{AutoClose, MODE_AUTO_CLOSED};

    fn report(login_hour: u32, logout: Option<DateTime<Utc>>) -> SessionReport {
        SessionReport {
            client_id: "C1".into(),
            session_date: NaiveDate::from_ymd_opt(2025, 8, 4).unwrap(),
            login_time: Utc.with_ymd_and_hms(2025, 8, 4, login_hour, 0, 0).unwrap(),
            logout_time: logout,
            device_id: Some("D1".into()),
            username: None,
            device_username: None,
            mode: None,
            total_trades: 0,
            net_pnl: 0.0,
            gross_pnl: 0.0,
            charges: 0.0,
        }
    }

    #[tokio::test]
    async fn mock_ledger_enforces_single_open_session() {
        let ledger = MockLedger::new();

        for hour in [9, 10, 11] {
            let report = report(hour, None);
            let auto_close = Some(AutoClose {
                device_id: report.device_id.clone(),
                closed_at: Utc.with_ymd_and_hms(2025, 8, 4, hour, 0, 0).unwrap(),
                fallback_mode: MODE_AUTO_CLOSED.to_string(),
            });
            ledger
                .apply_upsert(&ReportUpsert { report, auto_close })
                .await
                .unwrap();
        }

        assert_eq!(ledger.rows().len(), 3);
        assert_eq!(ledger.open_rows().len(), 1);
    }

    #[tokio::test]
    async fn mock_ledger_failure_mode() {
        let ledger = MockLedger::new();
        ledger.set_should_fail(true);

        let result = ledger
            .apply_upsert(&ReportUpsert {
                report: report(9, None),
                auto_close: None,
            })
            .await;
        assert!(result.is_err());
    }
}
