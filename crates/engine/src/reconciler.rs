//! Ingest reconciliation.
//!
//! One telemetry report in, one consistent ledger row out. The reconciler
//! decides login vs. logout semantics and whether the auto-close guard must
//! run; the ledger applies that decision in a single transaction.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, warn};
use validator::Validate;

use ledger_core::{
    AutoClose, ClientProfile, Disposition, Error, ReportUpsert, Result, SessionLedger,
    SessionReport, UpsertOutcome, MODE_AUTO_CLOSED,
};
use telemetry::metrics;

/// Reconciles telemetry reports into the session ledger.
pub struct IngestReconciler {
    ledger: Arc<dyn SessionLedger>,
}

impl IngestReconciler {
    pub fn new(ledger: Arc<dyn SessionLedger>) -> Self {
        Self { ledger }
    }

    /// Reconcile one telemetry report.
    ///
    /// Login reports (no `logout_time`) first force-close any stale open
    /// session for the same client/device pair, keeping at most one open
    /// session per pair. The guard is the only defense against "open
    /// forever" rows left behind by crashed bot processes.
    ///
    /// # Errors
    /// - `Error::MissingField` / `Error::Validation` for bad reports
    /// - `Error::Persistence` when the ledger rejects the transaction;
    ///   nothing is applied, including the guard
    pub async fn reconcile(&self, report: SessionReport) -> Result<UpsertOutcome> {
        let start = Instant::now();
        metrics().reports_received.inc();

        if let Err(e) = report.ensure_valid() {
            metrics().reports_rejected.inc();
            return Err(e);
        }

        let auto_close = report.is_login().then(|| AutoClose {
            device_id: report.device_id.clone(),
            closed_at: Utc::now(),
            fallback_mode: MODE_AUTO_CLOSED.to_string(),
        });

        let upsert = ReportUpsert { report, auto_close };
        let outcome = self.ledger.apply_upsert(&upsert).await.inspect_err(|_| {
            metrics().ledger_errors.inc();
        })?;

        if outcome.auto_closed > 0 {
            metrics().sessions_auto_closed.inc_by(outcome.auto_closed);
            warn!(
                client_id = %upsert.report.client_id,
                device_id = upsert.report.device_id.as_deref().unwrap_or("-"),
                closed = outcome.auto_closed,
                "Auto-closed stale open sessions"
            );
        }

        match outcome.disposition {
            Disposition::Created => metrics().sessions_created.inc(),
            Disposition::Updated => metrics().sessions_updated.inc(),
        }

        metrics()
            .ingest_latency_ms
            .observe(start.elapsed().as_millis() as u64);

        debug!(
            client_id = %upsert.report.client_id,
            login_time = %upsert.report.login_time,
            disposition = ?outcome.disposition,
            "Report reconciled"
        );

        Ok(outcome)
    }

    /// Sync a client registry entry.
    pub async fn sync_client(&self, profile: ClientProfile) -> Result<()> {
        if profile.client_id.trim().is_empty() {
            return Err(Error::missing_field("client_id"));
        }
        profile
            .validate()
            .map_err(|e| Error::validation(e.to_string()))?;

        self.ledger.upsert_client(&profile).await.inspect_err(|_| {
            metrics().ledger_errors.inc();
        })?;

        metrics().clients_synced.inc();
        debug!(client_id = %profile.client_id, "Client profile synced");
        Ok(())
    }
}
