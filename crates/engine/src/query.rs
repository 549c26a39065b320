//! Day-timeline queries: fetch, reconstruct, summarize.

use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use ledger_core::{
    dates, reconstruct, summarize, DaySummary, ReconstructedEvent, Result, SessionLedger,
};
use telemetry::metrics;

/// Visible timeline of one client-day, ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayView {
    pub client_id: String,
    /// Normalized day, `None` when the input date was unparsable.
    pub date: Option<NaiveDate>,
    pub events: Vec<ReconstructedEvent>,
    pub summary: DaySummary,
}

impl DayView {
    /// View of a day with nothing to show.
    pub fn empty(client_id: impl Into<String>, date: Option<NaiveDate>) -> Self {
        Self {
            client_id: client_id.into(),
            date,
            events: Vec::new(),
            summary: DaySummary::empty(),
        }
    }
}

/// Read-only timeline queries over the session ledger.
pub struct TimelineService {
    ledger: Arc<dyn SessionLedger>,
}

impl TimelineService {
    pub fn new(ledger: Arc<dyn SessionLedger>) -> Self {
        Self { ledger }
    }

    /// Build the visible timeline for one client-day.
    ///
    /// `date_input` may be ISO `YYYY-MM-DD` or display `DD-Mon-YYYY`; an
    /// unparsable date yields an empty view rather than an error, matching
    /// what a dashboard link with a mangled date should show.
    ///
    /// Pure read: every call recomputes the timeline from the ledger rows,
    /// so concurrent calls need no coordination.
    pub async fn day_view(&self, client_id: &str, date_input: &str) -> Result<DayView> {
        let start = Instant::now();
        metrics().timeline_queries.inc();

        let client_id = client_id.trim();
        let Some(date) = dates::parse_day(date_input) else {
            debug!(client_id, date_input, "Unparsable day in timeline query");
            return Ok(DayView::empty(client_id, None));
        };

        let rows = self
            .ledger
            .sessions_for_day(client_id, date)
            .await
            .inspect_err(|_| {
                metrics().ledger_errors.inc();
            })?;

        let events = reconstruct(&rows);
        let summary = summarize(&events);

        metrics()
            .query_latency_ms
            .observe(start.elapsed().as_millis() as u64);

        debug!(
            client_id,
            %date,
            rows = rows.len(),
            visible = events.len(),
            "Timeline reconstructed"
        );

        Ok(DayView {
            client_id: client_id.to_string(),
            date: Some(date),
            events,
            summary,
        })
    }
}
