//! Delta timeline reconstruction over cumulative session counters.
//!
//! Bot processes report running totals since process start; the ledger keeps
//! every report row it ever saw. This module folds one day's rows back into
//! per-session deltas, detecting counter resets (process restarts) and
//! suppressing rows that carry no new activity.
//!
//! Known limitation: a cumulative counter that drops below the high-water
//! mark is indistinguishable from a late report of an older, concurrently
//! running process. Every drop is treated as a restart, so in that rare
//! interleaving the older lifetime's tail is under-reported. There is no
//! way to resolve this from counters alone.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{SessionRecord, MODE_UNKNOWN};

/// One visible slice of trading activity, derived fresh on every query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconstructedEvent {
    pub session_date: NaiveDate,
    pub login_time: DateTime<Utc>,
    /// `None` while the session is still active.
    pub logout_time: Option<DateTime<Utc>>,
    pub mode: Option<String>,
    /// Trades contributed by this slice alone. Never negative.
    pub delta_trades: i64,
    pub delta_net_pnl: f64,
    pub delta_gross_pnl: f64,
    pub delta_charges: f64,
}

impl ReconstructedEvent {
    /// Whether the underlying session is still running.
    pub fn is_active(&self) -> bool {
        self.logout_time.is_none()
    }
}

/// Totals folded over one day's visible events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub sessions: usize,
    pub active_sessions: usize,
    pub total_trades: i64,
    pub net_pnl: f64,
    /// Mode of the chronologically first visible event, `N/A` when none.
    pub mode: String,
}

impl DaySummary {
    /// Summary of a day with no visible activity.
    pub fn empty() -> Self {
        Self {
            sessions: 0,
            active_sessions: 0,
            total_trades: 0,
            net_pnl: 0.0,
            mode: MODE_UNKNOWN.to_string(),
        }
    }
}

/// High-water mark and counter baselines carried across the fold.
/// Zeroed at the start of every reconstruction and again on each reset.
#[derive(Debug, Default)]
struct Baselines {
    high_water_trades: i64,
    net_pnl: f64,
    gross_pnl: f64,
    charges: f64,
}

/// Reconstruct the visible event sequence for one client-day.
///
/// Pure function of the given rows: deterministic, no shared state, safe to
/// recompute on every query. Rows are walked in ascending `login_time`
/// order; output preserves that order.
pub fn reconstruct(rows: &[SessionRecord]) -> Vec<ReconstructedEvent> {
    let mut ordered: Vec<&SessionRecord> = rows.iter().collect();
    ordered.sort_by_key(|r| r.login_time);

    let mut base = Baselines::default();
    let mut events = Vec::with_capacity(ordered.len());

    for row in ordered {
        let is_active = row.is_open();

        // A counter below the high-water mark means the bot process
        // restarted between this row and the previous one, even if no
        // logout was ever recorded. Measure from zero again.
        if row.total_trades < base.high_water_trades {
            base = Baselines::default();
        }

        let delta_trades = row.total_trades - base.high_water_trades;
        let delta_net_pnl = row.net_pnl - base.net_pnl;
        let delta_gross_pnl = row.gross_pnl - base.gross_pnl;
        let delta_charges = row.charges - base.charges;

        // Closed rows that advanced nothing are duplicate or unchanged
        // reports; an active row stays visible so the caller can see the
        // session running.
        if delta_trades <= 0 && !is_active {
            continue;
        }

        events.push(ReconstructedEvent {
            session_date: row.session_date,
            login_time: row.login_time,
            logout_time: row.logout_time,
            mode: row.mode.clone(),
            delta_trades,
            delta_net_pnl,
            delta_gross_pnl,
            delta_charges,
        });

        // Only real progress moves the baselines: an idle active row is
        // shown but later deltas still measure from the last trade.
        if delta_trades > 0 {
            base.high_water_trades = row.total_trades;
            base.net_pnl = row.net_pnl;
            base.gross_pnl = row.gross_pnl;
            base.charges = row.charges;
        }
    }

    events
}

/// Fold a reconstructed event sequence into day totals.
pub fn summarize(events: &[ReconstructedEvent]) -> DaySummary {
    let mode = events
        .first()
        .and_then(|e| e.mode.clone())
        .unwrap_or_else(|| MODE_UNKNOWN.to_string());

    DaySummary {
        sessions: events.len(),
        active_sessions: events.iter().filter(|e| e.is_active()).count(),
        total_trades: events.iter().map(|e| e.delta_trades).sum(),
        net_pnl: events.iter().map(|e| e.delta_net_pnl).sum(),
        mode,
    }
}
