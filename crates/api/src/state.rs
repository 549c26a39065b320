//! Application state shared across handlers.

use std::sync::Arc;

use ledger_core::SessionLedger;
use reconciler::{IngestReconciler, TimelineService};

/// Shared application state.
///
/// Built over an injected ledger handle so tests can swap the SQLite store
/// for an in-memory one without touching the router.
#[derive(Clone)]
pub struct AppState {
    /// Ingest reconciliation
    pub reconciler: Arc<IngestReconciler>,
    /// Read-only timeline queries
    pub timeline: Arc<TimelineService>,
}

impl AppState {
    pub fn new(ledger: Arc<dyn SessionLedger>) -> Self {
        Self {
            reconciler: Arc::new(IngestReconciler::new(ledger.clone())),
            timeline: Arc::new(TimelineService::new(ledger)),
        }
    }
}
