//! Ingest reconciliation and timeline queries for the session ledger.

pub mod query;
pub mod reconciler;

pub use query::{DayView, TimelineService};
pub use reconciler::IngestReconciler;
