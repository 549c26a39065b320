//! Session ledger health checks.

use tracing::{debug, error};

use crate::ledger::SqliteLedger;

/// Check ledger connection health.
pub async fn check_connection(ledger: &SqliteLedger) -> bool {
    match sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(ledger.pool())
        .await
    {
        Ok(_) => {
            debug!("Session ledger connection healthy");
            true
        }
        Err(e) => {
            error!("Session ledger health check failed: {}", e);
            false
        }
    }
}
