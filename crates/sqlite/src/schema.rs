//! Session ledger schema.

use ledger_core::{Error, Result, StoreErrorCode};
use tracing::debug;

use crate::ledger::SqliteLedger;

/// Session rows, one per login-to-logout (or still open) instance.
///
/// The unique index on (client_id, session_date, login_time) is the natural
/// key the reconcile upsert resolves against; the partial index serves the
/// auto-close guard's open-row scan.
const BOT_SESSIONS: &str = r#"
    CREATE TABLE IF NOT EXISTS bot_sessions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        client_id TEXT NOT NULL,
        device_id TEXT,
        username TEXT,
        device_username TEXT,
        session_date TEXT NOT NULL,
        login_time TEXT NOT NULL,
        logout_time TEXT,
        mode TEXT,
        total_trades INTEGER NOT NULL DEFAULT 0 CHECK (total_trades >= 0),
        net_pnl REAL NOT NULL DEFAULT 0,
        gross_pnl REAL NOT NULL DEFAULT 0,
        charges REAL NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
"#;

const BOT_SESSIONS_KEY_IDX: &str = r#"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_bot_sessions_natural_key
    ON bot_sessions(client_id, session_date, login_time)
"#;

const BOT_SESSIONS_OPEN_IDX: &str = r#"
    CREATE INDEX IF NOT EXISTS idx_bot_sessions_open
    ON bot_sessions(client_id, device_id)
    WHERE logout_time IS NULL
"#;

/// Client registry, synced at bot signup.
const CLIENTS: &str = r#"
    CREATE TABLE IF NOT EXISTS clients (
        client_id TEXT PRIMARY KEY,
        username TEXT,
        email TEXT,
        phone TEXT,
        device_id TEXT,
        created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
"#;

/// All DDL statements in creation order.
pub fn all_tables() -> Vec<&'static str> {
    vec![BOT_SESSIONS, BOT_SESSIONS_KEY_IDX, BOT_SESSIONS_OPEN_IDX, CLIENTS]
}

/// Initialize the ledger schema.
pub async fn init_schema(ledger: &SqliteLedger) -> Result<()> {
    for ddl in all_tables() {
        sqlx::query(ddl)
            .execute(ledger.pool())
            .await
            .map_err(|e| {
                Error::persistence(StoreErrorCode::LedgerFailed, format!("DDL failed: {}", e))
            })?;
    }

    debug!("Session ledger schema initialized");
    Ok(())
}
