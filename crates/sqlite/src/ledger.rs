//! SQLite implementation of the session ledger.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::FromRow;
use tracing::info;

use ledger_core::{
    AutoClose, ClientProfile, Disposition, Error, ReportUpsert, Result, SessionKey, SessionLedger,
    SessionRecord, StoreErrorCode, UpsertOutcome, MODE_AUTO_CLOSED,
};

use crate::config::LedgerConfig;

/// SQLite-backed session ledger.
#[derive(Clone)]
pub struct SqliteLedger {
    pool: SqlitePool,
    config: LedgerConfig,
}

impl SqliteLedger {
    /// Open (or create) the ledger database.
    pub async fn connect(config: LedgerConfig) -> Result<Self> {
        if let Some(parent) = Path::new(&config.path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| store_err(format!("failed to create ledger dir: {}", e)))?;
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.pool_size)
            .connect_with(
                SqliteConnectOptions::new()
                    .filename(&config.path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .synchronous(SqliteSynchronous::Normal)
                    .busy_timeout(Duration::from_secs(config.busy_timeout_secs)),
            )
            .await
            .map_err(|e| store_err(format!("failed to open ledger: {}", e)))?;

        info!(path = %config.path, "Opened session ledger");

        Ok(Self { pool, config })
    }

    /// Returns the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Run the auto-close guard inside an open transaction.
    async fn run_auto_close(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        client_id: &str,
        guard: &AutoClose,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE bot_sessions
            SET logout_time = ?1,
                mode = COALESCE(mode, ?2)
            WHERE client_id = ?3 AND device_id = ?4 AND logout_time IS NULL
            "#,
        )
        .bind(guard.closed_at)
        .bind(&guard.fallback_mode)
        .bind(client_id)
        .bind(&guard.device_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| store_err(format!("auto-close guard failed: {}", e)))?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl SessionLedger for SqliteLedger {
    async fn apply_upsert(&self, upsert: &ReportUpsert) -> Result<UpsertOutcome> {
        let report = &upsert.report;
        let client_id = report.client_id.trim();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| store_err(format!("failed to begin transaction: {}", e)))?;

        let mut auto_closed = 0;
        if let Some(guard) = &upsert.auto_close {
            auto_closed = Self::run_auto_close(&mut tx, client_id, guard).await?;
        }

        let existing: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT id FROM bot_sessions
            WHERE client_id = ?1 AND session_date = ?2 AND login_time = ?3
            "#,
        )
        .bind(client_id)
        .bind(report.session_date)
        .bind(report.login_time)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| store_err(format!("key lookup failed: {}", e)))?;

        let disposition = match existing {
            Some(id) => {
                // Counters always overwrite; identity fields keep their
                // stored value when the report omits them.
                sqlx::query(
                    r#"
                    UPDATE bot_sessions
                    SET logout_time = ?1,
                        total_trades = ?2,
                        net_pnl = ?3,
                        gross_pnl = ?4,
                        charges = ?5,
                        device_id = COALESCE(?6, device_id),
                        username = COALESCE(?7, username),
                        device_username = COALESCE(?8, device_username),
                        mode = COALESCE(?9, mode)
                    WHERE id = ?10
                    "#,
                )
                .bind(report.logout_time)
                .bind(report.total_trades)
                .bind(report.net_pnl)
                .bind(report.gross_pnl)
                .bind(report.charges)
                .bind(&report.device_id)
                .bind(&report.username)
                .bind(&report.device_username)
                .bind(&report.mode)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| store_err(format!("session update failed: {}", e)))?;

                Disposition::Updated
            }
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO bot_sessions (
                        client_id, device_id, username, device_username,
                        session_date, login_time, logout_time, mode,
                        total_trades, net_pnl, gross_pnl, charges
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                    "#,
                )
                .bind(client_id)
                .bind(&report.device_id)
                .bind(&report.username)
                .bind(&report.device_username)
                .bind(report.session_date)
                .bind(report.login_time)
                .bind(report.logout_time)
                .bind(&report.mode)
                .bind(report.total_trades)
                .bind(report.net_pnl)
                .bind(report.gross_pnl)
                .bind(report.charges)
                .execute(&mut *tx)
                .await
                .map_err(|e| store_err(format!("session insert failed: {}", e)))?;

                Disposition::Created
            }
        };

        tx.commit()
            .await
            .map_err(|e| store_err(format!("commit failed: {}", e)))?;

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
        let guard = AutoClose {
            device_id: Some(device_id.to_string()),
            closed_at,
            fallback_mode: MODE_AUTO_CLOSED.to_string(),
        };

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| store_err(format!("failed to begin transaction: {}", e)))?;
        let closed = Self::run_auto_close(&mut tx, client_id.trim(), &guard).await?;
        tx.commit()
            .await
            .map_err(|e| store_err(format!("commit failed: {}", e)))?;

        Ok(closed)
    }

    async fn find_session(&self, key: &SessionKey) -> Result<Option<SessionRecord>> {
        let row: Option<SessionRow> = sqlx::query_as(
            r#"
            SELECT client_id, device_id, username, device_username,
                   session_date, login_time, logout_time, mode,
                   total_trades, net_pnl, gross_pnl, charges
            FROM bot_sessions
            WHERE client_id = ?1 AND session_date = ?2 AND login_time = ?3
            "#,
        )
        .bind(key.client_id.trim())
        .bind(key.session_date)
        .bind(key.login_time)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_err(format!("session lookup failed: {}", e)))?;

        Ok(row.map(SessionRecord::from))
    }

    async fn sessions_for_day(
        &self,
        client_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<SessionRecord>> {
        let rows: Vec<SessionRow> = sqlx::query_as(
            r#"
            SELECT client_id, device_id, username, device_username,
                   session_date, login_time, logout_time, mode,
                   total_trades, net_pnl, gross_pnl, charges
            FROM bot_sessions
            WHERE client_id = ?1 AND session_date = ?2
            ORDER BY login_time ASC
            "#,
        )
        .bind(client_id.trim())
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_err(format!("day query failed: {}", e)))?;

        Ok(rows.into_iter().map(SessionRecord::from).collect())
    }

    async fn upsert_client(&self, profile: &ClientProfile) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO clients (client_id, username, email, phone, device_id)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(client_id) DO UPDATE SET
                username = COALESCE(excluded.username, username),
                email = COALESCE(excluded.email, email),
                phone = COALESCE(excluded.phone, phone),
                device_id = COALESCE(excluded.device_id, device_id)
            "#,
        )
        .bind(profile.client_id.trim())
        .bind(&profile.username)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(&profile.device_id)
        .execute(&self.pool)
        .await
        .map_err(|e| store_err(format!("client upsert failed: {}", e)))?;

        Ok(())
    }
}

fn store_err(msg: String) -> Error {
    Error::persistence(StoreErrorCode::LedgerFailed, msg)
}

/// Database row shape; kept separate from the domain type so column order
/// changes stay local to this crate.
#[derive(Debug, FromRow)]
struct SessionRow {
    client_id: String,
    device_id: Option<String>,
    username: Option<String>,
    device_username: Option<String>,
    session_date: NaiveDate,
    login_time: DateTime<Utc>,
    logout_time: Option<DateTime<Utc>>,
    mode: Option<String>,
    total_trades: i64,
    net_pnl: f64,
    gross_pnl: f64,
    charges: f64,
}

impl From<SessionRow> for SessionRecord {
    fn from(row: SessionRow) -> Self {
        SessionRecord {
            client_id: row.client_id,
            device_id: row.device_id,
            username: row.username,
            device_username: row.device_username,
            session_date: row.session_date,
            login_time: row.login_time,
            logout_time: row.logout_time,
            mode: row.mode,
            total_trades: row.total_trades,
            net_pnl: row.net_pnl,
            gross_pnl: row.gross_pnl,
            charges: row.charges,
        }
    }
}
