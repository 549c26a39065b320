//! Common test setup functions.

use std::sync::Arc;

use api::{router, AppState};
use axum::Router;
use ledger_core::SessionLedger;
use sqlite_ledger::{init_schema, LedgerConfig, SqliteLedger};
use tempfile::TempDir;

use crate::mocks::MockLedger;

/// Test context over the real router and a real SQLite ledger.
///
/// The database lives in a temp directory owned by the context, so every
/// test starts from an empty ledger and cleans up after itself.
pub struct TestContext {
    pub ledger: Arc<SqliteLedger>,
    pub router: Router,
    _tmp: TempDir,
}

impl TestContext {
    /// Create a new test context with an initialized empty ledger.
    pub async fn new() -> Self {
        let tmp = TempDir::new().expect("Failed to create temp dir");

        let config = LedgerConfig {
            path: tmp
                .path()
                .join("ledger.db")
                .to_string_lossy()
                .into_owned(),
            ..Default::default()
        };

        let ledger = Arc::new(
            SqliteLedger::connect(config)
                .await
                .expect("Failed to open test ledger"),
        );
        init_schema(&ledger).await.expect("Failed to init schema");

        let state = AppState::new(ledger.clone() as Arc<dyn SessionLedger>);
        let router = router(state);

        Self {
            ledger,
            router,
            _tmp: tmp,
        }
    }
}

/// Test context over the real router and an in-memory mock ledger.
///
/// Used for failure injection; the mock implements the same `SessionLedger`
/// trait, so the full handler and reconciler paths still run.
pub struct MockContext {
    pub ledger: Arc<MockLedger>,
    pub router: Router,
}

impl MockContext {
    pub fn new() -> Self {
        let ledger = Arc::new(MockLedger::new());
        let state = AppState::new(ledger.clone() as Arc<dyn SessionLedger>);
        let router = router(state);

        Self { ledger, router }
    }

    /// Set the mock ledger to fail (for error testing).
    pub fn set_ledger_failure(&self, should_fail: bool) {
        self.ledger.set_should_fail(should_fail);
    }
}

impl Default for MockContext {
    fn default() -> Self {
        Self::new()
    }
}
