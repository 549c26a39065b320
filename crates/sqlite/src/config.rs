//! Session ledger configuration.

use serde::{Deserialize, Serialize};

/// SQLite ledger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Path to the database file
    #[serde(default = "default_path")]
    pub path: String,
    /// Connection pool size
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    /// How long a writer waits on a locked database before failing
    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,
}

fn default_path() -> String {
    "data/botledger.db".to_string()
}

fn default_pool_size() -> u32 {
    5
}

fn default_busy_timeout_secs() -> u64 {
    5
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            pool_size: default_pool_size(),
            busy_timeout_secs: default_busy_timeout_secs(),
        }
    }
}
