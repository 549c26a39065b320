//! SQLite-backed session ledger store.

pub mod config;
pub mod health;
pub mod ledger;
pub mod schema;

pub use config::LedgerConfig;
pub use health::check_connection;
pub use ledger::SqliteLedger;
pub use schema::init_schema;
