//! Core types, validation, and timeline reconstruction for the session ledger.

pub mod dates;
pub mod error;
pub mod ledger;
pub mod record;
pub mod report;
pub mod timeline;

pub use error::{Error, Result, StoreErrorCode};
pub use ledger::*;
pub use record::*;
pub use report::*;
pub use timeline::*;
