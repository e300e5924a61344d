//! Journals: proposed or committed double-entry transactions.
//!
//! # Modules
//!
//! - `types` - Journal, line, status, and totals types
//! - `service` - Input validation and entered-to-accounted resolution
//! - `error` - Journal-specific error types

pub mod error;
pub mod service;
pub mod types;

pub use error::JournalError;
pub use service::JournalService;
pub use types::{
    AccountRef, Journal, JournalLine, JournalStatus, JournalTotals, LineInput, LineSource,
};
