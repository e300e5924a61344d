//! Engine error types.
//!
//! Synchronous facade operations surface these directly. Posting-pipeline
//! failures never reach the caller this way; they are recovered by the
//! posting worker and recorded on the audit trail.

use tally_shared::types::{JournalId, LedgerId, PeriodId};
use thiserror::Error;

use tally_core::approval::ApprovalError;
use tally_core::coa::CoaError;
use tally_core::journal::JournalError;
use tally_core::period::PeriodError;

/// Errors surfaced by the engine facade.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Ledger not found.
    #[error("Ledger not found: {0}")]
    LedgerNotFound(LedgerId),

    /// Period not found.
    #[error("Period not found: {0}")]
    PeriodNotFound(PeriodId),

    /// Journal not found.
    #[error("Journal not found: {0}")]
    JournalNotFound(JournalId),

    /// Journal validation or resolution failed.
    #[error(transparent)]
    Journal(#[from] JournalError),

    /// Approval gate rejected the operation.
    #[error(transparent)]
    Approval(#[from] ApprovalError),

    /// Period lifecycle transition failed.
    #[error(transparent)]
    Period(#[from] PeriodError),

    /// Account resolution failed.
    #[error(transparent)]
    Account(#[from] CoaError),

    /// The posting queue is at capacity.
    #[error("Posting queue is full")]
    QueueFull,

    /// The engine has been shut down.
    #[error("Posting queue is closed")]
    QueueClosed,
}

impl EngineError {
    /// Returns the stable error code used in audit payloads and logs.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::LedgerNotFound(_) => "LEDGER_NOT_FOUND",
            Self::PeriodNotFound(_) => "PERIOD_NOT_FOUND",
            Self::JournalNotFound(_) => "JOURNAL_NOT_FOUND",
            Self::Journal(e) => e.error_code(),
            Self::Approval(e) => e.error_code(),
            Self::Period(e) => e.error_code(),
            Self::Account(e) => e.error_code(),
            Self::QueueFull => "QUEUE_FULL",
            Self::QueueClosed => "QUEUE_CLOSED",
        }
    }
}
