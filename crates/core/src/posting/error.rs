//! Posting error taxonomy.
//!
//! Every pipeline error is recovered at the orchestrator boundary: it
//! converts the journal's intended transition into a no-op and produces an
//! audit entry carrying the error's code and message.

use rust_decimal::Decimal;
use tally_shared::types::{AccountId, ValidationRuleId};
use thiserror::Error;

use crate::intercompany::IntercompanyError;
use crate::journal::types::JournalStatus;

/// Errors that can abort a posting.
#[derive(Debug, Error)]
pub enum PostingError {
    /// The target period is not open.
    #[error("Period is closed, no posting allowed")]
    PeriodClosed,

    /// The journal requires approval and is not approved.
    #[error("Journal requires approval and is {status}")]
    ApprovalRequired {
        /// The journal's current status.
        status: JournalStatus,
    },

    /// A cross-validation rule rejected one of the journal's accounts.
    #[error("{message}")]
    CrossValidation {
        /// The violated rule.
        rule_id: ValidationRuleId,
        /// The rule's configured error message.
        message: String,
    },

    /// The journal's debits and credits do not balance.
    #[error("Journal is not balanced. Debit: {debit}, Credit: {credit}")]
    Unbalanced {
        /// Total accounted debit.
        debit: Decimal,
        /// Total accounted credit.
        credit: Decimal,
    },

    /// Intercompany balancing failed.
    #[error(transparent)]
    Intercompany(#[from] IntercompanyError),

    /// A line references an account that cannot be resolved.
    ///
    /// Should not occur given get-or-create semantics, but checked
    /// defensively.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// The journal's status does not permit posting.
    #[error("Journal in status {status} cannot be posted")]
    NotPostable {
        /// The journal's current status.
        status: JournalStatus,
    },
}

impl PostingError {
    /// Returns the stable error code used in audit payloads.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::PeriodClosed => "PERIOD_CLOSED",
            Self::ApprovalRequired { .. } => "APPROVAL_REQUIRED",
            Self::CrossValidation { .. } => "CROSS_VALIDATION_VIOLATION",
            Self::Unbalanced { .. } => "UNBALANCED_JOURNAL",
            Self::Intercompany(e) => e.error_code(),
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::NotPostable { .. } => "JOURNAL_NOT_POSTABLE",
        }
    }
}
