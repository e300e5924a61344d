//! Journal error types.

use thiserror::Error;

use crate::coa::CoaError;
use crate::journal::types::JournalStatus;

/// Errors that can occur creating or modifying journals.
#[derive(Debug, Error)]
pub enum JournalError {
    /// Journal must have at least 2 lines.
    #[error("Journal must have at least 2 lines")]
    InsufficientLines,

    /// Line amounts cannot be negative.
    #[error("Line amounts cannot be negative")]
    NegativeAmount,

    /// A line must carry a non-zero debit or credit.
    #[error("Line must carry a non-zero debit or credit")]
    ZeroAmount,

    /// A line must carry exactly one of debit or credit.
    #[error("Line must carry exactly one of debit or credit")]
    BothSidesSet,

    /// A conversion rate is required for non-functional-currency lines.
    #[error("No conversion rate supplied for currency {currency}")]
    MissingRate {
        /// The line currency lacking a rate.
        currency: String,
    },

    /// Conversion rates must be positive.
    #[error("Conversion rate must be positive")]
    InvalidRate,

    /// The journal is not in an editable state.
    #[error("Journal in status {status} cannot be modified")]
    NotEditable {
        /// The journal's current status.
        status: JournalStatus,
    },

    /// Account resolution failed.
    #[error(transparent)]
    Account(#[from] CoaError),
}

impl JournalError {
    /// Returns the stable error code used in audit payloads.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLines => "INSUFFICIENT_LINES",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::BothSidesSet => "BOTH_SIDES_SET",
            Self::MissingRate { .. } => "MISSING_RATE",
            Self::InvalidRate => "INVALID_RATE",
            Self::NotEditable { .. } => "JOURNAL_NOT_EDITABLE",
            Self::Account(e) => e.error_code(),
        }
    }
}
