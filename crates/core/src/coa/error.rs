//! Chart-of-accounts error types.

use tally_shared::types::AccountId;
use thiserror::Error;

/// Errors that can occur resolving or using code combinations.
#[derive(Debug, Error)]
pub enum CoaError {
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Account is disabled and cannot take new postings.
    #[error("Account {0} is disabled")]
    AccountDisabled(AccountId),

    /// Segment tuple does not match the ledger's chart structure.
    #[error("Expected {expected} segments, got {actual}")]
    SegmentCountMismatch {
        /// Segments defined by the chart structure.
        expected: usize,
        /// Segments supplied by the caller.
        actual: usize,
    },

    /// Segment values must be non-empty.
    #[error("Segment values cannot be empty")]
    EmptySegmentValue,
}

impl CoaError {
    /// Returns the stable error code used in audit payloads.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountDisabled(_) => "ACCOUNT_DISABLED",
            Self::SegmentCountMismatch { .. } => "SEGMENT_COUNT_MISMATCH",
            Self::EmptySegmentValue => "EMPTY_SEGMENT_VALUE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            CoaError::AccountNotFound(AccountId::new()).error_code(),
            "ACCOUNT_NOT_FOUND"
        );
        assert_eq!(
            CoaError::SegmentCountMismatch {
                expected: 5,
                actual: 3
            }
            .error_code(),
            "SEGMENT_COUNT_MISMATCH"
        );
        assert_eq!(CoaError::EmptySegmentValue.error_code(), "EMPTY_SEGMENT_VALUE");
    }

    #[test]
    fn test_error_display() {
        let err = CoaError::SegmentCountMismatch {
            expected: 5,
            actual: 3,
        };
        assert_eq!(err.to_string(), "Expected 5 segments, got 3");
    }
}
