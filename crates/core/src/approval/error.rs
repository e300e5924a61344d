//! Approval error types.

use tally_shared::types::ActorId;
use thiserror::Error;

use crate::journal::types::JournalStatus;

/// Errors that can occur in the approval gate.
#[derive(Debug, Error)]
pub enum ApprovalError {
    /// Attempted an invalid journal status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: JournalStatus,
        /// The attempted target status.
        to: JournalStatus,
    },

    /// The approver must differ from the journal's creator.
    #[error("Actor {actor} created this journal and cannot decide its approval")]
    SegregationOfDuties {
        /// The actor who attempted the decision.
        actor: ActorId,
    },

    /// The journal requires approval before posting.
    #[error("Journal requires approval and is {status}")]
    ApprovalRequired {
        /// The journal's current status.
        status: JournalStatus,
    },
}

impl ApprovalError {
    /// Returns the stable error code used in audit payloads.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::SegregationOfDuties { .. } => "SEGREGATION_OF_DUTIES",
            Self::ApprovalRequired { .. } => "APPROVAL_REQUIRED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ApprovalError::InvalidTransition {
                from: JournalStatus::Posted,
                to: JournalStatus::PendingApproval,
            }
            .error_code(),
            "INVALID_TRANSITION"
        );
        assert_eq!(
            ApprovalError::SegregationOfDuties {
                actor: ActorId::new()
            }
            .error_code(),
            "SEGREGATION_OF_DUTIES"
        );
        assert_eq!(
            ApprovalError::ApprovalRequired {
                status: JournalStatus::Draft
            }
            .error_code(),
            "APPROVAL_REQUIRED"
        );
    }

    #[test]
    fn test_error_display() {
        let err = ApprovalError::ApprovalRequired {
            status: JournalStatus::PendingApproval,
        };
        assert_eq!(
            err.to_string(),
            "Journal requires approval and is pending_approval"
        );
    }
}
