//! Submit/decide transitions and the postability check.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_shared::types::ActorId;

use super::error::ApprovalError;
use crate::journal::types::JournalStatus;

/// The outcome an approver selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalDecision {
    /// Approve the journal for posting.
    Approve,
    /// Reject the journal back for correction.
    Reject,
}

impl ApprovalDecision {
    /// Returns the journal status this decision leads to.
    #[must_use]
    pub fn target_status(self) -> JournalStatus {
        match self {
            Self::Approve => JournalStatus::Approved,
            Self::Reject => JournalStatus::Rejected,
        }
    }
}

/// An approval state transition with audit data.
#[derive(Debug, Clone)]
pub enum ApprovalAction {
    /// Submit a draft journal for approval.
    Submit {
        /// The new status (PendingApproval).
        new_status: JournalStatus,
        /// The actor who submitted the journal.
        submitted_by: ActorId,
        /// When the journal was submitted.
        submitted_at: DateTime<Utc>,
    },
    /// Decide a pending journal's approval.
    Decide {
        /// The new status (Approved or Rejected).
        new_status: JournalStatus,
        /// The actor who decided.
        decided_by: ActorId,
        /// When the decision was made.
        decided_at: DateTime<Utc>,
        /// The selected outcome.
        decision: ApprovalDecision,
    },
}

impl ApprovalAction {
    /// Returns the new status resulting from this action.
    #[must_use]
    pub fn new_status(&self) -> JournalStatus {
        match self {
            Self::Submit { new_status, .. } | Self::Decide { new_status, .. } => *new_status,
        }
    }
}

/// Stateless approval gate.
pub struct ApprovalGate;

impl ApprovalGate {
    /// Submits a draft journal for approval.
    ///
    /// Valid only from Draft when the journal requires approval.
    ///
    /// # Errors
    ///
    /// Returns `ApprovalError::InvalidTransition` otherwise.
    pub fn submit(
        status: JournalStatus,
        requires_approval: bool,
        actor: ActorId,
    ) -> Result<ApprovalAction, ApprovalError> {
        if requires_approval && status == JournalStatus::Draft {
            Ok(ApprovalAction::Submit {
                new_status: JournalStatus::PendingApproval,
                submitted_by: actor,
                submitted_at: Utc::now(),
            })
        } else {
            Err(ApprovalError::InvalidTransition {
                from: status,
                to: JournalStatus::PendingApproval,
            })
        }
    }

    /// Decides a pending journal's approval.
    ///
    /// Valid only from PendingApproval. The decision fails with
    /// `SegregationOfDuties` whenever the actor is the journal's creator,
    /// regardless of the selected outcome.
    ///
    /// # Errors
    ///
    /// Returns `ApprovalError` if the transition or the actor is invalid.
    pub fn decide(
        status: JournalStatus,
        created_by: ActorId,
        actor: ActorId,
        decision: ApprovalDecision,
    ) -> Result<ApprovalAction, ApprovalError> {
        if status != JournalStatus::PendingApproval {
            return Err(ApprovalError::InvalidTransition {
                from: status,
                to: decision.target_status(),
            });
        }
        if actor == created_by {
            return Err(ApprovalError::SegregationOfDuties { actor });
        }
        Ok(ApprovalAction::Decide {
            new_status: decision.target_status(),
            decided_by: actor,
            decided_at: Utc::now(),
            decision,
        })
    }

    /// Reopens a rejected journal for correction.
    ///
    /// # Errors
    ///
    /// Returns `ApprovalError::InvalidTransition` unless the journal is
    /// Rejected.
    pub fn reopen(status: JournalStatus) -> Result<JournalStatus, ApprovalError> {
        if status == JournalStatus::Rejected {
            Ok(JournalStatus::Draft)
        } else {
            Err(ApprovalError::InvalidTransition {
                from: status,
                to: JournalStatus::Draft,
            })
        }
    }

    /// Checks whether a journal's approval state permits posting.
    ///
    /// # Errors
    ///
    /// Returns `ApprovalError::ApprovalRequired` when the approval flag is
    /// set and the journal is not Approved.
    pub fn check_postable(
        requires_approval: bool,
        status: JournalStatus,
    ) -> Result<(), ApprovalError> {
        if requires_approval && status != JournalStatus::Approved {
            return Err(ApprovalError::ApprovalRequired { status });
        }
        Ok(())
    }
}
