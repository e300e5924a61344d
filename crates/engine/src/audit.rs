//! Append-only audit trail.
//!
//! Every posting attempt, approval decision, and period transition writes an
//! entry here. A journal that fails to post stays Draft; the reason lives on
//! this trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::RwLock;
use tally_shared::types::{ActorId, AuditEntryId};
use uuid::Uuid;

/// Audit action names.
pub mod action {
    /// A journal was committed to the ledger.
    pub const JOURNAL_POSTED: &str = "JOURNAL_POSTED";
    /// A posting attempt was aborted; detail carries the error code and message.
    pub const JOURNAL_POST_FAILED: &str = "JOURNAL_POST_FAILED";
    /// A journal was submitted for approval.
    pub const JOURNAL_SUBMITTED: &str = "JOURNAL_SUBMITTED";
    /// A pending journal was approved.
    pub const JOURNAL_APPROVED: &str = "JOURNAL_APPROVED";
    /// A pending journal was rejected.
    pub const JOURNAL_REJECTED: &str = "JOURNAL_REJECTED";
    /// A rejected journal was reopened for correction.
    pub const JOURNAL_REOPENED: &str = "JOURNAL_REOPENED";
    /// A period was opened for posting.
    pub const PERIOD_OPENED: &str = "PERIOD_OPENED";
    /// A period was closed.
    pub const PERIOD_CLOSED: &str = "PERIOD_CLOSED";
    /// A closed period was reopened.
    pub const PERIOD_REOPENED: &str = "PERIOD_REOPENED";
}

/// Kind of entity an audit entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A journal.
    Journal,
    /// An accounting period.
    Period,
}

impl EntityKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Journal => "journal",
            Self::Period => "period",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One immutable audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique identifier.
    pub id: AuditEntryId,
    /// Kind of the referenced entity.
    pub entity_kind: EntityKind,
    /// Id of the referenced entity.
    pub entity_id: Uuid,
    /// Action name (see [`action`]).
    pub action: String,
    /// Actor who triggered the action, when known.
    pub actor: Option<ActorId>,
    /// When the entry was recorded.
    pub at: DateTime<Utc>,
    /// Structured detail payload.
    pub detail: serde_json::Value,
}

/// Append-only, in-memory audit log.
#[derive(Debug, Default)]
pub struct AuditLog {
    entries: RwLock<Vec<AuditEntry>>,
}

impl AuditLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn record(
        &self,
        entity_kind: EntityKind,
        entity_id: Uuid,
        action: &str,
        actor: Option<ActorId>,
        detail: serde_json::Value,
    ) {
        let entry = AuditEntry {
            id: AuditEntryId::new(),
            entity_kind,
            entity_id,
            action: action.to_string(),
            actor,
            at: Utc::now(),
            detail,
        };
        self.entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(entry);
    }

    /// Returns all entries for one entity, oldest first.
    #[must_use]
    pub fn entries_for(&self, entity_id: Uuid) -> Vec<AuditEntry> {
        self.entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .filter(|e| e.entity_id == entity_id)
            .cloned()
            .collect()
    }

    /// Returns the number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
