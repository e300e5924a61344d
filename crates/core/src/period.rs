//! Accounting periods and their lifecycle.
//!
//! Posting is permitted only into Open periods. Period state is re-checked
//! at posting execution time, so a close acts as a barrier even for work
//! queued beforehand.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tally_shared::types::{LedgerId, PeriodId};
use thiserror::Error;

/// Status of an accounting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodStatus {
    /// Period is not yet open for postings.
    Future,
    /// Period is open for postings.
    Open,
    /// Period is closed, no posting allowed.
    Closed,
}

impl PeriodStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Future => "future",
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "future" => Some(Self::Future),
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }

    /// Returns true if the period accepts postings.
    #[must_use]
    pub fn allows_posting(&self) -> bool {
        matches!(self, Self::Open)
    }
}

impl fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that can occur during period lifecycle transitions.
#[derive(Debug, Error)]
pub enum PeriodError {
    /// Attempted an invalid period state transition.
    #[error("Invalid period transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: PeriodStatus,
        /// The attempted target status.
        to: PeriodStatus,
    },
}

impl PeriodError {
    /// Returns the stable error code used in audit payloads.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_PERIOD_TRANSITION",
        }
    }
}

/// A date-bounded accounting window within a ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Period {
    /// Unique identifier.
    pub id: PeriodId,
    /// Ledger this period belongs to.
    pub ledger_id: LedgerId,
    /// Period name (e.g. "2026-01").
    pub name: String,
    /// Start date of the period.
    pub start_date: NaiveDate,
    /// End date of the period.
    pub end_date: NaiveDate,
    /// Current status.
    pub status: PeriodStatus,
}

impl Period {
    /// Creates a new period in the Future state.
    #[must_use]
    pub fn new(
        ledger_id: LedgerId,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id: PeriodId::new(),
            ledger_id,
            name: name.into(),
            start_date,
            end_date,
            status: PeriodStatus::Future,
        }
    }

    /// Returns true if the given date falls within this period.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Opens a Future period for posting.
    ///
    /// # Errors
    ///
    /// Returns `PeriodError::InvalidTransition` unless the period is Future.
    pub fn open(&mut self) -> Result<(), PeriodError> {
        match self.status {
            PeriodStatus::Future => {
                self.status = PeriodStatus::Open;
                Ok(())
            }
            from => Err(PeriodError::InvalidTransition {
                from,
                to: PeriodStatus::Open,
            }),
        }
    }

    /// Closes an Open period.
    ///
    /// # Errors
    ///
    /// Returns `PeriodError::InvalidTransition` unless the period is Open.
    pub fn close(&mut self) -> Result<(), PeriodError> {
        match self.status {
            PeriodStatus::Open => {
                self.status = PeriodStatus::Closed;
                Ok(())
            }
            from => Err(PeriodError::InvalidTransition {
                from,
                to: PeriodStatus::Closed,
            }),
        }
    }

    /// Reopens a Closed period.
    ///
    /// # Errors
    ///
    /// Returns `PeriodError::InvalidTransition` unless the period is Closed.
    pub fn reopen(&mut self) -> Result<(), PeriodError> {
        match self.status {
            PeriodStatus::Closed => {
                self.status = PeriodStatus::Open;
                Ok(())
            }
            from => Err(PeriodError::InvalidTransition {
                from,
                to: PeriodStatus::Open,
            }),
        }
    }
}
