//! Segment tuples, account classifications, and code combinations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tally_shared::types::{AccountId, LedgerId};

use super::error::CoaError;

/// Delimiter used to compose the canonical account key from segment values.
pub const SEGMENT_DELIMITER: char = '.';

/// An ordered tuple of chart-of-accounts segment values.
///
/// The canonical key (values joined with [`SEGMENT_DELIMITER`]) uniquely
/// identifies an account within a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentTuple(Vec<String>);

impl SegmentTuple {
    /// Creates a segment tuple from ordered values.
    ///
    /// # Errors
    ///
    /// Returns `CoaError::EmptySegmentValue` if the tuple is empty or any
    /// value is blank.
    pub fn new(values: Vec<String>) -> Result<Self, CoaError> {
        if values.is_empty() || values.iter().any(|v| v.trim().is_empty()) {
            return Err(CoaError::EmptySegmentValue);
        }
        Ok(Self(values))
    }

    /// Returns the canonical string key for this tuple.
    #[must_use]
    pub fn canonical_key(&self) -> String {
        self.0.join(&SEGMENT_DELIMITER.to_string())
    }

    /// Returns the segment value at `index`, if present.
    #[must_use]
    pub fn segment(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    /// Returns the number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the tuple has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the ordered segment values.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for SegmentTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_key())
    }
}

/// Account classification derived from the natural-account segment.
///
/// Classification only affects balance-sign conventions, never posting
/// correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountClass {
    /// Asset accounts (debit-normal).
    Asset,
    /// Liability accounts (credit-normal).
    Liability,
    /// Equity accounts (credit-normal).
    Equity,
    /// Revenue accounts (credit-normal).
    Revenue,
    /// Expense accounts (debit-normal).
    Expense,
}

impl AccountClass {
    /// Returns the string representation of the classification.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }

    /// Parses a classification from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asset" => Some(Self::Asset),
            "liability" => Some(Self::Liability),
            "equity" => Some(Self::Equity),
            "revenue" => Some(Self::Revenue),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }

    /// Returns the normal balance side for this classification.
    #[must_use]
    pub fn normal_balance(&self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalBalance::Credit,
        }
    }
}

impl fmt::Display for AccountClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The side on which an account's balance normally grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalBalance {
    /// Debit-normal accounts (Asset, Expense): balance += debit - credit.
    Debit,
    /// Credit-normal accounts (Liability, Equity, Revenue): balance += credit - debit.
    Credit,
}

impl NormalBalance {
    /// Calculates the signed balance change for a debit/credit pair.
    #[must_use]
    pub fn signed_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }
}

/// A resolved code combination within a ledger.
///
/// Immutable once created except for the enabled flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeCombination {
    /// Unique identifier.
    pub id: AccountId,
    /// Ledger this account belongs to.
    pub ledger_id: LedgerId,
    /// The ordered segment values.
    pub segments: SegmentTuple,
    /// Derived classification.
    pub class: AccountClass,
    /// Whether the account accepts new postings.
    pub enabled: bool,
}

impl CodeCombination {
    /// Creates a new enabled code combination.
    #[must_use]
    pub fn new(ledger_id: LedgerId, segments: SegmentTuple, class: AccountClass) -> Self {
        Self {
            id: AccountId::new(),
            ledger_id,
            segments,
            class,
            enabled: true,
        }
    }
}
