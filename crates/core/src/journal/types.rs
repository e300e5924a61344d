//! Journal domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tally_shared::types::{AccountId, ActorId, JournalId, LedgerId, LineId, PeriodId};

/// Journal lifecycle status.
///
/// Valid transitions:
/// - Draft -> PendingApproval (submit, when approval is required)
/// - PendingApproval -> Approved (approve)
/// - PendingApproval -> Rejected (reject)
/// - Rejected -> Draft (reopen for correction)
/// - Draft/Approved -> Posted (post)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalStatus {
    /// Journal is being drafted and can be modified.
    Draft,
    /// Journal has been submitted and awaits an approval decision.
    PendingApproval,
    /// Journal has been approved and is ready for posting.
    Approved,
    /// Journal was rejected; it must be reopened for correction.
    Rejected,
    /// Journal has been posted to the ledger (immutable).
    Posted,
}

impl JournalStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingApproval => "pending_approval",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Posted => "posted",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "pending_approval" => Some(Self::PendingApproval),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "posted" => Some(Self::Posted),
            _ => None,
        }
    }

    /// Returns true if the journal can be modified.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns true if the journal has reached a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Posted)
    }
}

impl fmt::Display for JournalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Origin of a journal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineSource {
    /// Line supplied by the calling subsystem.
    Caller,
    /// Due-to/due-from line synthesized by the intercompany balancer.
    Intercompany,
}

/// Reference to an account: either a resolved id or a raw segment tuple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AccountRef {
    /// An already-resolved account id.
    Id(AccountId),
    /// Raw segment values, resolved (and created if absent) at journal
    /// creation time.
    Segments(Vec<String>),
}

/// Input for a single journal line.
#[derive(Debug, Clone)]
pub struct LineInput {
    /// The account to post to.
    pub account: AccountRef,
    /// Currency of the entered amounts (ISO 4217).
    pub currency: String,
    /// Entered debit amount (zero if this is a credit line).
    pub entered_dr: Decimal,
    /// Entered credit amount (zero if this is a debit line).
    pub entered_cr: Decimal,
    /// Conversion rate to the functional currency. Required when the line
    /// currency differs from the functional currency.
    pub rate: Option<Decimal>,
    /// Optional free-text description.
    pub description: Option<String>,
}

/// A resolved journal line.
///
/// Lines are immutable once the journal is posted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalLine {
    /// Unique identifier.
    pub id: LineId,
    /// The account this line posts to.
    pub account_id: AccountId,
    /// Value of the account's company segment.
    pub company: String,
    /// Currency of the entered amounts.
    pub currency: String,
    /// Entered debit amount.
    pub entered_dr: Decimal,
    /// Entered credit amount.
    pub entered_cr: Decimal,
    /// Rate applied to reach the accounted amounts.
    pub rate: Decimal,
    /// Accounted debit amount in functional currency.
    pub accounted_dr: Decimal,
    /// Accounted credit amount in functional currency.
    pub accounted_cr: Decimal,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Origin of the line.
    pub source: LineSource,
}

/// A proposed or committed double-entry transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Journal {
    /// Unique identifier.
    pub id: JournalId,
    /// Ledger this journal belongs to.
    pub ledger_id: LedgerId,
    /// Period this journal posts into.
    pub period_id: PeriodId,
    /// Sequential journal number, unique per ledger (e.g. "JE-000001").
    pub number: String,
    /// Description of the journal.
    pub description: String,
    /// Header currency code.
    pub currency: String,
    /// Lifecycle status.
    pub status: JournalStatus,
    /// Whether posting requires an approval decision.
    pub requires_approval: bool,
    /// The actor who created the journal.
    pub created_by: ActorId,
    /// The actor who submitted the journal for approval.
    pub submitted_by: Option<ActorId>,
    /// When the journal was submitted for approval.
    pub submitted_at: Option<DateTime<Utc>>,
    /// The actor who decided the approval.
    pub decided_by: Option<ActorId>,
    /// When the approval was decided.
    pub decided_at: Option<DateTime<Utc>>,
    /// When the journal was posted.
    pub posted_at: Option<DateTime<Utc>>,
    /// Ordered journal lines.
    pub lines: Vec<JournalLine>,
}

impl Journal {
    /// Returns the accounted totals over the journal's lines.
    #[must_use]
    pub fn totals(&self) -> JournalTotals {
        JournalTotals::from_lines(&self.lines)
    }
}

/// Accounted debit/credit totals for a set of lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalTotals {
    /// Total accounted debit amount.
    pub accounted_debit: Decimal,
    /// Total accounted credit amount.
    pub accounted_credit: Decimal,
}

impl JournalTotals {
    /// Creates totals from debit and credit sums.
    #[must_use]
    pub fn new(accounted_debit: Decimal, accounted_credit: Decimal) -> Self {
        Self {
            accounted_debit,
            accounted_credit,
        }
    }

    /// Sums the accounted amounts of the given lines.
    #[must_use]
    pub fn from_lines(lines: &[JournalLine]) -> Self {
        let accounted_debit = lines.iter().map(|l| l.accounted_dr).sum();
        let accounted_credit = lines.iter().map(|l| l.accounted_cr).sum();
        Self::new(accounted_debit, accounted_credit)
    }

    /// Returns the difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.accounted_debit - self.accounted_credit
    }

    /// Returns true if debits equal credits within `epsilon`.
    #[must_use]
    pub fn is_balanced_within(&self, epsilon: Decimal) -> bool {
        self.difference().abs() <= epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(dr: Decimal, cr: Decimal) -> JournalLine {
        JournalLine {
            id: LineId::new(),
            account_id: AccountId::new(),
            company: "101".into(),
            currency: "USD".into(),
            entered_dr: dr,
            entered_cr: cr,
            rate: Decimal::ONE,
            accounted_dr: dr,
            accounted_cr: cr,
            description: None,
            source: LineSource::Caller,
        }
    }

    #[test]
    fn test_status_editable_and_terminal() {
        assert!(JournalStatus::Draft.is_editable());
        assert!(!JournalStatus::PendingApproval.is_editable());
        assert!(!JournalStatus::Posted.is_editable());
        assert!(JournalStatus::Posted.is_terminal());
        assert!(!JournalStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_status_parse_roundtrip() {
        for status in [
            JournalStatus::Draft,
            JournalStatus::PendingApproval,
            JournalStatus::Approved,
            JournalStatus::Rejected,
            JournalStatus::Posted,
        ] {
            assert_eq!(JournalStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(JournalStatus::parse("voided"), None);
    }

    #[test]
    fn test_totals_balanced() {
        let lines = vec![line(dec!(100), dec!(0)), line(dec!(0), dec!(100))];
        let totals = JournalTotals::from_lines(&lines);
        assert_eq!(totals.accounted_debit, dec!(100));
        assert_eq!(totals.accounted_credit, dec!(100));
        assert!(totals.is_balanced_within(dec!(0.005)));
        assert_eq!(totals.difference(), Decimal::ZERO);
    }

    #[test]
    fn test_totals_within_epsilon() {
        let lines = vec![line(dec!(100.004), dec!(0)), line(dec!(0), dec!(100))];
        let totals = JournalTotals::from_lines(&lines);
        assert!(totals.is_balanced_within(dec!(0.005)));
        assert!(!totals.is_balanced_within(dec!(0.001)));
    }

    #[test]
    fn test_totals_unbalanced() {
        let lines = vec![line(dec!(100), dec!(0)), line(dec!(0), dec!(50))];
        let totals = JournalTotals::from_lines(&lines);
        assert!(!totals.is_balanced_within(dec!(0.005)));
        assert_eq!(totals.difference(), dec!(50));
    }
}
