//! Intercompany rule types.

use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, IntercompanyRuleId, LedgerId};

/// A directional mapping used to synthesize balancing entries between two
/// companies.
///
/// Rules are keyed by the ordered pair (`from_company`, `to_company`); the
/// reverse direction requires its own rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntercompanyRule {
    /// Unique identifier.
    pub id: IntercompanyRuleId,
    /// Ledger this rule belongs to.
    pub ledger_id: LedgerId,
    /// The debtor company (owes the amount).
    pub from_company: String,
    /// The creditor company (is owed the amount).
    pub to_company: String,
    /// Account used by `from_company` to record what it owes.
    pub payable_account: AccountId,
    /// Account used by `to_company` to record what it is owed.
    pub receivable_account: AccountId,
}

impl IntercompanyRule {
    /// Creates a rule for the ordered company pair.
    #[must_use]
    pub fn new(
        ledger_id: LedgerId,
        from_company: impl Into<String>,
        to_company: impl Into<String>,
        payable_account: AccountId,
        receivable_account: AccountId,
    ) -> Self {
        Self {
            id: IntercompanyRuleId::new(),
            ledger_id,
            from_company: from_company.into(),
            to_company: to_company.into(),
            payable_account,
            receivable_account,
        }
    }
}
