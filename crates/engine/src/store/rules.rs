//! Cross-validation and intercompany rule configuration.
//!
//! Plain keyed CRUD; the evaluation algorithms live in `tally-core`.

use dashmap::DashMap;
use tally_core::intercompany::IntercompanyRule;
use tally_core::validation::ValidationRule;
use tally_shared::types::{LedgerId, ValidationRuleId};

/// In-process cross-validation rule store.
#[derive(Debug, Default)]
pub struct ValidationRuleStore {
    rules: DashMap<ValidationRuleId, ValidationRule>,
}

impl ValidationRuleStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a rule.
    pub fn upsert(&self, rule: ValidationRule) {
        self.rules.insert(rule.id, rule);
    }

    /// Removes a rule.
    pub fn remove(&self, id: ValidationRuleId) {
        self.rules.remove(&id);
    }

    /// Returns a ledger's rules in ascending priority order.
    #[must_use]
    pub fn rules_for(&self, ledger_id: LedgerId) -> Vec<ValidationRule> {
        let mut rules: Vec<ValidationRule> = self
            .rules
            .iter()
            .filter(|r| r.ledger_id == ledger_id)
            .map(|r| r.clone())
            .collect();
        rules.sort_by_key(|r| r.priority);
        rules
    }
}

/// In-process intercompany rule store, keyed by ordered company pair.
#[derive(Debug, Default)]
pub struct IntercompanyRuleStore {
    by_pair: DashMap<(LedgerId, String, String), IntercompanyRule>,
}

impl IntercompanyRuleStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the rule for its ordered company pair.
    pub fn upsert(&self, rule: IntercompanyRule) {
        let key = (
            rule.ledger_id,
            rule.from_company.clone(),
            rule.to_company.clone(),
        );
        self.by_pair.insert(key, rule);
    }

    /// Removes the rule for an ordered company pair.
    pub fn remove(&self, ledger_id: LedgerId, from_company: &str, to_company: &str) {
        self.by_pair
            .remove(&(ledger_id, from_company.to_string(), to_company.to_string()));
    }

    /// Looks up the rule for an ordered company pair.
    ///
    /// Rules are directional; the reverse direction needs its own row.
    #[must_use]
    pub fn lookup(
        &self,
        ledger_id: LedgerId,
        from_company: &str,
        to_company: &str,
    ) -> Option<IntercompanyRule> {
        self.by_pair
            .get(&(ledger_id, from_company.to_string(), to_company.to_string()))
            .map(|r| r.clone())
    }

    /// Returns all rules of a ledger, ordered by company pair.
    #[must_use]
    pub fn rules_for(&self, ledger_id: LedgerId) -> Vec<IntercompanyRule> {
        let mut rules: Vec<IntercompanyRule> = self
            .by_pair
            .iter()
            .filter(|r| r.ledger_id == ledger_id)
            .map(|r| r.clone())
            .collect();
        rules.sort_by(|a, b| {
            (&a.from_company, &a.to_company).cmp(&(&b.from_company, &b.to_company))
        });
        rules
    }
}
