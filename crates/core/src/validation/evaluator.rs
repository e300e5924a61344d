//! Priority-ordered cross-validation evaluation.

use super::types::{ValidationRule, Violation};
use crate::coa::SegmentTuple;

/// Stateless engine for evaluating cross-validation rules.
pub struct ValidationEngine;

impl ValidationEngine {
    /// Evaluates all rules against an account's segments.
    ///
    /// Disabled rules are skipped. Enabled rules are evaluated in ascending
    /// priority order and the first violation short-circuits with the rule's
    /// configured message.
    ///
    /// # Errors
    ///
    /// Returns the first `Violation` found.
    pub fn evaluate(rules: &[ValidationRule], segments: &SegmentTuple) -> Result<(), Violation> {
        let mut enabled: Vec<_> = rules.iter().filter(|r| r.enabled).collect();
        enabled.sort_by_key(|r| r.priority);

        for rule in enabled {
            if rule.is_violated_by(segments) {
                return Err(Violation {
                    rule_id: rule.id,
                    message: rule.message.clone(),
                });
            }
        }
        Ok(())
    }
}
