//! Cross-validation rule types.

use serde::{Deserialize, Serialize};
use tally_shared::types::{LedgerId, ValidationRuleId};

use crate::coa::SegmentTuple;

/// A typed equality predicate over one segment.
///
/// Filters are typed rather than parsed from "segment=value" strings, which
/// keeps evaluation total: there is no way to hit a parse failure at posting
/// time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentPredicate {
    /// Index of the segment to test.
    pub segment: usize,
    /// Expected value.
    pub value: String,
}

impl SegmentPredicate {
    /// Creates a predicate on one segment.
    #[must_use]
    pub fn new(segment: usize, value: impl Into<String>) -> Self {
        Self {
            segment,
            value: value.into(),
        }
    }

    /// Returns true if the tuple's segment equals the expected value.
    #[must_use]
    pub fn matches(&self, segments: &SegmentTuple) -> bool {
        segments.segment(self.segment) == Some(self.value.as_str())
    }
}

/// A configured cross-validation rule.
///
/// A rule is violated when an account's segments match **both** the include
/// and the exclude predicate. An absent predicate matches everything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationRule {
    /// Unique identifier.
    pub id: ValidationRuleId,
    /// Ledger this rule belongs to.
    pub ledger_id: LedgerId,
    /// Human-readable rule name.
    pub name: String,
    /// Include filter; `None` matches everything.
    pub include: Option<SegmentPredicate>,
    /// Exclude filter; `None` matches everything.
    pub exclude: Option<SegmentPredicate>,
    /// Whether the rule is evaluated at all.
    pub enabled: bool,
    /// Evaluation order, ascending.
    pub priority: i16,
    /// Error message reported on violation.
    pub message: String,
}

impl ValidationRule {
    /// Returns true if the account's segments hit the disallowed combination.
    #[must_use]
    pub fn is_violated_by(&self, segments: &SegmentTuple) -> bool {
        let include_matches = self.include.as_ref().is_none_or(|p| p.matches(segments));
        let exclude_matches = self.exclude.as_ref().is_none_or(|p| p.matches(segments));
        include_matches && exclude_matches
    }
}

/// A reported rule violation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// The violated rule.
    pub rule_id: ValidationRuleId,
    /// The rule's configured error message.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments() -> SegmentTuple {
        SegmentTuple::new(vec!["102".into(), "200".into(), "5400".into()]).unwrap()
    }

    #[test]
    fn test_predicate_matches() {
        let tuple = segments();
        assert!(SegmentPredicate::new(0, "102").matches(&tuple));
        assert!(!SegmentPredicate::new(0, "101").matches(&tuple));
        // Out-of-range index never matches.
        assert!(!SegmentPredicate::new(9, "102").matches(&tuple));
    }

    #[test]
    fn test_rule_violated_when_both_match() {
        let rule = ValidationRule {
            id: ValidationRuleId::new(),
            ledger_id: LedgerId::new(),
            name: "No dept 200 for company 102".into(),
            include: Some(SegmentPredicate::new(0, "102")),
            exclude: Some(SegmentPredicate::new(1, "200")),
            enabled: true,
            priority: 10,
            message: "Company 102 may not use department 200".into(),
        };
        assert!(rule.is_violated_by(&segments()));

        let allowed =
            SegmentTuple::new(vec!["102".into(), "100".into(), "5400".into()]).unwrap();
        assert!(!rule.is_violated_by(&allowed));
    }

    #[test]
    fn test_absent_filter_matches_everything() {
        let rule = ValidationRule {
            id: ValidationRuleId::new(),
            ledger_id: LedgerId::new(),
            name: "Block dept 200 everywhere".into(),
            include: None,
            exclude: Some(SegmentPredicate::new(1, "200")),
            enabled: true,
            priority: 10,
            message: "Department 200 is blocked".into(),
        };
        assert!(rule.is_violated_by(&segments()));
    }
}
