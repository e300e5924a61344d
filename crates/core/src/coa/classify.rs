//! Leading-digit classification convention.

use serde::{Deserialize, Serialize};

use super::types::AccountClass;

/// Maps the leading digit of the natural-account segment to a classification.
///
/// The default convention (1=Asset, 2=Liability, 3=Equity, 4=Revenue,
/// 5=Expense) is an observed default, not a contract, so the mapping is
/// configurable per ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationConvention {
    /// Leading-digit to classification pairs, checked in order.
    pub leading_digits: Vec<(char, AccountClass)>,
    /// Classification used when no pair matches.
    pub fallback: AccountClass,
}

impl Default for ClassificationConvention {
    fn default() -> Self {
        Self {
            leading_digits: vec![
                ('1', AccountClass::Asset),
                ('2', AccountClass::Liability),
                ('3', AccountClass::Equity),
                ('4', AccountClass::Revenue),
                ('5', AccountClass::Expense),
            ],
            fallback: AccountClass::Asset,
        }
    }
}

impl ClassificationConvention {
    /// Classifies an account from its natural-account segment value.
    #[must_use]
    pub fn classify(&self, natural_segment: &str) -> AccountClass {
        let Some(leading) = natural_segment.chars().next() else {
            return self.fallback;
        };
        self.leading_digits
            .iter()
            .find(|(digit, _)| *digit == leading)
            .map_or(self.fallback, |(_, class)| *class)
    }
}
