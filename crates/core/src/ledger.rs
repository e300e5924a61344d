//! The accounting book, its chart structure, and per-ledger settings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::LedgerId;

use crate::coa::ClassificationConvention;

/// Structure of a ledger's chart of accounts.
///
/// Names the ordered segments and designates which segment carries the
/// balancing company value and which carries the natural account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartStructure {
    /// Ordered segment names (e.g. company, cost-center, natural-account).
    pub segment_names: Vec<String>,
    /// Index of the company segment used for intercompany balancing.
    pub company_segment: usize,
    /// Index of the natural-account segment used for classification.
    pub natural_segment: usize,
}

impl ChartStructure {
    /// Returns the number of segments every account tuple must carry.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segment_names.len()
    }
}

/// Per-ledger posting settings.
///
/// Both fields are observed defaults rather than contracts, so they are
/// configurable per ledger with engine-wide defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSettings {
    /// Tolerance for the debit/credit equality check, in the ledger's
    /// minor unit.
    pub balance_epsilon: Decimal,
    /// Leading-digit classification convention.
    pub classification: ClassificationConvention,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            // 0.005 in the minor unit
            balance_epsilon: Decimal::new(5, 3),
            classification: ClassificationConvention::default(),
        }
    }
}

/// A named accounting book with its own functional currency and chart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    /// Unique identifier.
    pub id: LedgerId,
    /// Ledger name.
    pub name: String,
    /// Functional currency code (ISO 4217).
    pub functional_currency: String,
    /// Chart-of-accounts structure.
    pub chart: ChartStructure,
    /// Posting settings.
    pub settings: LedgerSettings,
}

impl Ledger {
    /// Creates a ledger with default settings.
    #[must_use]
    pub fn new(name: impl Into<String>, functional_currency: impl Into<String>, chart: ChartStructure) -> Self {
        Self {
            id: LedgerId::new(),
            name: name.into(),
            functional_currency: functional_currency.into(),
            chart,
            settings: LedgerSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn five_segment_chart() -> ChartStructure {
        ChartStructure {
            segment_names: vec![
                "company".into(),
                "cost_center".into(),
                "account".into(),
                "sub_account".into(),
                "product".into(),
            ],
            company_segment: 0,
            natural_segment: 2,
        }
    }

    #[test]
    fn test_segment_count() {
        assert_eq!(five_segment_chart().segment_count(), 5);
    }

    #[test]
    fn test_default_settings() {
        let ledger = Ledger::new("Primary", "USD", five_segment_chart());
        assert_eq!(ledger.settings.balance_epsilon, dec!(0.005));
        assert_eq!(ledger.functional_currency, "USD");
    }
}
