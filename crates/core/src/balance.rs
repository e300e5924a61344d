//! Period balance mathematics.
//!
//! A balance row is keyed by (ledger, account, period, currency) and carries
//! the period's net activity plus a running beginning/ending balance. The
//! beginning balance of period N is the ending balance of period N-1,
//! carried forward at period initialization, never recomputed during
//! posting.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, LedgerId, PeriodId};

use crate::coa::AccountClass;

/// Key of one balance row within a ledger.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BalanceKey {
    /// The account.
    pub account_id: AccountId,
    /// The period.
    pub period_id: PeriodId,
    /// The currency of the accumulated amounts.
    pub currency: String,
}

/// Aggregated activity for one account, period, and currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balance {
    /// Ledger this row belongs to.
    pub ledger_id: LedgerId,
    /// The account.
    pub account_id: AccountId,
    /// The period.
    pub period_id: PeriodId,
    /// The currency of the accumulated amounts.
    pub currency: String,
    /// Classification driving the ending-balance sign convention.
    pub class: AccountClass,
    /// Net debit activity this period.
    pub period_net_dr: Decimal,
    /// Net credit activity this period.
    pub period_net_cr: Decimal,
    /// Balance carried in from the prior period.
    pub begin_balance: Decimal,
    /// Ending balance derived from the beginning balance and net activity.
    pub end_balance: Decimal,
    /// True when this row accumulates translated (reporting) amounts from
    /// lines entered in another currency.
    pub translated: bool,
}

impl Balance {
    /// Creates an empty balance row.
    #[must_use]
    pub fn new(
        ledger_id: LedgerId,
        account_id: AccountId,
        period_id: PeriodId,
        currency: impl Into<String>,
        class: AccountClass,
    ) -> Self {
        Self {
            ledger_id,
            account_id,
            period_id,
            currency: currency.into(),
            class,
            period_net_dr: Decimal::ZERO,
            period_net_cr: Decimal::ZERO,
            begin_balance: Decimal::ZERO,
            end_balance: Decimal::ZERO,
            translated: false,
        }
    }

    /// Accumulates a debit/credit pair and recomputes the ending balance.
    ///
    /// For debit-normal classifications (Asset, Expense) the ending balance
    /// is begin + dr - cr; for credit-normal ones it is begin - dr + cr.
    pub fn apply(&mut self, debit: Decimal, credit: Decimal) {
        self.period_net_dr += debit;
        self.period_net_cr += credit;
        self.recompute();
    }

    /// Seeds the beginning balance from the prior period's ending balance.
    pub fn carry_forward(&mut self, prior_end: Decimal) {
        self.begin_balance = prior_end;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.end_balance = self.begin_balance
            + self
                .class
                .normal_balance()
                .signed_change(self.period_net_dr, self.period_net_cr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn asset_balance() -> Balance {
        Balance::new(
            LedgerId::new(),
            AccountId::new(),
            PeriodId::new(),
            "USD",
            AccountClass::Asset,
        )
    }

    #[test]
    fn test_debit_then_credit_on_asset() {
        let mut balance = asset_balance();

        balance.apply(dec!(100), dec!(0));
        assert_eq!(balance.end_balance, dec!(100));

        balance.apply(dec!(0), dec!(30));
        assert_eq!(balance.end_balance, dec!(70));
        assert_eq!(balance.period_net_dr, dec!(100));
        assert_eq!(balance.period_net_cr, dec!(30));
    }

    #[test]
    fn test_credit_normal_sign_convention() {
        let mut balance = Balance::new(
            LedgerId::new(),
            AccountId::new(),
            PeriodId::new(),
            "USD",
            AccountClass::Revenue,
        );
        balance.apply(dec!(0), dec!(100));
        assert_eq!(balance.end_balance, dec!(100));

        balance.apply(dec!(25), dec!(0));
        assert_eq!(balance.end_balance, dec!(75));
    }

    #[test]
    fn test_carry_forward_seeds_begin_balance() {
        let mut balance = asset_balance();
        balance.carry_forward(dec!(500));
        assert_eq!(balance.begin_balance, dec!(500));
        assert_eq!(balance.end_balance, dec!(500));

        balance.apply(dec!(100), dec!(0));
        assert_eq!(balance.end_balance, dec!(600));
    }

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The ending balance always equals begin plus the signed net,
        /// however many applications got us there.
        #[test]
        fn prop_end_balance_consistency(
            begin in amount_strategy(),
            pairs in prop::collection::vec((amount_strategy(), amount_strategy()), 1..20),
        ) {
            let mut balance = asset_balance();
            balance.carry_forward(begin);
            for (dr, cr) in &pairs {
                balance.apply(*dr, *cr);
            }

            let net_dr: Decimal = pairs.iter().map(|(dr, _)| *dr).sum();
            let net_cr: Decimal = pairs.iter().map(|(_, cr)| *cr).sum();
            prop_assert_eq!(balance.period_net_dr, net_dr);
            prop_assert_eq!(balance.period_net_cr, net_cr);
            prop_assert_eq!(balance.end_balance, begin + net_dr - net_cr);
        }

        /// Application order never changes the final balance.
        #[test]
        fn prop_apply_is_order_insensitive(
            mut pairs in prop::collection::vec((amount_strategy(), amount_strategy()), 2..10),
        ) {
            let mut forward = asset_balance();
            for (dr, cr) in &pairs {
                forward.apply(*dr, *cr);
            }

            pairs.reverse();
            let mut backward = asset_balance();
            for (dr, cr) in &pairs {
                backward.apply(*dr, *cr);
            }

            prop_assert_eq!(forward.end_balance, backward.end_balance);
        }
    }
}
