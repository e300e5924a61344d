//! The balance cube: aggregated period activity per account and currency.

use dashmap::DashMap;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tally_core::balance::Balance;
use tally_core::coa::AccountClass;
use tally_core::journal::JournalLine;
use tally_shared::types::{AccountId, LedgerId, PeriodId};

/// Accumulated delta for one row during a single posting.
#[derive(Debug, Default, Clone, Copy)]
struct RowDelta {
    debit: Decimal,
    credit: Decimal,
    translated: bool,
}

/// In-process balance cube.
///
/// Rows are keyed by (ledger, account, period, currency). Mutation goes
/// through the entry API one row at a time, in sorted key order, so two
/// journals touching the same accounts serialize per row without any
/// cross-row lock cycle.
#[derive(Debug, Default)]
pub struct BalanceStore {
    rows: DashMap<(LedgerId, AccountId, PeriodId, String), Balance>,
}

impl BalanceStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a posted journal's lines to the cube.
    ///
    /// Each line updates the row in its entered currency; a line entered in
    /// a non-functional currency additionally updates the functional-
    /// currency row with its accounted amounts, flagged as translated.
    /// Deltas are aggregated first and applied per row in ascending key
    /// order.
    pub fn apply_posting(
        &self,
        ledger_id: LedgerId,
        period_id: PeriodId,
        functional_currency: &str,
        lines: &[JournalLine],
        class_of: impl Fn(AccountId) -> AccountClass,
    ) {
        let mut deltas: BTreeMap<(AccountId, String), RowDelta> = BTreeMap::new();

        for line in lines {
            if line.currency == functional_currency {
                let delta = deltas
                    .entry((line.account_id, line.currency.clone()))
                    .or_default();
                delta.debit += line.accounted_dr;
                delta.credit += line.accounted_cr;
            } else {
                let entered = deltas
                    .entry((line.account_id, line.currency.clone()))
                    .or_default();
                entered.debit += line.entered_dr;
                entered.credit += line.entered_cr;

                let reporting = deltas
                    .entry((line.account_id, functional_currency.to_string()))
                    .or_default();
                reporting.debit += line.accounted_dr;
                reporting.credit += line.accounted_cr;
                reporting.translated = true;
            }
        }

        for ((account_id, currency), delta) in deltas {
            let class = class_of(account_id);
            let mut row = self
                .rows
                .entry((ledger_id, account_id, period_id, currency.clone()))
                .or_insert_with(|| {
                    Balance::new(ledger_id, account_id, period_id, currency, class)
                });
            if delta.translated {
                row.translated = true;
            }
            row.apply(delta.debit, delta.credit);
        }
    }

    /// Returns one balance row.
    #[must_use]
    pub fn get(
        &self,
        ledger_id: LedgerId,
        account_id: AccountId,
        period_id: PeriodId,
        currency: &str,
    ) -> Option<Balance> {
        self.rows
            .get(&(ledger_id, account_id, period_id, currency.to_string()))
            .map(|b| b.clone())
    }

    /// Returns all rows for a ledger and period, in key order.
    #[must_use]
    pub fn rows_for(&self, ledger_id: LedgerId, period_id: PeriodId) -> Vec<Balance> {
        let mut rows: Vec<Balance> = self
            .rows
            .iter()
            .filter(|b| b.ledger_id == ledger_id && b.period_id == period_id)
            .map(|b| b.clone())
            .collect();
        rows.sort_by(|a, b| (a.account_id, &a.currency).cmp(&(b.account_id, &b.currency)));
        rows
    }

    /// Seeds the target period's beginning balances from the source
    /// period's ending balances.
    ///
    /// Returns the number of rows carried forward.
    pub fn carry_forward(
        &self,
        ledger_id: LedgerId,
        from_period: PeriodId,
        to_period: PeriodId,
    ) -> usize {
        let priors = self.rows_for(ledger_id, from_period);
        let count = priors.len();
        for prior in priors {
            let mut row = self
                .rows
                .entry((
                    ledger_id,
                    prior.account_id,
                    to_period,
                    prior.currency.clone(),
                ))
                .or_insert_with(|| {
                    Balance::new(
                        ledger_id,
                        prior.account_id,
                        to_period,
                        prior.currency.clone(),
                        prior.class,
                    )
                });
            row.translated |= prior.translated;
            row.carry_forward(prior.end_balance);
        }
        count
    }
}
