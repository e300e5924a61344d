//! Journal input validation and entered-to-accounted resolution.
//!
//! This service contains pure business logic with no storage dependencies.
//! Account resolution is injected as a closure so the same logic runs
//! against any account store.

use rust_decimal::Decimal;
use tally_shared::types::LineId;

use super::error::JournalError;
use super::types::{AccountRef, JournalLine, JournalTotals, LineInput, LineSource};
use crate::coa::{CoaError, CodeCombination};
use crate::currency;

/// Stateless service for journal line validation and resolution.
pub struct JournalService;

impl JournalService {
    /// Validates journal line inputs before resolution.
    ///
    /// Checks:
    /// 1. At least 2 lines
    /// 2. No negative amounts
    /// 3. Exactly one of debit/credit non-zero per line
    ///
    /// # Errors
    ///
    /// Returns `JournalError` if any check fails.
    pub fn validate_lines(inputs: &[LineInput]) -> Result<(), JournalError> {
        if inputs.len() < 2 {
            return Err(JournalError::InsufficientLines);
        }
        for input in inputs {
            if input.entered_dr < Decimal::ZERO || input.entered_cr < Decimal::ZERO {
                return Err(JournalError::NegativeAmount);
            }
            match (
                input.entered_dr == Decimal::ZERO,
                input.entered_cr == Decimal::ZERO,
            ) {
                (true, true) => return Err(JournalError::ZeroAmount),
                (false, false) => return Err(JournalError::BothSidesSet),
                _ => {}
            }
        }
        Ok(())
    }

    /// Validates and resolves line inputs into journal lines.
    ///
    /// For each line, resolves the account through `resolve_account`, tags
    /// the line with the account's company segment value, and computes the
    /// accounted amounts (entered amount times rate, Banker's-rounded; rate
    /// 1 when the line currency equals the functional currency).
    ///
    /// # Errors
    ///
    /// Returns `JournalError` if validation, account resolution, or rate
    /// resolution fails.
    pub fn resolve_lines<A>(
        inputs: &[LineInput],
        functional_currency: &str,
        company_segment: usize,
        mut resolve_account: A,
    ) -> Result<Vec<JournalLine>, JournalError>
    where
        A: FnMut(&AccountRef) -> Result<CodeCombination, CoaError>,
    {
        Self::validate_lines(inputs)?;

        let mut lines = Vec::with_capacity(inputs.len());
        for input in inputs {
            let account = resolve_account(&input.account)?;
            if !account.enabled {
                return Err(JournalError::Account(CoaError::AccountDisabled(account.id)));
            }

            let rate = if input.currency == functional_currency {
                Decimal::ONE
            } else {
                input.rate.ok_or_else(|| JournalError::MissingRate {
                    currency: input.currency.clone(),
                })?
            };
            if rate <= Decimal::ZERO {
                return Err(JournalError::InvalidRate);
            }

            let company = account
                .segments
                .segment(company_segment)
                .unwrap_or_default()
                .to_string();

            lines.push(JournalLine {
                id: LineId::new(),
                account_id: account.id,
                company,
                currency: input.currency.clone(),
                entered_dr: input.entered_dr,
                entered_cr: input.entered_cr,
                rate,
                accounted_dr: currency::to_accounted(input.entered_dr, rate),
                accounted_cr: currency::to_accounted(input.entered_cr, rate),
                description: input.description.clone(),
                source: LineSource::Caller,
            });
        }
        Ok(lines)
    }

    /// Sums the accounted amounts of resolved lines.
    #[must_use]
    pub fn totals(lines: &[JournalLine]) -> JournalTotals {
        JournalTotals::from_lines(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coa::{AccountClass, SegmentTuple};
    use rust_decimal_macros::dec;
    use tally_shared::types::LedgerId;

    fn debit(amount: Decimal) -> LineInput {
        LineInput {
            account: AccountRef::Segments(vec!["101".into(), "000".into(), "5400".into()]),
            currency: "USD".into(),
            entered_dr: amount,
            entered_cr: Decimal::ZERO,
            rate: None,
            description: None,
        }
    }

    fn credit(amount: Decimal) -> LineInput {
        LineInput {
            account: AccountRef::Segments(vec!["101".into(), "000".into(), "1100".into()]),
            currency: "USD".into(),
            entered_dr: Decimal::ZERO,
            entered_cr: amount,
            rate: None,
            description: None,
        }
    }

    fn resolver(enabled: bool) -> impl FnMut(&AccountRef) -> Result<CodeCombination, CoaError> {
        move |account_ref| {
            let values = match account_ref {
                AccountRef::Segments(values) => values.clone(),
                AccountRef::Id(id) => return Err(CoaError::AccountNotFound(*id)),
            };
            let mut account = CodeCombination::new(
                LedgerId::new(),
                SegmentTuple::new(values)?,
                AccountClass::Expense,
            );
            account.enabled = enabled;
            Ok(account)
        }
    }

    #[test]
    fn test_validate_requires_two_lines() {
        let result = JournalService::validate_lines(&[debit(dec!(100))]);
        assert!(matches!(result, Err(JournalError::InsufficientLines)));
    }

    #[test]
    fn test_validate_rejects_negative() {
        let inputs = vec![debit(dec!(-100)), credit(dec!(100))];
        assert!(matches!(
            JournalService::validate_lines(&inputs),
            Err(JournalError::NegativeAmount)
        ));
    }

    #[test]
    fn test_validate_rejects_empty_line() {
        let inputs = vec![debit(dec!(0)), credit(dec!(100))];
        assert!(matches!(
            JournalService::validate_lines(&inputs),
            Err(JournalError::ZeroAmount)
        ));
    }

    #[test]
    fn test_validate_rejects_both_sides() {
        let mut both = debit(dec!(100));
        both.entered_cr = dec!(50);
        let inputs = vec![both, credit(dec!(100))];
        assert!(matches!(
            JournalService::validate_lines(&inputs),
            Err(JournalError::BothSidesSet)
        ));
    }

    #[test]
    fn test_resolve_functional_currency_uses_rate_one() {
        let inputs = vec![debit(dec!(100)), credit(dec!(100))];
        let lines =
            JournalService::resolve_lines(&inputs, "USD", 0, resolver(true)).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].rate, Decimal::ONE);
        assert_eq!(lines[0].accounted_dr, dec!(100.0000));
        assert_eq!(lines[0].company, "101");
        assert_eq!(lines[0].source, LineSource::Caller);
    }

    #[test]
    fn test_resolve_foreign_currency_applies_rate() {
        let mut eur_debit = debit(dec!(100));
        eur_debit.currency = "EUR".into();
        eur_debit.rate = Some(dec!(1.5));
        let usd_credit = credit(dec!(150));
        let inputs = vec![eur_debit, usd_credit.clone()];

        let lines =
            JournalService::resolve_lines(&inputs, "USD", 0, resolver(true)).unwrap();
        assert_eq!(lines[0].rate, dec!(1.5));
        assert_eq!(lines[0].accounted_dr, dec!(150.0000));

        let totals = JournalService::totals(&lines);
        assert!(totals.is_balanced_within(dec!(0.005)));

        // Missing rate for a foreign-currency line fails.
        let mut no_rate = debit(dec!(100));
        no_rate.currency = "EUR".into();
        let inputs = vec![no_rate, usd_credit.clone()];
        assert!(matches!(
            JournalService::resolve_lines(&inputs, "USD", 0, resolver(true)),
            Err(JournalError::MissingRate { .. })
        ));

        // Non-positive rates fail.
        let mut zero_rate = debit(dec!(100));
        zero_rate.currency = "EUR".into();
        zero_rate.rate = Some(Decimal::ZERO);
        let inputs = vec![zero_rate, usd_credit];
        assert!(matches!(
            JournalService::resolve_lines(&inputs, "USD", 0, resolver(true)),
            Err(JournalError::InvalidRate)
        ));
    }

    #[test]
    fn test_resolve_rejects_disabled_account() {
        let inputs = vec![debit(dec!(100)), credit(dec!(100))];
        let result = JournalService::resolve_lines(&inputs, "USD", 0, resolver(false));
        assert!(matches!(
            result,
            Err(JournalError::Account(CoaError::AccountDisabled(_)))
        ));
    }
}
