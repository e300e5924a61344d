//! Ordered posting validation and plan construction.

use rust_decimal::Decimal;

use super::error::PostingError;
use crate::approval::ApprovalGate;
use crate::coa::CodeCombination;
use crate::intercompany::{IntercompanyBalancer, IntercompanyRule};
use crate::journal::types::{Journal, JournalLine, JournalStatus, JournalTotals};
use crate::period::PeriodStatus;
use crate::validation::{ValidationEngine, ValidationRule};
use tally_shared::types::AccountId;

/// The validated outcome of the posting pipeline, ready to commit.
#[derive(Debug)]
pub struct PostingPlan {
    /// Due-to/due-from lines synthesized by the intercompany balancer.
    pub synthesized: Vec<JournalLine>,
    /// Totals over the original plus synthesized lines.
    pub totals: JournalTotals,
}

/// Stateless posting pipeline.
///
/// Runs the ordered validation steps against injected lookups, aborting on
/// the first failure. Committing the plan (journal state, lines, balances)
/// is the caller's job; on failure the journal is left untouched.
pub struct PostingPipeline;

impl PostingPipeline {
    /// Validates a journal and builds its posting plan.
    ///
    /// Steps, in order, aborting on the first failure:
    /// 1. Period state check (the period must be Open)
    /// 2. Approval gate and journal status check
    /// 3. Cross-validation of every line's account
    /// 4. Balance check within the ledger's epsilon
    /// 5. Intercompany balancing, with the balance re-verified over the
    ///    combined line set
    ///
    /// # Errors
    ///
    /// Returns the first `PostingError` encountered.
    pub fn plan<A, R>(
        journal: &Journal,
        period_status: PeriodStatus,
        rules: &[ValidationRule],
        account_lookup: A,
        rule_lookup: R,
        functional_currency: &str,
        epsilon: Decimal,
    ) -> Result<PostingPlan, PostingError>
    where
        A: Fn(AccountId) -> Option<CodeCombination>,
        R: Fn(&str, &str) -> Option<IntercompanyRule>,
    {
        // 1. Period state, re-checked at execution time by the caller's
        //    orchestrator so a close queued ahead of us still wins.
        if !period_status.allows_posting() {
            return Err(PostingError::PeriodClosed);
        }

        // 2. Approval gate, then the status itself.
        ApprovalGate::check_postable(journal.requires_approval, journal.status).map_err(|_| {
            PostingError::ApprovalRequired {
                status: journal.status,
            }
        })?;
        if !matches!(
            journal.status,
            JournalStatus::Draft | JournalStatus::Approved
        ) {
            return Err(PostingError::NotPostable {
                status: journal.status,
            });
        }

        // 3. Cross-validation on every line's account.
        for line in &journal.lines {
            let account = account_lookup(line.account_id)
                .ok_or(PostingError::AccountNotFound(line.account_id))?;
            ValidationEngine::evaluate(rules, &account.segments).map_err(|violation| {
                PostingError::CrossValidation {
                    rule_id: violation.rule_id,
                    message: violation.message,
                }
            })?;
        }

        // 4. Overall balance.
        let totals = journal.totals();
        if !totals.is_balanced_within(epsilon) {
            return Err(PostingError::Unbalanced {
                debit: totals.accounted_debit,
                credit: totals.accounted_credit,
            });
        }

        // 5. Intercompany balancing; the combined set must still balance.
        let synthesized = IntercompanyBalancer::balance(
            &journal.lines,
            functional_currency,
            epsilon,
            rule_lookup,
        )?;

        let mut combined = journal.lines.clone();
        combined.extend(synthesized.iter().cloned());
        let totals = JournalTotals::from_lines(&combined);
        if !totals.is_balanced_within(epsilon) {
            return Err(PostingError::Unbalanced {
                debit: totals.accounted_debit,
                credit: totals.accounted_credit,
            });
        }

        Ok(PostingPlan { synthesized, totals })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coa::{AccountClass, SegmentTuple};
    use crate::intercompany::IntercompanyError;
    use crate::journal::types::LineSource;
    use crate::validation::SegmentPredicate;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use tally_shared::types::{ActorId, JournalId, LedgerId, LineId, PeriodId, ValidationRuleId};

    const EPSILON: Decimal = Decimal::from_parts(5, 0, 0, false, 3);

    struct Fixture {
        accounts: HashMap<AccountId, CodeCombination>,
        intercompany: HashMap<(String, String), IntercompanyRule>,
        journal: Journal,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                accounts: HashMap::new(),
                intercompany: HashMap::new(),
                journal: Journal {
                    id: JournalId::new(),
                    ledger_id: LedgerId::new(),
                    period_id: PeriodId::new(),
                    number: "JE-000001".into(),
                    description: "test".into(),
                    currency: "USD".into(),
                    status: JournalStatus::Draft,
                    requires_approval: false,
                    created_by: ActorId::new(),
                    submitted_by: None,
                    submitted_at: None,
                    decided_by: None,
                    decided_at: None,
                    posted_at: None,
                    lines: Vec::new(),
                },
            }
        }

        fn account(&mut self, company: &str, natural: &str, class: AccountClass) -> AccountId {
            let segments =
                SegmentTuple::new(vec![company.into(), "000".into(), natural.into()]).unwrap();
            let account = CodeCombination::new(self.journal.ledger_id, segments, class);
            let id = account.id;
            self.accounts.insert(id, account);
            id
        }

        fn line(&mut self, account_id: AccountId, company: &str, dr: Decimal, cr: Decimal) {
            self.journal.lines.push(JournalLine {
                id: LineId::new(),
                account_id,
                company: company.into(),
                currency: "USD".into(),
                entered_dr: dr,
                entered_cr: cr,
                rate: Decimal::ONE,
                accounted_dr: dr,
                accounted_cr: cr,
                description: None,
                source: LineSource::Caller,
            });
        }

        fn intercompany_rule(&mut self, from: &str, to: &str) {
            let payable = self.account(from, "2850", AccountClass::Liability);
            let receivable = self.account(to, "1850", AccountClass::Asset);
            self.intercompany.insert(
                (from.to_string(), to.to_string()),
                IntercompanyRule::new(self.journal.ledger_id, from, to, payable, receivable),
            );
        }

        fn plan(&self, rules: &[ValidationRule]) -> Result<PostingPlan, PostingError> {
            self.plan_in(PeriodStatus::Open, rules)
        }

        fn plan_in(
            &self,
            period_status: PeriodStatus,
            rules: &[ValidationRule],
        ) -> Result<PostingPlan, PostingError> {
            PostingPipeline::plan(
                &self.journal,
                period_status,
                rules,
                |id| self.accounts.get(&id).cloned(),
                |from, to| {
                    self.intercompany
                        .get(&(from.to_string(), to.to_string()))
                        .cloned()
                },
                "USD",
                EPSILON,
            )
        }
    }

    #[test]
    fn test_balanced_single_company_journal_plans() {
        let mut fx = Fixture::new();
        let expense = fx.account("101", "5400", AccountClass::Expense);
        let cash = fx.account("101", "1100", AccountClass::Asset);
        fx.line(expense, "101", dec!(100), dec!(0));
        fx.line(cash, "101", dec!(0), dec!(100));

        let plan = fx.plan(&[]).unwrap();
        assert!(plan.synthesized.is_empty());
        assert_eq!(plan.totals.accounted_debit, dec!(100));
    }

    #[test]
    fn test_closed_period_aborts_first() {
        let mut fx = Fixture::new();
        let expense = fx.account("101", "5400", AccountClass::Expense);
        let cash = fx.account("101", "1100", AccountClass::Asset);
        fx.line(expense, "101", dec!(100), dec!(0));
        fx.line(cash, "101", dec!(0), dec!(100));

        let result = fx.plan_in(PeriodStatus::Closed, &[]);
        assert!(matches!(result, Err(PostingError::PeriodClosed)));
    }

    #[test]
    fn test_approval_required_blocks_posting() {
        let mut fx = Fixture::new();
        fx.journal.requires_approval = true;
        let expense = fx.account("101", "5400", AccountClass::Expense);
        let cash = fx.account("101", "1100", AccountClass::Asset);
        fx.line(expense, "101", dec!(100), dec!(0));
        fx.line(cash, "101", dec!(0), dec!(100));

        let result = fx.plan(&[]);
        assert!(matches!(
            result,
            Err(PostingError::ApprovalRequired {
                status: JournalStatus::Draft
            })
        ));

        // Once approved, the same journal plans cleanly.
        let mut fx2 = Fixture::new();
        fx2.journal.requires_approval = true;
        fx2.journal.status = JournalStatus::Approved;
        fx2.journal.decided_by = Some(ActorId::new());
        fx2.journal.decided_at = Some(Utc::now());
        let expense = fx2.account("101", "5400", AccountClass::Expense);
        let cash = fx2.account("101", "1100", AccountClass::Asset);
        fx2.line(expense, "101", dec!(100), dec!(0));
        fx2.line(cash, "101", dec!(0), dec!(100));
        assert!(fx2.plan(&[]).is_ok());
    }

    #[test]
    fn test_posted_journal_is_not_postable() {
        let mut fx = Fixture::new();
        fx.journal.status = JournalStatus::Posted;
        let expense = fx.account("101", "5400", AccountClass::Expense);
        let cash = fx.account("101", "1100", AccountClass::Asset);
        fx.line(expense, "101", dec!(100), dec!(0));
        fx.line(cash, "101", dec!(0), dec!(100));

        assert!(matches!(
            fx.plan(&[]),
            Err(PostingError::NotPostable {
                status: JournalStatus::Posted
            })
        ));
    }

    #[test]
    fn test_cross_validation_violation_carries_rule_message() {
        let mut fx = Fixture::new();
        let blocked = fx.account("102", "5400", AccountClass::Expense);
        let cash = fx.account("102", "1100", AccountClass::Asset);
        fx.line(blocked, "102", dec!(100), dec!(0));
        fx.line(cash, "102", dec!(0), dec!(100));

        // The blocked account has cost-center 000; block (102, 000).
        let rule = ValidationRule {
            id: ValidationRuleId::new(),
            ledger_id: fx.journal.ledger_id,
            name: "102/000".into(),
            include: Some(SegmentPredicate::new(0, "102")),
            exclude: Some(SegmentPredicate::new(1, "000")),
            enabled: true,
            priority: 10,
            message: "Company 102 may not use cost center 000".into(),
        };
        let result = fx.plan(&[rule]);
        match result {
            Err(PostingError::CrossValidation { message, .. }) => {
                assert_eq!(message, "Company 102 may not use cost center 000");
            }
            other => panic!("expected CrossValidation, got {other:?}"),
        }
    }

    #[test]
    fn test_unbalanced_journal_is_rejected() {
        let mut fx = Fixture::new();
        let expense = fx.account("101", "5400", AccountClass::Expense);
        let cash = fx.account("101", "1100", AccountClass::Asset);
        fx.line(expense, "101", dec!(100), dec!(0));
        fx.line(cash, "101", dec!(0), dec!(50));

        assert!(matches!(fx.plan(&[]), Err(PostingError::Unbalanced { .. })));
    }

    #[test]
    fn test_intercompany_lines_join_the_plan() {
        let mut fx = Fixture::new();
        let expense = fx.account("101", "5400", AccountClass::Expense);
        let cash = fx.account("102", "1100", AccountClass::Asset);
        fx.line(expense, "101", dec!(1000), dec!(0));
        fx.line(cash, "102", dec!(0), dec!(1000));
        fx.intercompany_rule("101", "102");

        let plan = fx.plan(&[]).unwrap();
        assert_eq!(plan.synthesized.len(), 2);
        assert_eq!(plan.totals.accounted_debit, dec!(2000));
        assert_eq!(plan.totals.accounted_credit, dec!(2000));
    }

    #[test]
    fn test_missing_intercompany_rule_aborts() {
        let mut fx = Fixture::new();
        let expense = fx.account("101", "5400", AccountClass::Expense);
        let cash = fx.account("102", "1100", AccountClass::Asset);
        fx.line(expense, "101", dec!(1000), dec!(0));
        fx.line(cash, "102", dec!(0), dec!(1000));

        assert!(matches!(
            fx.plan(&[]),
            Err(PostingError::Intercompany(
                IntercompanyError::RuleMissing { .. }
            ))
        ));
    }

    #[test]
    fn test_missing_account_is_defensive_error() {
        let mut fx = Fixture::new();
        let expense = fx.account("101", "5400", AccountClass::Expense);
        fx.line(expense, "101", dec!(100), dec!(0));
        // A line pointing at an account the lookup does not know.
        fx.line(AccountId::new(), "101", dec!(0), dec!(100));

        assert!(matches!(
            fx.plan(&[]),
            Err(PostingError::AccountNotFound(_))
        ));
    }
}
