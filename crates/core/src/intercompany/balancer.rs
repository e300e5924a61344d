//! Per-company netting and pairwise due-to/due-from reduction.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tally_shared::types::LineId;

use super::error::IntercompanyError;
use super::types::IntercompanyRule;
use crate::journal::types::{JournalLine, LineSource};

/// Stateless intercompany balancer.
///
/// The pairwise-reduction order is deterministic: debtor groups are
/// processed in ascending company order, and each consumes capacity from
/// creditor groups in the same ascending order. Generalizing the reduction
/// beyond the two-company case is a design choice of this engine, not an
/// inherited guarantee.
pub struct IntercompanyBalancer;

impl IntercompanyBalancer {
    /// Computes each company's net (debit minus credit) over accounted
    /// amounts, in ascending company order.
    #[must_use]
    pub fn company_nets(lines: &[JournalLine]) -> BTreeMap<String, Decimal> {
        let mut nets: BTreeMap<String, Decimal> = BTreeMap::new();
        for line in lines {
            let net = nets.entry(line.company.clone()).or_insert(Decimal::ZERO);
            *net += line.accounted_dr - line.accounted_cr;
        }
        nets
    }

    /// Synthesizes due-to/due-from lines so every company nets to zero.
    ///
    /// Runs only when the lines span more than one distinct company value;
    /// otherwise returns no lines. Nets within `epsilon` of zero are treated
    /// as already balanced. Each (debtor, creditor, amount) pairing requires
    /// a rule for the ordered pair (debtor, creditor):
    /// - a credit of `amount` on the rule's payable account, tagged to the
    ///   debtor ("Due to {creditor}")
    /// - a debit of `amount` on the rule's receivable account, tagged to the
    ///   creditor ("Due from {debtor}")
    ///
    /// Synthesized lines are in the functional currency at rate 1. The
    /// grouping check is re-run over the combined line set once; any
    /// residual aborts the balancing.
    ///
    /// # Errors
    ///
    /// Returns `IntercompanyError::RuleMissing` when a required pair has no
    /// rule, or `IntercompanyError::Unresolved` when a company still nets
    /// non-zero after reduction. Either way no partial result is returned.
    pub fn balance<R>(
        lines: &[JournalLine],
        functional_currency: &str,
        epsilon: Decimal,
        rule_lookup: R,
    ) -> Result<Vec<JournalLine>, IntercompanyError>
    where
        R: Fn(&str, &str) -> Option<IntercompanyRule>,
    {
        let nets = Self::company_nets(lines);
        if nets.len() <= 1 {
            return Ok(Vec::new());
        }

        // Ascending company order on both sides keeps pairing stable.
        let debtors: Vec<(String, Decimal)> = nets
            .iter()
            .filter(|(_, net)| **net > epsilon)
            .map(|(company, net)| (company.clone(), *net))
            .collect();
        let mut creditors: Vec<(String, Decimal)> = nets
            .iter()
            .filter(|(_, net)| **net < -epsilon)
            .map(|(company, net)| (company.clone(), -*net))
            .collect();

        let mut synthesized = Vec::new();
        let mut creditor_index = 0;

        for (debtor, mut remaining) in debtors {
            while remaining > epsilon {
                let Some((creditor, available)) = creditors.get_mut(creditor_index) else {
                    return Err(IntercompanyError::Unresolved { company: debtor });
                };
                let amount = remaining.min(*available);
                let rule = rule_lookup(&debtor, creditor).ok_or_else(|| {
                    IntercompanyError::RuleMissing {
                        from: debtor.clone(),
                        to: creditor.clone(),
                    }
                })?;

                synthesized.push(Self::due_to_line(
                    &rule,
                    &debtor,
                    creditor,
                    amount,
                    functional_currency,
                ));
                synthesized.push(Self::due_from_line(
                    &rule,
                    &debtor,
                    creditor,
                    amount,
                    functional_currency,
                ));

                remaining -= amount;
                *available -= amount;
                if *available <= epsilon {
                    creditor_index += 1;
                }
            }
        }

        // One re-grouping pass over the combined set; pairwise reduction
        // does not attempt N-way simultaneous solving.
        let mut combined = lines.to_vec();
        combined.extend(synthesized.iter().cloned());
        for (company, net) in Self::company_nets(&combined) {
            if net.abs() > epsilon {
                return Err(IntercompanyError::Unresolved { company });
            }
        }

        Ok(synthesized)
    }

    /// Credit on the payable account, tagged to the debtor company.
    fn due_to_line(
        rule: &IntercompanyRule,
        debtor: &str,
        creditor: &str,
        amount: Decimal,
        functional_currency: &str,
    ) -> JournalLine {
        JournalLine {
            id: LineId::new(),
            account_id: rule.payable_account,
            company: debtor.to_string(),
            currency: functional_currency.to_string(),
            entered_dr: Decimal::ZERO,
            entered_cr: amount,
            rate: Decimal::ONE,
            accounted_dr: Decimal::ZERO,
            accounted_cr: amount,
            description: Some(format!("Due to {creditor}")),
            source: LineSource::Intercompany,
        }
    }

    /// Debit on the receivable account, tagged to the creditor company.
    fn due_from_line(
        rule: &IntercompanyRule,
        debtor: &str,
        creditor: &str,
        amount: Decimal,
        functional_currency: &str,
    ) -> JournalLine {
        JournalLine {
            id: LineId::new(),
            account_id: rule.receivable_account,
            company: creditor.to_string(),
            currency: functional_currency.to_string(),
            entered_dr: amount,
            entered_cr: Decimal::ZERO,
            rate: Decimal::ONE,
            accounted_dr: amount,
            accounted_cr: Decimal::ZERO,
            description: Some(format!("Due from {debtor}")),
            source: LineSource::Intercompany,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use tally_shared::types::{AccountId, LedgerId};

    const EPSILON: Decimal = Decimal::from_parts(5, 0, 0, false, 3);

    fn line(company: &str, dr: Decimal, cr: Decimal) -> JournalLine {
        JournalLine {
            id: LineId::new(),
            account_id: AccountId::new(),
            company: company.into(),
            currency: "USD".into(),
            entered_dr: dr,
            entered_cr: cr,
            rate: Decimal::ONE,
            accounted_dr: dr,
            accounted_cr: cr,
            description: None,
            source: LineSource::Caller,
        }
    }

    fn rules(pairs: &[(&str, &str)]) -> HashMap<(String, String), IntercompanyRule> {
        pairs
            .iter()
            .map(|(from, to)| {
                (
                    ((*from).to_string(), (*to).to_string()),
                    IntercompanyRule::new(
                        LedgerId::new(),
                        *from,
                        *to,
                        AccountId::new(),
                        AccountId::new(),
                    ),
                )
            })
            .collect()
    }

    fn lookup(
        rules: &HashMap<(String, String), IntercompanyRule>,
    ) -> impl Fn(&str, &str) -> Option<IntercompanyRule> + '_ {
        |from, to| rules.get(&(from.to_string(), to.to_string())).cloned()
    }

    #[test]
    fn test_single_company_is_untouched() {
        let lines = vec![line("101", dec!(100), dec!(0)), line("101", dec!(0), dec!(100))];
        let rules = rules(&[]);
        let synthesized =
            IntercompanyBalancer::balance(&lines, "USD", EPSILON, lookup(&rules)).unwrap();
        assert!(synthesized.is_empty());
    }

    #[test]
    fn test_two_company_pairing() {
        let lines = vec![line("101", dec!(1000), dec!(0)), line("102", dec!(0), dec!(1000))];
        let rules = rules(&[("101", "102")]);
        let synthesized =
            IntercompanyBalancer::balance(&lines, "USD", EPSILON, lookup(&rules)).unwrap();

        assert_eq!(synthesized.len(), 2);
        let due_to = &synthesized[0];
        assert_eq!(due_to.company, "101");
        assert_eq!(due_to.accounted_cr, dec!(1000));
        assert_eq!(due_to.description.as_deref(), Some("Due to 102"));
        assert_eq!(due_to.source, LineSource::Intercompany);

        let due_from = &synthesized[1];
        assert_eq!(due_from.company, "102");
        assert_eq!(due_from.accounted_dr, dec!(1000));
        assert_eq!(due_from.description.as_deref(), Some("Due from 101"));

        // Combined set nets to zero per company.
        let mut combined = lines;
        combined.extend(synthesized);
        for net in IntercompanyBalancer::company_nets(&combined).values() {
            assert_eq!(*net, Decimal::ZERO);
        }
    }

    #[test]
    fn test_missing_rule_aborts_whole_balancing() {
        let lines = vec![line("101", dec!(1000), dec!(0)), line("102", dec!(0), dec!(1000))];
        let rules = rules(&[("102", "101")]); // only the reverse direction
        let result = IntercompanyBalancer::balance(&lines, "USD", EPSILON, lookup(&rules));
        assert!(matches!(
            result,
            Err(IntercompanyError::RuleMissing { ref from, ref to }) if from == "101" && to == "102"
        ));
    }

    #[test]
    fn test_three_company_pairwise_reduction() {
        // 101 is debit-heavy by 100; 102 and 103 are credit-heavy by 60/40.
        let lines = vec![
            line("101", dec!(100), dec!(0)),
            line("102", dec!(0), dec!(60)),
            line("103", dec!(0), dec!(40)),
        ];
        let rules = rules(&[("101", "102"), ("101", "103")]);
        let synthesized =
            IntercompanyBalancer::balance(&lines, "USD", EPSILON, lookup(&rules)).unwrap();

        // Two pairings, two lines each.
        assert_eq!(synthesized.len(), 4);
        assert_eq!(synthesized[0].accounted_cr, dec!(60));
        assert_eq!(synthesized[2].accounted_cr, dec!(40));

        let mut combined = lines;
        combined.extend(synthesized);
        for net in IntercompanyBalancer::company_nets(&combined).values() {
            assert_eq!(*net, Decimal::ZERO);
        }
    }

    #[test]
    fn test_debtor_order_is_ascending() {
        // Two debtors against one creditor; 101 pairs before 102.
        let lines = vec![
            line("102", dec!(30), dec!(0)),
            line("101", dec!(70), dec!(0)),
            line("103", dec!(0), dec!(100)),
        ];
        let rules = rules(&[("101", "103"), ("102", "103")]);
        let synthesized =
            IntercompanyBalancer::balance(&lines, "USD", EPSILON, lookup(&rules)).unwrap();

        assert_eq!(synthesized.len(), 4);
        assert_eq!(synthesized[0].company, "101");
        assert_eq!(synthesized[0].accounted_cr, dec!(70));
        assert_eq!(synthesized[2].company, "102");
        assert_eq!(synthesized[2].accounted_cr, dec!(30));
    }

    #[test]
    fn test_net_within_epsilon_is_ignored() {
        // 103's rounding residue is within epsilon and needs no rule.
        let lines = vec![
            line("101", dec!(100), dec!(0)),
            line("102", dec!(0), dec!(100)),
            line("103", dec!(0.004), dec!(0)),
        ];
        let rules = rules(&[("101", "102")]);
        let synthesized =
            IntercompanyBalancer::balance(&lines, "USD", EPSILON, lookup(&rules)).unwrap();
        assert_eq!(synthesized.len(), 2);

        let mut combined = lines;
        combined.extend(synthesized);
        for net in IntercompanyBalancer::company_nets(&combined).values() {
            assert!(net.abs() <= EPSILON);
        }
    }
}
