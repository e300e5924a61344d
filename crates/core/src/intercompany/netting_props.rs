//! Property tests for intercompany netting and pairwise reduction.

use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::{AccountId, LedgerId, LineId};

use super::balancer::IntercompanyBalancer;
use super::types::IntercompanyRule;
use crate::journal::types::{JournalLine, LineSource};

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

/// Lookup that has a rule for every ordered pair.
fn full_lookup(from: &str, to: &str) -> Option<IntercompanyRule> {
    Some(IntercompanyRule::new(
        LedgerId::new(),
        from,
        to,
        AccountId::new(),
        AccountId::new(),
    ))
}

/// Strategy: positive two-decimal amounts.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy: a balanced journal spread across up to 4 companies.
///
/// Each case is a list of (company, amount) debits plus one credit line that
/// offsets the total, so the journal always balances overall.
fn spread_strategy() -> impl Strategy<Value = Vec<JournalLine>> {
    prop::collection::vec((0usize..4, amount_strategy()), 1..8).prop_map(|debits| {
        let companies = ["101", "102", "103", "104"];
        let mut lines: Vec<JournalLine> = debits
            .iter()
            .map(|(idx, amount)| line(companies[*idx], *amount, Decimal::ZERO))
            .collect();
        let total: Decimal = debits.iter().map(|(_, amount)| *amount).sum();
        // Offsetting credit always lands on the last company.
        lines.push(line("104", Decimal::ZERO, total));
        lines
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// For any balanced journal, every company nets to zero (within epsilon)
    /// after the synthesized lines are appended.
    #[test]
    fn prop_all_companies_net_to_zero(lines in spread_strategy()) {
        let synthesized =
            IntercompanyBalancer::balance(&lines, "USD", EPSILON, full_lookup).unwrap();

        let mut combined = lines;
        combined.extend(synthesized);
        for (company, net) in IntercompanyBalancer::company_nets(&combined) {
            prop_assert!(
                net.abs() <= EPSILON,
                "company {} nets {} after balancing",
                company,
                net
            );
        }
    }

    /// Synthesized lines never change the overall journal totals: they come
    /// in equal debit/credit pairs.
    #[test]
    fn prop_synthesized_lines_are_self_balancing(lines in spread_strategy()) {
        let synthesized =
            IntercompanyBalancer::balance(&lines, "USD", EPSILON, full_lookup).unwrap();

        let debit: Decimal = synthesized.iter().map(|l| l.accounted_dr).sum();
        let credit: Decimal = synthesized.iter().map(|l| l.accounted_cr).sum();
        prop_assert_eq!(debit, credit);
        prop_assert_eq!(synthesized.len() % 2, 0);
    }

    /// Balancing is deterministic: the same lines produce the same pairings.
    #[test]
    fn prop_balancing_is_deterministic(lines in spread_strategy()) {
        let first =
            IntercompanyBalancer::balance(&lines, "USD", EPSILON, full_lookup).unwrap();
        let second =
            IntercompanyBalancer::balance(&lines, "USD", EPSILON, full_lookup).unwrap();

        prop_assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            prop_assert_eq!(&a.company, &b.company);
            prop_assert_eq!(a.accounted_dr, b.accounted_dr);
            prop_assert_eq!(a.accounted_cr, b.accounted_cr);
        }
    }

    /// A journal confined to one company is never touched.
    #[test]
    fn prop_single_company_untouched(amount in amount_strategy()) {
        let lines = vec![
            line("101", amount, Decimal::ZERO),
            line("101", Decimal::ZERO, amount),
        ];
        let synthesized =
            IntercompanyBalancer::balance(&lines, "USD", EPSILON, full_lookup).unwrap();
        prop_assert!(synthesized.is_empty());
    }
}
