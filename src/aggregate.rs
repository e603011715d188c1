//! Per-CPF reports over admitted entries.
//!
//! Every function here is a pure pass over a slice of entries that have
//! already been through [`crate::validator::admit`]. Inputs are never
//! modified and each call recomputes from scratch.

use crate::amount::Amount;
use crate::entry::Entry;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

/// Number of CPFs returned by the ranking reports unless told otherwise.
pub const DEFAULT_TOP_LIMIT: usize = 3;

/// Sum of all entry values for one CPF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Balance {
    pub cpf: String,
    pub balance: Amount,
}

/// Average entry value for one CPF, truncated toward zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AverageRanking {
    pub cpf: String,
    pub average: i64,
}

/// Smallest and largest entry for one CPF.
///
/// Both sides are the same entry when the CPF has a single entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extremes {
    pub min: Entry,
    pub max: Entry,
}

impl Extremes {
    /// Returns the pair as `[min, max]`.
    pub fn into_vec(self) -> Vec<Entry> {
        vec![self.min, self.max]
    }
}

/// Running totals for one CPF.
#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    sum: Amount,
    count: usize,
}

impl Tally {
    /// Exact `sum / count`. Every tally holds at least one entry.
    fn average(&self) -> Decimal {
        self.sum.as_decimal() / Decimal::from(self.count as u64)
    }
}

/// Drops the fractional part, so -2.7 becomes -2 rather than -3.
fn truncate_toward_zero(value: Decimal) -> i64 {
    let whole = value.trunc();
    whole.to_i64().unwrap_or(if whole.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Groups entries by CPF in first-seen order.
fn tally_by_cpf(entries: &[Entry]) -> Vec<(&str, Tally)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut tallies: Vec<(&str, Tally)> = Vec::new();

    for entry in entries {
        let slot = *index.entry(entry.cpf.as_str()).or_insert_with(|| {
            tallies.push((entry.cpf.as_str(), Tally::default()));
            tallies.len() - 1
        });
        let tally = &mut tallies[slot].1;
        tally.sum += entry.value;
        tally.count += 1;
    }

    tallies
}

/// Returns one balance per CPF, in the order CPFs first appear in `entries`.
pub fn balances_by_account(entries: &[Entry]) -> Vec<Balance> {
    tally_by_cpf(entries)
        .into_iter()
        .map(|(cpf, tally)| Balance {
            cpf: cpf.to_string(),
            balance: tally.sum,
        })
        .collect()
}

/// Returns the smallest and largest entry for `cpf`, or `None` if it has none.
///
/// Among equal values the earliest entry is the minimum and the latest is
/// the maximum, matching the ends of a stable ascending sort.
pub fn extremes_for_cpf(cpf: &str, entries: &[Entry]) -> Option<Extremes> {
    let mut matching = entries.iter().filter(|e| e.cpf == cpf);
    let first = matching.next()?;

    let (min, max) = matching.fold((first, first), |(min, max), e| {
        (
            if e.value < min.value { e } else { min },
            if e.value >= max.value { e } else { max },
        )
    });

    Some(Extremes {
        min: min.clone(),
        max: max.clone(),
    })
}

/// Returns up to `limit` CPFs with the highest balances, highest first.
///
/// Equal balances keep first-seen order.
pub fn top_balances(entries: &[Entry], limit: usize) -> Vec<Balance> {
    let mut balances = balances_by_account(entries);
    balances.sort_by(|a, b| b.balance.cmp(&a.balance));
    balances.truncate(limit);
    balances
}

/// Returns up to `limit` CPFs with the highest average entry value, highest first.
///
/// Ranking uses the exact average; the reported `average` is truncated toward
/// zero afterwards, so -2.7 is reported as -2. Equal averages keep first-seen
/// order.
pub fn top_averages(entries: &[Entry], limit: usize) -> Vec<AverageRanking> {
    let mut averages: Vec<(&str, Decimal)> = tally_by_cpf(entries)
        .into_iter()
        .map(|(cpf, tally)| (cpf, tally.average()))
        .collect();

    averages.sort_by(|a, b| b.1.cmp(&a.1));

    averages
        .into_iter()
        .take(limit)
        .map(|(cpf, average)| AverageRanking {
            cpf: cpf.to_string(),
            average: truncate_toward_zero(average),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    const A: &str = "52998224725";
    const B: &str = "11144477735";
    const C: &str = "12345678909";
    const D: &str = "98765432100";

    fn amount(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    fn entry(cpf: &str, value: &str) -> Entry {
        Entry::new(cpf, Amount::from_str(value).unwrap())
    }

    #[test]
    fn test_balances_first_seen_order() {
        let entries = vec![entry(A, "100"), entry(A, "-50"), entry(B, "10")];

        let balances = balances_by_account(&entries);
        assert_eq!(
            balances,
            vec![
                Balance {
                    cpf: A.to_string(),
                    balance: amount("50"),
                },
                Balance {
                    cpf: B.to_string(),
                    balance: amount("10"),
                },
            ]
        );
    }

    #[test]
    fn test_balances_order_follows_first_appearance() {
        let entries = vec![entry(C, "1"), entry(A, "2"), entry(C, "3"), entry(B, "4")];

        let cpfs: Vec<_> = balances_by_account(&entries)
            .into_iter()
            .map(|b| b.cpf)
            .collect();
        assert_eq!(cpfs, vec![C, A, B]);
    }

    #[test]
    fn test_balances_empty() {
        assert!(balances_by_account(&[]).is_empty());
    }

    #[test]
    fn test_extremes_no_match() {
        let entries = vec![entry(A, "100")];
        assert_eq!(extremes_for_cpf(B, &entries), None);
        assert_eq!(extremes_for_cpf(A, &[]), None);
    }

    #[test]
    fn test_extremes_single_match() {
        let e = entry(A, "100");
        let entries = vec![e.clone(), entry(B, "5")];

        let extremes = extremes_for_cpf(A, &entries).unwrap();
        assert_eq!(extremes.into_vec(), vec![e.clone(), e]);
    }

    #[test]
    fn test_extremes_multiple_matches() {
        let entries = vec![
            entry(A, "100"),
            entry(B, "-2000"),
            entry(A, "-15.5"),
            entry(A, "300"),
            entry(A, "7"),
        ];

        let extremes = extremes_for_cpf(A, &entries).unwrap();
        assert_eq!(extremes.min, entry(A, "-15.5"));
        assert_eq!(extremes.max, entry(A, "300"));
    }

    #[test]
    fn test_extremes_ties_follow_stable_sort() {
        // Same numeric value, distinguishable by scale.
        let entries = vec![entry(A, "1.0"), entry(A, "1.00"), entry(A, "1.000")];

        let extremes = extremes_for_cpf(A, &entries).unwrap();
        assert_eq!(extremes.min.value.as_decimal().scale(), 1);
        assert_eq!(extremes.max.value.as_decimal().scale(), 3);
    }

    #[test]
    fn test_top_balances_descending_and_limited() {
        let entries = vec![
            entry(A, "10"),
            entry(B, "400"),
            entry(C, "-5"),
            entry(D, "50"),
            entry(A, "1000"),
        ];

        let top = top_balances(&entries, DEFAULT_TOP_LIMIT);
        let got: Vec<_> = top.iter().map(|b| (b.cpf.as_str(), b.balance)).collect();
        assert_eq!(
            got,
            vec![
                (A, amount("1010")),
                (B, amount("400")),
                (D, amount("50")),
            ]
        );
    }

    #[test]
    fn test_top_balances_fewer_cpfs_than_limit() {
        let entries = vec![entry(A, "10"), entry(B, "20"), entry(A, "1")];
        let top = top_balances(&entries, DEFAULT_TOP_LIMIT);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].cpf, B);
    }

    #[test]
    fn test_top_balances_ties_keep_first_seen_order() {
        let entries = vec![entry(C, "5"), entry(A, "5"), entry(B, "5")];
        let cpfs: Vec<_> = top_balances(&entries, 2).into_iter().map(|b| b.cpf).collect();
        assert_eq!(cpfs, vec![C, A]);
    }

    #[test]
    fn test_top_averages_truncates_toward_zero() {
        let entries = vec![entry(A, "-2"), entry(A, "-3"), entry(A, "-3")];

        let top = top_averages(&entries, DEFAULT_TOP_LIMIT);
        assert_eq!(
            top,
            vec![AverageRanking {
                cpf: A.to_string(),
                average: -2,
            }]
        );
    }

    #[test]
    fn test_top_averages_positive_truncation() {
        let entries = vec![entry(A, "10"), entry(A, "0"), entry(A, "0")];
        assert_eq!(top_averages(&entries, DEFAULT_TOP_LIMIT)[0].average, 3);
    }

    #[test]
    fn test_top_averages_ranks_on_exact_average() {
        // 10.9 and 10.1 both report as 10 but keep their exact order.
        let entries = vec![entry(A, "10.1"), entry(B, "10.9"), entry(C, "1")];

        let top = top_averages(&entries, DEFAULT_TOP_LIMIT);
        let got: Vec<_> = top.iter().map(|r| (r.cpf.as_str(), r.average)).collect();
        assert_eq!(got, vec![(B, 10), (A, 10), (C, 1)]);
    }

    #[test]
    fn test_top_averages_limit() {
        let entries = vec![
            entry(A, "100"),
            entry(A, "300"),
            entry(B, "50"),
            entry(C, "500"),
            entry(D, "1"),
        ];

        let top = top_averages(&entries, DEFAULT_TOP_LIMIT);
        let got: Vec<_> = top.iter().map(|r| (r.cpf.as_str(), r.average)).collect();
        assert_eq!(got, vec![(C, 500), (A, 200), (B, 50)]);
    }

    #[test]
    fn test_inputs_are_not_modified() {
        let entries = vec![entry(B, "3"), entry(A, "1"), entry(A, "2")];
        let before = entries.clone();

        let _ = balances_by_account(&entries);
        let _ = extremes_for_cpf(A, &entries);
        let _ = top_balances(&entries, DEFAULT_TOP_LIMIT);
        let _ = top_averages(&entries, DEFAULT_TOP_LIMIT);

        assert_eq!(entries, before);
    }

    fn arb_entries() -> impl Strategy<Value = Vec<Entry>> {
        let cpfs = prop::sample::select(vec![A, B, C, D, "39053344705"]);
        prop::collection::vec((cpfs, -200_000i64..=1_500_000i64), 0..40).prop_map(|rows| {
            rows.into_iter()
                .map(|(cpf, cents)| Entry::new(cpf, Amount::new(Decimal::new(cents, 2))))
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        #[test]
        fn reports_are_idempotent(entries in arb_entries()) {
            prop_assert_eq!(balances_by_account(&entries), balances_by_account(&entries));
            prop_assert_eq!(extremes_for_cpf(A, &entries), extremes_for_cpf(A, &entries));
            prop_assert_eq!(
                top_balances(&entries, DEFAULT_TOP_LIMIT),
                top_balances(&entries, DEFAULT_TOP_LIMIT)
            );
            prop_assert_eq!(
                top_averages(&entries, DEFAULT_TOP_LIMIT),
                top_averages(&entries, DEFAULT_TOP_LIMIT)
            );
        }

        #[test]
        fn rankings_hold_min_of_limit_and_distinct_cpfs(entries in arb_entries()) {
            let distinct = balances_by_account(&entries).len();
            let expected = distinct.min(DEFAULT_TOP_LIMIT);

            prop_assert_eq!(top_balances(&entries, DEFAULT_TOP_LIMIT).len(), expected);
            prop_assert_eq!(top_averages(&entries, DEFAULT_TOP_LIMIT).len(), expected);
        }

        #[test]
        fn balances_conserve_total(entries in arb_entries()) {
            let total: Amount = entries.iter().map(|e| e.value).sum();
            let balanced: Amount = balances_by_account(&entries).iter().map(|b| b.balance).sum();
            prop_assert_eq!(total, balanced);
        }

        #[test]
        fn top_balances_are_descending(entries in arb_entries()) {
            let top = top_balances(&entries, DEFAULT_TOP_LIMIT);
            prop_assert!(top.windows(2).all(|w| w[0].balance >= w[1].balance));
        }

        #[test]
        fn extremes_bound_every_matching_entry(entries in arb_entries()) {
            match extremes_for_cpf(A, &entries) {
                None => prop_assert!(entries.iter().all(|e| e.cpf != A)),
                Some(x) => {
                    for e in entries.iter().filter(|e| e.cpf == A) {
                        prop_assert!(x.min.value <= e.value && e.value <= x.max.value);
                    }
                }
            }
        }
    }
}
