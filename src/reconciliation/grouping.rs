//! Grouping solver: finds invoices whose amounts add up to a single payment

use bigdecimal::BigDecimal;
use tracing::{debug, warn};

use crate::types::*;

/// Bounded subset-sum search.
///
/// Subsets are enumerated by increasing size, then in lexicographic order of
/// candidate positions, and the first subset within `tolerance` of the target
/// wins. Identical inputs therefore always yield the same grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSearch {
    /// Smallest subset considered
    pub min_size: usize,
    /// Largest subset considered
    pub max_size: usize,
    /// Accepted distance between the subset total and the target
    pub tolerance: BigDecimal,
    /// Partial subsets visited before the search gives up
    pub budget: usize,
}

impl Default for GroupSearch {
    fn default() -> Self {
        Self {
            min_size: 1,
            max_size: 4,
            tolerance: BigDecimal::new(1.into(), 2),
            budget: 1_000_000,
        }
    }
}

/// Mutable state of one search
struct SearchState<'a> {
    candidates: Vec<(usize, &'a BigDecimal)>,
    target: &'a BigDecimal,
    lower: BigDecimal,
    upper: BigDecimal,
    steps: usize,
    budget: usize,
}

impl SearchState<'_> {
    /// Depth-first search for `remaining` more candidates starting at `start`
    fn extend(&mut self, start: usize, remaining: usize, sum: &BigDecimal, chosen: &mut Vec<usize>) -> bool {
        if remaining == 0 {
            return *sum >= self.lower && *sum <= self.upper;
        }

        let last_start = self.candidates.len() + 1 - remaining;
        for i in start..last_start {
            if self.steps >= self.budget {
                return false;
            }
            self.steps += 1;

            let next = sum + self.candidates[i].1;
            // Amounts are never negative, so an overshoot cannot come back down
            if next > self.upper {
                continue;
            }

            chosen.push(i);
            if self.extend(i + 1, remaining - 1, &next, chosen) {
                return true;
            }
            chosen.pop();
        }

        false
    }
}

impl GroupSearch {
    pub fn new(min_size: usize, max_size: usize, tolerance: BigDecimal) -> Self {
        Self {
            min_size,
            max_size,
            tolerance,
            ..Self::default()
        }
    }

    /// Limit the number of partial subsets visited
    pub fn with_budget(mut self, budget: usize) -> Self {
        self.budget = budget;
        self
    }

    /// Find positions in `amounts` whose values sum to `target`.
    ///
    /// Zero amounts never take part in a group. Returns `None` for a
    /// non-positive target, an empty pool, or when no subset fits.
    pub fn find_indices(&self, target: &BigDecimal, amounts: &[&BigDecimal]) -> Option<Vec<usize>> {
        let zero = BigDecimal::from(0);
        if *target <= zero || amounts.is_empty() {
            return None;
        }

        let upper = target + &self.tolerance;
        let candidates: Vec<(usize, &BigDecimal)> = amounts
            .iter()
            .enumerate()
            .filter(|(_, amount)| ***amount > zero && ***amount <= upper)
            .map(|(i, amount)| (i, *amount))
            .collect();

        let mut state = SearchState {
            lower: target - &self.tolerance,
            upper,
            candidates,
            target,
            steps: 0,
            budget: self.budget,
        };

        let largest = self.max_size.min(state.candidates.len());
        for size in self.min_size.max(1)..=largest {
            let mut chosen = Vec::with_capacity(size);
            if state.extend(0, size, &zero, &mut chosen) {
                debug!(target = %state.target, size, steps = state.steps, "Found invoice group");
                return Some(chosen.into_iter().map(|i| state.candidates[i].0).collect());
            }
            if state.steps >= state.budget {
                warn!(
                    target = %state.target,
                    budget = state.budget,
                    "Invoice grouping search budget exhausted"
                );
                return None;
            }
        }

        None
    }

    /// Find a subset of `candidates` whose amounts sum to `target`
    pub fn find(&self, target: &BigDecimal, candidates: &[Invoice]) -> Option<Vec<Invoice>> {
        let amounts: Vec<&BigDecimal> = candidates.iter().map(|i| &i.amount).collect();
        self.find_indices(target, &amounts)
            .map(|indices| indices.into_iter().map(|i| candidates[i].clone()).collect())
    }
}

/// Find the first non-empty subset of up to four `candidates` whose amounts
/// sum to `target` within `tolerance`
pub fn find_subset_summing(
    target: &BigDecimal,
    candidates: &[Invoice],
    tolerance: &BigDecimal,
) -> Option<Vec<Invoice>> {
    GroupSearch {
        tolerance: tolerance.clone(),
        ..GroupSearch::default()
    }
    .find(target, candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn invoices(amounts: &[&str]) -> Vec<Invoice> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, a)| Invoice::new(format!("FAC-{i}"), None, "ACME".to_string(), dec(a)))
            .collect()
    }

    fn amounts(group: &[Invoice]) -> Vec<BigDecimal> {
        group.iter().map(|i| i.amount.clone()).collect()
    }

    #[test]
    fn test_first_pair_in_enumeration_order() {
        let pool = invoices(&["60", "40", "25"]);
        let group = find_subset_summing(&dec("100"), &pool, &dec("0.01")).unwrap();
        assert_eq!(amounts(&group), vec![dec("60"), dec("40")]);
    }

    #[test]
    fn test_smaller_groups_win() {
        // 10+20+70 comes first lexicographically, but the pair 30+70 is smaller
        let pool = invoices(&["10", "20", "30", "70"]);
        let group = find_subset_summing(&dec("100"), &pool, &dec("0.01")).unwrap();
        assert_eq!(amounts(&group), vec![dec("30"), dec("70")]);
    }

    #[test]
    fn test_demo_grouping() {
        let pool = invoices(&["1250.00", "1780.50", "2000.00"]);
        let group = find_subset_summing(&dec("3780.50"), &pool, &dec("0.01")).unwrap();
        assert_eq!(group[0].id, "FAC-1");
        assert_eq!(group[1].id, "FAC-2");
    }

    #[test]
    fn test_tolerance_absorbs_rounding() {
        let pool = invoices(&["33.33", "33.33", "33.33"]);
        let group = find_subset_summing(&dec("100"), &pool, &dec("0.01")).unwrap();
        assert_eq!(group.len(), 3);
        assert!(find_subset_summing(&dec("100"), &pool, &dec("0")).is_none());
    }

    #[test]
    fn test_respects_size_bounds() {
        let pool = invoices(&["10", "20", "30", "40", "50"]);
        let search = GroupSearch::new(2, 2, dec("0"));
        assert!(search.find(&dec("150"), &pool).is_none());
        assert!(search.find(&dec("10"), &pool).is_none());
        assert_eq!(search.find(&dec("90"), &pool).unwrap().len(), 2);

        let wide = GroupSearch::new(2, 5, dec("0"));
        assert_eq!(wide.find(&dec("150"), &pool).unwrap().len(), 5);
    }

    #[test]
    fn test_edge_cases_yield_nothing() {
        let pool = invoices(&["60", "40"]);
        assert!(find_subset_summing(&dec("100"), &[], &dec("0.01")).is_none());
        assert!(find_subset_summing(&dec("0"), &pool, &dec("0.01")).is_none());
        assert!(find_subset_summing(&dec("-100"), &pool, &dec("0.01")).is_none());
        assert!(find_subset_summing(&dec("99"), &pool, &dec("0.01")).is_none());
    }

    #[test]
    fn test_zero_amounts_are_ignored() {
        let pool = invoices(&["0", "60", "0", "40"]);
        let search = GroupSearch::new(2, 4, dec("0"));
        let indices = search
            .find_indices(&dec("100"), &pool.iter().map(|i| &i.amount).collect::<Vec<_>>())
            .unwrap();
        assert_eq!(indices, vec![1, 3]);
    }

    #[test]
    fn test_deterministic() {
        let pool = invoices(&["5", "15", "10", "20", "25", "30"]);
        let first = find_subset_summing(&dec("45"), &pool, &dec("0.01")).unwrap();
        for _ in 0..5 {
            assert_eq!(find_subset_summing(&dec("45"), &pool, &dec("0.01")).unwrap(), first);
        }
        assert_eq!(amounts(&first), vec![dec("15"), dec("30")]);
    }

    #[test]
    fn test_exhausted_budget_gives_up() {
        let pool = invoices(&["1", "2", "3", "4", "5", "6", "7", "8", "9", "10"]);
        let search = GroupSearch::new(4, 4, dec("0")).with_budget(3);
        assert!(search.find(&dec("34"), &pool).is_none());
        let unbounded = GroupSearch::new(4, 4, dec("0"));
        assert_eq!(unbounded.find(&dec("34"), &pool).unwrap().len(), 4);
    }
}
