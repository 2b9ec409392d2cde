//! The built-in match strategies, one per cascade rule

use bigdecimal::BigDecimal;

use crate::config::{ReconConfig, SemanticConfig};
use crate::reconciliation::grouping::GroupSearch;
use crate::reconciliation::InvoicePool;
use crate::traits::*;
use crate::types::*;
use crate::utils::text::{abbreviates, tokenize, NameMatcher};

/// R1: same amount and the concept names the client or quotes the invoice id
#[derive(Debug, Clone, Default)]
pub struct ExactMatch {
    matcher: NameMatcher,
}

impl ExactMatch {
    pub fn new(matcher: NameMatcher) -> Self {
        Self { matcher }
    }
}

impl MatchStrategy for ExactMatch {
    fn rule(&self) -> RuleKind {
        RuleKind::Exact
    }

    fn find(&self, transaction: &Transaction, pool: &InvoicePool) -> Option<Vec<usize>> {
        pool.pending()
            .find(|(_, invoice)| {
                invoice.amount == transaction.amount
                    && (self.matcher.contains_name(&transaction.concept, &invoice.client_name)
                        || self.matcher.contains_reference(&transaction.concept, &invoice.id))
            })
            .map(|(index, _)| vec![index])
    }
}

/// R2: several pending invoices that add up to the payment
#[derive(Debug, Clone)]
pub struct GroupedSumMatch {
    search: GroupSearch,
}

impl GroupedSumMatch {
    /// Groups of two up to `max_group_size` invoices
    pub fn new(max_group_size: usize, tolerance: BigDecimal) -> Self {
        Self {
            search: GroupSearch::new(2, max_group_size, tolerance),
        }
    }

    pub fn with_search(search: GroupSearch) -> Self {
        Self { search }
    }
}

impl Default for GroupedSumMatch {
    fn default() -> Self {
        let config = ReconConfig::default();
        Self::new(config.max_group_size, config.group_tolerance)
    }
}

impl MatchStrategy for GroupedSumMatch {
    fn rule(&self) -> RuleKind {
        RuleKind::GroupedSum
    }

    fn find(&self, transaction: &Transaction, pool: &InvoicePool) -> Option<Vec<usize>> {
        let (positions, amounts): (Vec<usize>, Vec<&BigDecimal>) = pool
            .pending()
            .map(|(index, invoice)| (index, &invoice.amount))
            .unzip();

        self.search
            .find_indices(&transaction.amount, &amounts)
            .map(|found| found.into_iter().map(|i| positions[i]).collect())
    }
}

/// R3: amount within the bank fee tolerance and the concept names the client.
/// The closest invoice wins; ties go to pool order.
#[derive(Debug, Clone)]
pub struct ToleranceMatch {
    tolerance: BigDecimal,
    matcher: NameMatcher,
}

impl ToleranceMatch {
    pub fn new(tolerance: BigDecimal, matcher: NameMatcher) -> Self {
        Self { tolerance, matcher }
    }
}

impl Default for ToleranceMatch {
    fn default() -> Self {
        Self::new(ReconConfig::default().tolerance_amount, NameMatcher::default())
    }
}

impl MatchStrategy for ToleranceMatch {
    fn rule(&self) -> RuleKind {
        RuleKind::Tolerance
    }

    fn find(&self, transaction: &Transaction, pool: &InvoicePool) -> Option<Vec<usize>> {
        let mut best: Option<(usize, BigDecimal)> = None;

        for (index, invoice) in pool.pending() {
            let gap = (&invoice.amount - &transaction.amount).abs();
            if gap > self.tolerance
                || !self.matcher.contains_name(&transaction.concept, &invoice.client_name)
            {
                continue;
            }
            if best.as_ref().map_or(true, |(_, best_gap)| gap < *best_gap) {
                best = Some((index, gap));
            }
        }

        best.map(|(index, _)| vec![index])
    }
}

/// R4: same amount and the concept carries an alias or an abbreviation of the
/// client name ("DIST NORTE" for "Distribuciones Norte SA")
#[derive(Debug, Clone)]
pub struct SemanticMatch {
    min_token_len: usize,
    /// Lowercased client name -> lowercased aliases
    aliases: Vec<(String, Vec<String>)>,
}

impl SemanticMatch {
    pub fn new(config: &SemanticConfig) -> Self {
        let aliases = config
            .aliases
            .iter()
            .map(|(client, aliases)| {
                (
                    client.trim().to_lowercase(),
                    aliases.iter().map(|a| a.trim().to_lowercase()).collect(),
                )
            })
            .collect();

        Self {
            min_token_len: config.min_token_len,
            aliases,
        }
    }

    /// Check whether `concept` carries a partial token of `client_name`
    pub fn is_anchored(&self, concept: &str, client_name: &str) -> bool {
        let client = client_name.trim().to_lowercase();
        if client.is_empty() {
            return false;
        }

        let lowered = concept.to_lowercase();
        let alias_hit = self
            .aliases
            .iter()
            .filter(|(name, _)| *name == client)
            .flat_map(|(_, aliases)| aliases.iter())
            .any(|alias| lowered.contains(alias.as_str()));

        alias_hit || abbreviates(&tokenize(concept, false), &client, self.min_token_len)
    }
}

impl Default for SemanticMatch {
    fn default() -> Self {
        Self::new(&SemanticConfig::default())
    }
}

impl MatchStrategy for SemanticMatch {
    fn rule(&self) -> RuleKind {
        RuleKind::Semantic
    }

    fn find(&self, transaction: &Transaction, pool: &InvoicePool) -> Option<Vec<usize>> {
        pool.pending()
            .find(|(_, invoice)| {
                invoice.amount == transaction.amount
                    && self.is_anchored(&transaction.concept, &invoice.client_name)
            })
            .map(|(index, _)| vec![index])
    }
}

/// Pending invoices sharing the transaction amount, offered to the reviewer
/// when no rule applies
pub fn review_candidates(transaction: &Transaction, pool: &InvoicePool) -> Vec<usize> {
    pool.pending()
        .filter(|(_, invoice)| invoice.amount == transaction.amount)
        .map(|(index, _)| index)
        .collect()
}
