//! Rule cascade: runs the match strategies in priority order

use tracing::{debug, warn};

use crate::config::ReconConfig;
use crate::reconciliation::confidence::{enforce_band, TableConfidenceModel};
use crate::reconciliation::grouping::GroupSearch;
use crate::reconciliation::strategies::*;
use crate::reconciliation::InvoicePool;
use crate::traits::*;
use crate::types::*;
use crate::utils::text::NameMatcher;

/// Outcome of running the cascade for one transaction
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    /// Winning rule, [`RuleKind::NoMatch`] when nothing applied
    pub rule: RuleKind,
    /// Pool positions of the invoices in `result.related_invoices`
    pub invoice_indices: Vec<usize>,
    pub result: MatchResult,
}

impl Verdict {
    /// Check if committing this verdict consumes its invoices. Only automatic
    /// matches do; suggestions stay advisory.
    pub fn consumes_invoices(&self) -> bool {
        self.result.classification == Classification::Automatic
    }
}

/// Ordered strategies plus the scoring policy. The first strategy that finds
/// invoices wins.
pub struct RuleCascade {
    strategies: Vec<Box<dyn MatchStrategy>>,
    confidence_model: Box<dyn ConfidenceModel>,
}

impl Default for RuleCascade {
    fn default() -> Self {
        Self::from_config(&ReconConfig::default())
    }
}

impl RuleCascade {
    /// Create a cascade with custom strategies, evaluated in the given order
    pub fn new(
        strategies: Vec<Box<dyn MatchStrategy>>,
        confidence_model: Box<dyn ConfidenceModel>,
    ) -> Self {
        Self {
            strategies,
            confidence_model,
        }
    }

    /// Exact, grouped-sum, tolerance, then semantic, scored by the table model
    pub fn from_config(config: &ReconConfig) -> Self {
        Self::new(
            Self::standard_strategies(config),
            Box::new(TableConfidenceModel::new(config.confidence)),
        )
    }

    /// The built-in strategies in priority order
    pub fn standard_strategies(config: &ReconConfig) -> Vec<Box<dyn MatchStrategy>> {
        let exact_matcher = NameMatcher::new(
            config.name_matching.clone(),
            config.exact_match_case_sensitive,
        );
        // Case sensitivity is an exact-match option only
        let tolerance_matcher = NameMatcher::new(config.name_matching.clone(), false);

        vec![
            Box::new(ExactMatch::new(exact_matcher)),
            Box::new(GroupedSumMatch::with_search(
                GroupSearch::new(2, config.max_group_size, config.group_tolerance.clone())
                    .with_budget(config.group_search_budget),
            )),
            Box::new(ToleranceMatch::new(
                config.tolerance_amount.clone(),
                tolerance_matcher,
            )),
            Box::new(SemanticMatch::new(&config.semantic)),
        ]
    }

    /// Replace the scoring policy
    pub fn with_confidence_model(mut self, confidence_model: Box<dyn ConfidenceModel>) -> Self {
        self.confidence_model = confidence_model;
        self
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> Vec<RuleKind> {
        self.strategies.iter().map(|s| s.rule()).collect()
    }

    /// Classify a transaction against the pool without touching the pool
    pub fn classify(&self, transaction: &Transaction, pool: &InvoicePool) -> MatchResult {
        self.evaluate(transaction, pool).result
    }

    /// Run the cascade and keep track of which pool positions were selected
    pub fn evaluate(&self, transaction: &Transaction, pool: &InvoicePool) -> Verdict {
        let hit = self.strategies.iter().find_map(|strategy| {
            strategy
                .find(transaction, pool)
                .filter(|indices| !indices.is_empty())
                .map(|indices| (strategy.rule(), indices))
        });

        let (rule, invoice_indices) = match hit {
            Some(hit) => hit,
            None => (RuleKind::NoMatch, review_candidates(transaction, pool)),
        };

        let related_invoices = pool.select(&invoice_indices);
        let score = self
            .confidence_model
            .score(rule, transaction, &related_invoices);

        let classification = rule.classification();
        let confidence = enforce_band(classification, score.confidence);
        if confidence != score.confidence {
            warn!(
                transaction = %transaction.id,
                rule = ?rule,
                reported = score.confidence,
                confidence,
                "Confidence outside the band of its classification, clamped"
            );
        }

        debug!(
            transaction = %transaction.id,
            rule = ?rule,
            confidence,
            invoices = invoice_indices.len(),
            "Transaction classified"
        );

        Verdict {
            rule,
            invoice_indices,
            result: MatchResult {
                classification,
                rule_name: rule.name().map(str::to_string),
                rule_label: rule.label().map(str::to_string),
                confidence,
                related_invoices,
                notes: score.notes,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn tx(concept: &str, amount: &str) -> Transaction {
        Transaction::new("TX".to_string(), None, concept.to_string(), dec(amount), "EUR".to_string())
    }

    fn pool() -> InvoicePool {
        InvoicePool::new(vec![
            Invoice::new("FAC-2401".into(), None, "Supermercados del Sur".into(), dec("1780.50")),
            Invoice::new("FAC-2402".into(), None, "Supermercados del Sur".into(), dec("2000.00")),
            Invoice::new("FAC-2403".into(), None, "Distribuciones Norte SA".into(), dec("1250.00")),
        ])
    }

    /// Scores everything 100, ignoring bands
    struct Overconfident;

    impl ConfidenceModel for Overconfident {
        fn score(&self, _rule: RuleKind, _tx: &Transaction, _invoices: &[Invoice]) -> Score {
            Score {
                confidence: 100,
                notes: None,
            }
        }
    }

    /// Claims the last pending invoice for every transaction
    struct LastPending;

    impl MatchStrategy for LastPending {
        fn rule(&self) -> RuleKind {
            RuleKind::Semantic
        }

        fn find(&self, _transaction: &Transaction, pool: &InvoicePool) -> Option<Vec<usize>> {
            pool.pending().last().map(|(i, _)| vec![i])
        }
    }

    #[test]
    fn test_standard_order() {
        assert_eq!(
            RuleCascade::default().rules(),
            vec![
                RuleKind::Exact,
                RuleKind::GroupedSum,
                RuleKind::Tolerance,
                RuleKind::Semantic
            ]
        );
    }

    #[test]
    fn test_exact_wins_over_fuzzier_rules() {
        // Matches exact, tolerance (gap 0) and semantic at once
        let verdict = RuleCascade::default().evaluate(&tx("DISTRIBUCIONES NORTE SA", "1250"), &pool());
        assert_eq!(verdict.rule, RuleKind::Exact);
        assert_eq!(verdict.invoice_indices, vec![2]);
        assert!(verdict.consumes_invoices());
        assert_eq!(verdict.result.rule_name.as_deref(), Some("exact"));
        assert_eq!(verdict.result.confidence, 100);
    }

    #[test]
    fn test_no_match_lists_review_candidates() {
        let result = RuleCascade::default().classify(&tx("ABONO", "1250.00"), &pool());
        assert_eq!(result.classification, Classification::Manual);
        assert_eq!(result.confidence, 0);
        assert_eq!(result.rule_name, None);
        assert_eq!(result.invoice_ids(), vec!["FAC-2403"]);
        assert!(result.notes.unwrap().starts_with("Requires manual investigation"));
    }

    #[test]
    fn test_suggestions_do_not_consume() {
        let verdict = RuleCascade::default().evaluate(&tx("PAGO DIST NORTE", "1250"), &pool());
        assert_eq!(verdict.rule, RuleKind::Semantic);
        assert_eq!(verdict.result.confidence, 88);
        assert!(!verdict.consumes_invoices());
    }

    #[test]
    fn test_custom_model_is_clamped_to_bands() {
        let cascade = RuleCascade::default().with_confidence_model(Box::new(Overconfident));
        assert_eq!(cascade.classify(&tx("PAGO DIST NORTE", "1250"), &pool()).confidence, 99);
        assert_eq!(cascade.classify(&tx("ABONO", "1"), &pool()).confidence, 0);
    }

    #[test]
    fn test_case_sensitivity_only_affects_exact_rule() {
        let config = ReconConfig {
            exact_match_case_sensitive: true,
            ..ReconConfig::default()
        };
        let cascade = RuleCascade::from_config(&config);
        let pool = InvoicePool::new(vec![Invoice::new(
            "FAC-9".into(),
            None,
            "Talleres Unidos SL".into(),
            dec("900"),
        )]);

        // Case differs, so the exact rule passes and tolerance still applies
        let verdict = cascade.evaluate(&tx("TRANSF TALLERES UNIDOS SL", "890"), &pool);
        assert_eq!(verdict.rule, RuleKind::Tolerance);

        let verdict = cascade.evaluate(&tx("TRANSF TALLERES UNIDOS SL", "900"), &pool);
        assert_ne!(verdict.rule, RuleKind::Exact);
        let verdict = cascade.evaluate(&tx("TRANSF Talleres Unidos SL", "900"), &pool);
        assert_eq!(verdict.rule, RuleKind::Exact);
    }

    #[test]
    fn test_custom_strategies() {
        let cascade = RuleCascade::new(
            vec![Box::new(LastPending)],
            Box::new(TableConfidenceModel::default()),
        );
        let result = cascade.classify(&tx("ANYTHING", "1"), &pool());
        assert_eq!(result.classification, Classification::AiSuggested);
        assert_eq!(result.invoice_ids(), vec!["FAC-2403"]);

        let empty = RuleCascade::new(Vec::new(), Box::new(TableConfidenceModel::default()));
        assert_eq!(
            empty.classify(&tx("ANYTHING", "1"), &pool()).classification,
            Classification::Manual
        );
    }
}
