//! Traits for swapping matching rules and scoring policies

use serde::{Deserialize, Serialize};

use crate::reconciliation::InvoicePool;
use crate::types::*;

/// Confidence and rationale attached to a decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// 0-100
    pub confidence: u8,
    pub notes: Option<String>,
}

impl Score {
    pub fn new(confidence: u8, notes: impl Into<String>) -> Self {
        Self {
            confidence,
            notes: Some(notes.into()),
        }
    }
}

/// Scoring policy used by the rule cascade
///
/// The cascade only relies on the returned [`Score`]; how it is computed is up
/// to the implementation, so a trained classifier can replace the built-in
/// table without touching the cascade. The cascade still forces automatic
/// results to 100, manual results to 0, and suggestions into 1..=99.
pub trait ConfidenceModel: Send + Sync {
    /// Score the winning `rule` for `transaction`.
    ///
    /// `invoices` are the invoices the rule selected, in pool order. For
    /// [`RuleKind::NoMatch`] they are the pending invoices sharing the
    /// transaction amount (possibly none).
    fn score(&self, rule: RuleKind, transaction: &Transaction, invoices: &[Invoice]) -> Score;
}

/// One step of the rule cascade
pub trait MatchStrategy: Send + Sync {
    /// Rule reported when this strategy wins
    fn rule(&self) -> RuleKind;

    /// Positions in `pool` of the invoices this strategy selects for
    /// `transaction`, in pool order, or `None` if it does not apply.
    /// Strategies only read the pool; consumption is committed by the engine.
    fn find(&self, transaction: &Transaction, pool: &InvoicePool) -> Option<Vec<usize>>;
}
