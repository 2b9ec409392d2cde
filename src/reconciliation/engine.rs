//! Reconciliation engine: normalizes both tables and classifies every bank
//! transaction against a shared invoice pool

use tracing::{debug, info};

use crate::config::ReconConfig;
use crate::normalize::{normalize_invoices, normalize_transactions, RawRow};
use crate::reconciliation::cascade::RuleCascade;
use crate::reconciliation::report::{ReconciliationReport, ReconciliationSummary};
use crate::reconciliation::InvoicePool;
use crate::traits::*;
use crate::types::*;

/// Runs the rule cascade over a bank export
pub struct ReconciliationEngine {
    config: ReconConfig,
    cascade: RuleCascade,
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self {
            config: ReconConfig::default(),
            cascade: RuleCascade::default(),
        }
    }
}

impl ReconciliationEngine {
    /// Create an engine with a validated configuration
    pub fn new(config: ReconConfig) -> ReconResult<Self> {
        config.validate()?;
        let cascade = RuleCascade::from_config(&config);
        Ok(Self { config, cascade })
    }

    /// Create an engine around a custom cascade
    pub fn with_cascade(config: ReconConfig, cascade: RuleCascade) -> ReconResult<Self> {
        config.validate()?;
        Ok(Self { config, cascade })
    }

    /// Replace the scoring policy of the cascade
    pub fn with_confidence_model(mut self, confidence_model: Box<dyn ConfidenceModel>) -> Self {
        self.cascade = self.cascade.with_confidence_model(confidence_model);
        self
    }

    pub fn config(&self) -> &ReconConfig {
        &self.config
    }

    pub fn cascade(&self) -> &RuleCascade {
        &self.cascade
    }

    /// Classify every bank row against the invoice rows.
    ///
    /// Returns one transaction per bank data row, in input order. Both
    /// tables start with a header row.
    pub fn reconcile(&self, bank_rows: &[RawRow], invoice_rows: &[RawRow]) -> Vec<Transaction> {
        let transactions = normalize_transactions(bank_rows);
        let mut pool = InvoicePool::new(normalize_invoices(invoice_rows));
        self.reconcile_pool(transactions, &mut pool)
    }

    /// Same as [`reconcile`](Self::reconcile), also returning the final
    /// invoice states and a summary
    pub fn run(&self, bank_rows: &[RawRow], invoice_rows: &[RawRow]) -> ReconciliationReport {
        let transactions = normalize_transactions(bank_rows);
        let mut pool = InvoicePool::new(normalize_invoices(invoice_rows));
        let transactions = self.reconcile_pool(transactions, &mut pool);
        let report = ReconciliationReport::new(transactions, pool.into_invoices());

        info!(
            run_id = %report.run_id,
            automatic_rate = report.summary.automatic_rate(),
            "Reconciliation report ready"
        );
        report
    }

    /// Classify already normalized transactions in order, consuming invoices
    /// from `pool` as automatic matches settle them
    pub fn reconcile_pool(
        &self,
        transactions: Vec<Transaction>,
        pool: &mut InvoicePool,
    ) -> Vec<Transaction> {
        info!(
            transactions = transactions.len(),
            invoices = pool.len(),
            pending = pool.pending_count(),
            "Starting reconciliation"
        );

        let classified: Vec<Transaction> = transactions
            .into_iter()
            .map(|transaction| {
                let verdict = self.cascade.evaluate(&transaction, pool);
                if verdict.consumes_invoices() {
                    let committed = pool.commit_consumption(&verdict.invoice_indices);
                    debug!(
                        transaction = %transaction.id,
                        committed,
                        "Invoices consumed"
                    );
                }
                transaction.classify(verdict.result)
            })
            .collect();

        let summary = ReconciliationSummary::from_results(&classified, pool.invoices());
        info!(
            total = summary.total_transactions,
            matched = summary.matched,
            partial = summary.partial,
            unmatched = summary.unmatched,
            open_invoices = summary.open_invoices,
            "Reconciliation finished"
        );

        classified
    }
}

/// Reconcile with the default configuration
pub fn reconcile(bank_rows: &[RawRow], invoice_rows: &[RawRow]) -> Vec<Transaction> {
    ReconciliationEngine::default().reconcile(bank_rows, invoice_rows)
}
