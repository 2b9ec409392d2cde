//! Run report and summary figures for review tooling

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::*;

/// Counts and amount totals of a classified run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    pub total_transactions: usize,
    pub matched: usize,
    pub partial: usize,
    pub unmatched: usize,
    pub matched_amount: BigDecimal,
    pub partial_amount: BigDecimal,
    pub unmatched_amount: BigDecimal,
    /// Invoices left pending after the run
    pub open_invoices: usize,
    pub open_invoice_amount: BigDecimal,
}

impl ReconciliationSummary {
    /// Summarize classified transactions and the final invoice pool
    pub fn from_results(transactions: &[Transaction], invoices: &[Invoice]) -> Self {
        let total_for = |status: TransactionStatus| -> (usize, BigDecimal) {
            let selected: Vec<&Transaction> =
                transactions.iter().filter(|t| t.status == status).collect();
            let amount = selected.iter().map(|t| &t.amount).sum();
            (selected.len(), amount)
        };

        let (matched, matched_amount) = total_for(TransactionStatus::Matched);
        let (partial, partial_amount) = total_for(TransactionStatus::Partial);
        let (unmatched, unmatched_amount) = total_for(TransactionStatus::Unmatched);

        let open: Vec<&Invoice> = invoices.iter().filter(|i| i.is_pending()).collect();

        Self {
            total_transactions: transactions.len(),
            matched,
            partial,
            unmatched,
            matched_amount,
            partial_amount,
            unmatched_amount,
            open_invoices: open.len(),
            open_invoice_amount: open.iter().map(|i| &i.amount).sum(),
        }
    }

    /// Share of transactions settled automatically, 0.0 for an empty run
    pub fn automatic_rate(&self) -> f64 {
        if self.total_transactions == 0 {
            0.0
        } else {
            self.matched as f64 / self.total_transactions as f64
        }
    }
}

/// Everything a reconciliation run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub run_id: Uuid,
    pub generated_at: NaiveDateTime,
    /// Classified transactions, in bank export order
    pub transactions: Vec<Transaction>,
    /// Final state of the invoice pool
    pub invoices: Vec<Invoice>,
    pub summary: ReconciliationSummary,
}

impl ReconciliationReport {
    pub fn new(transactions: Vec<Transaction>, invoices: Vec<Invoice>) -> Self {
        let summary = ReconciliationSummary::from_results(&transactions, &invoices);
        Self {
            run_id: Uuid::new_v4(),
            generated_at: chrono::Utc::now().naive_utc(),
            transactions,
            invoices,
            summary,
        }
    }

    /// Transactions with the given status
    pub fn by_status(&self, status: TransactionStatus) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|t| t.status == status)
            .collect()
    }

    /// Transactions with the given classification
    pub fn by_classification(&self, classification: Classification) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|t| t.classification() == Some(classification))
            .collect()
    }

    /// Transactions a human still has to look at (suggestions and manual)
    pub fn needs_review(&self) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|t| t.status != TransactionStatus::Matched)
            .collect()
    }

    /// Invoices no transaction settled
    pub fn open_invoices(&self) -> Vec<&Invoice> {
        self.invoices.iter().filter(|i| i.is_pending()).collect()
    }
}
