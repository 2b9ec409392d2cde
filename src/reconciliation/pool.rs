//! Invoice pool shared by every transaction of a run

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::*;
use crate::utils::validation::validate_unique_invoice_ids;

/// The invoices available as match candidates for one run.
///
/// Strategies read it; only [`InvoicePool::commit_consumption`] mutates it, so
/// an invoice settled by one transaction cannot be claimed by a later one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoicePool {
    invoices: Vec<Invoice>,
}

impl InvoicePool {
    /// Create a pool from an export, accepting whatever it contains
    pub fn new(invoices: Vec<Invoice>) -> Self {
        Self { invoices }
    }

    /// Create a pool, rejecting blank or duplicated invoice ids
    pub fn try_new(invoices: Vec<Invoice>) -> ReconResult<Self> {
        validate_unique_invoice_ids(&invoices)?;
        Ok(Self::new(invoices))
    }

    pub fn len(&self) -> usize {
        self.invoices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invoices.is_empty()
    }

    /// Get an invoice by position
    pub fn get(&self, index: usize) -> Option<&Invoice> {
        self.invoices.get(index)
    }

    /// All invoices in pool order
    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    pub fn iter(&self) -> impl Iterator<Item = &Invoice> {
        self.invoices.iter()
    }

    /// Pending invoices with their positions, in pool order
    pub fn pending(&self) -> impl Iterator<Item = (usize, &Invoice)> {
        self.invoices
            .iter()
            .enumerate()
            .filter(|(_, invoice)| invoice.is_pending())
    }

    /// Number of invoices not yet consumed
    pub fn pending_count(&self) -> usize {
        self.pending().count()
    }

    /// Total amount of invoices not yet consumed
    pub fn pending_amount(&self) -> BigDecimal {
        self.pending().map(|(_, invoice)| &invoice.amount).sum()
    }

    /// Clone the invoices at the given positions, skipping unknown ones
    pub fn select(&self, indices: &[usize]) -> Vec<Invoice> {
        indices
            .iter()
            .filter_map(|&i| self.invoices.get(i))
            .cloned()
            .collect()
    }

    /// Mark the invoices at the given positions as matched.
    /// Returns how many changed state.
    pub fn commit_consumption(&mut self, indices: &[usize]) -> usize {
        let mut committed = 0;
        for &index in indices {
            match self.invoices.get_mut(index) {
                Some(invoice) if invoice.is_pending() => {
                    invoice.status = InvoiceStatus::Matched;
                    committed += 1;
                }
                Some(invoice) => {
                    warn!(invoice = %invoice.id, "Invoice already consumed in this run");
                }
                None => {
                    warn!(index, "Invoice position outside the pool");
                }
            }
        }
        committed
    }

    /// Final state of the invoices
    pub fn into_invoices(self) -> Vec<Invoice> {
        self.invoices
    }
}

impl From<Vec<Invoice>> for InvoicePool {
    fn from(invoices: Vec<Invoice>) -> Self {
        Self::new(invoices)
    }
}
