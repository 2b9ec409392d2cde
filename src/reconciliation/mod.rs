//! Reconciliation of bank statement transactions against ERP invoices
//!
//! The [`ReconciliationEngine`] walks the bank export in order and runs each
//! transaction through the [`RuleCascade`]: exact match, grouped sum, bank fee
//! tolerance, semantic match, and finally manual review. Automatic matches
//! consume their invoices from the shared [`InvoicePool`].

pub mod cascade;
pub mod confidence;
pub mod engine;
pub mod grouping;
pub mod pool;
pub mod report;
pub mod strategies;

pub use cascade::{RuleCascade, Verdict};
pub use confidence::{enforce_band, format_amount, TableConfidenceModel};
pub use engine::{reconcile, ReconciliationEngine};
pub use grouping::{find_subset_summing, GroupSearch};
pub use pool::InvoicePool;
pub use report::{ReconciliationReport, ReconciliationSummary};
pub use strategies::{ExactMatch, GroupedSumMatch, SemanticMatch, ToleranceMatch};
