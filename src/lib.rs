//! # Bank Reconciliation
//!
//! A rule-based matching engine that reconciles bank statement movements
//! against pending ERP invoices and explains every decision.
//!
//! ## Features
//!
//! - **Normalization**: Typed transactions and invoices from raw spreadsheet rows
//! - **Rule cascade**: Exact, grouped-sum, bank fee tolerance and semantic matching, in priority order
//! - **Grouping solver**: Deterministic bounded subset-sum over pending invoices
//! - **Confidence model**: Fixed bands per rule with a human readable rationale
//! - **Pluggable policies**: Swap strategies or the scoring model through traits
//!
//! ## Quick Start
//!
//! ```rust
//! use bank_reconciliation::{reconcile, Cell, TransactionStatus};
//!
//! let bank = vec![
//!     vec![Cell::from("date"), Cell::from("id"), Cell::from("concept"), Cell::from("amount"), Cell::from("currency")],
//!     vec![
//!         Cell::from("2024-03-15"),
//!         Cell::from("TX-001"),
//!         Cell::from("TRANSF DISTRIBUCIONES NORTE SA"),
//!         Cell::from(1250.0),
//!         Cell::from("EUR"),
//!     ],
//! ];
//! let invoices = vec![
//!     vec![Cell::from("date"), Cell::from("id"), Cell::from("client"), Cell::Empty, Cell::from("amount")],
//!     vec![
//!         Cell::from("2024-03-01"),
//!         Cell::from("FAC-2403"),
//!         Cell::from("Distribuciones Norte SA"),
//!         Cell::Empty,
//!         Cell::from(1250.0),
//!     ],
//! ];
//!
//! let result = reconcile(&bank, &invoices);
//! assert_eq!(result[0].status, TransactionStatus::Matched);
//! ```

pub mod config;
pub mod normalize;
pub mod reconciliation;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::*;
pub use normalize::{normalize_invoices, normalize_transactions, Cell, RawRow, Schema};
pub use reconciliation::*;
pub use traits::*;
pub use types::*;
