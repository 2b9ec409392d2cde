//! Core types and data structures for the reconciliation engine

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lifecycle state of an ERP invoice within a single reconciliation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Still open - available to exact and grouped matches
    Pending,
    /// Consumed by an automatic match earlier in the run
    Matched,
}

/// Invoice exported from the accounting system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Invoice number, unique within a pool
    pub id: String,
    /// Issue date, `None` when the export cell could not be read as a date
    pub issue_date: Option<NaiveDate>,
    /// Customer name as written in the ERP
    pub client_name: String,
    /// Amount due (never negative)
    pub amount: BigDecimal,
    /// Whether a previous transaction of this run already settled it
    pub status: InvoiceStatus,
}

impl Invoice {
    /// Create a new pending invoice
    pub fn new(
        id: String,
        issue_date: Option<NaiveDate>,
        client_name: String,
        amount: BigDecimal,
    ) -> Self {
        Self {
            id,
            issue_date,
            client_name,
            amount,
            status: InvoiceStatus::Pending,
        }
    }

    /// Check if the invoice can still be consumed by an automatic match
    pub fn is_pending(&self) -> bool {
        self.status == InvoiceStatus::Pending
    }
}

/// Outcome status of a bank transaction after classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Matched,
    Partial,
    Unmatched,
}

/// How certain the engine is about a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Deterministic rule hit, confidence is always 100
    Automatic,
    /// Heuristic hit that needs human approval
    AiSuggested,
    /// No candidate found, confidence is always 0
    Manual,
}

impl Classification {
    /// Transaction status implied by this classification
    pub fn status(&self) -> TransactionStatus {
        match self {
            Classification::Automatic => TransactionStatus::Matched,
            Classification::AiSuggested => TransactionStatus::Partial,
            Classification::Manual => TransactionStatus::Unmatched,
        }
    }
}

/// The rules of the cascade, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Exact,
    GroupedSum,
    Tolerance,
    Semantic,
    NoMatch,
}

impl RuleKind {
    /// Classification produced whenever this rule wins
    pub fn classification(&self) -> Classification {
        match self {
            RuleKind::Exact | RuleKind::GroupedSum => Classification::Automatic,
            RuleKind::Tolerance | RuleKind::Semantic => Classification::AiSuggested,
            RuleKind::NoMatch => Classification::Manual,
        }
    }

    /// Stable machine name, `None` for the manual fallback
    pub fn name(&self) -> Option<&'static str> {
        match self {
            RuleKind::Exact => Some("exact"),
            RuleKind::GroupedSum => Some("grouped_sum"),
            RuleKind::Tolerance => Some("tolerance"),
            RuleKind::Semantic => Some("semantic"),
            RuleKind::NoMatch => None,
        }
    }

    /// Human-readable label shown by review tooling
    pub fn label(&self) -> Option<&'static str> {
        match self {
            RuleKind::Exact => Some("R1: Exact match (amount + reference)"),
            RuleKind::GroupedSum => Some("R2: Grouped payment (1 payment = N invoices)"),
            RuleKind::Tolerance => Some("R3: Bank fee pattern detected"),
            RuleKind::Semantic => Some("R4: Partial client token + unique amount"),
            RuleKind::NoMatch => None,
        }
    }
}

/// Colour band used by review tooling to sort suggestions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    Low,
    Medium,
    High,
}

impl ConfidenceTier {
    pub fn from_confidence(confidence: u8) -> Self {
        match confidence {
            90..=u8::MAX => ConfidenceTier::High,
            70..=89 => ConfidenceTier::Medium,
            _ => ConfidenceTier::Low,
        }
    }
}

/// Decision attached to every transaction once the engine has run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub classification: Classification,
    /// Machine name of the winning rule (`exact`, `grouped_sum`, ...)
    pub rule_name: Option<String>,
    /// Display label of the winning rule
    pub rule_label: Option<String>,
    /// 0-100, tied to the classification band
    pub confidence: u8,
    /// Invoices settled or suggested, in pool order. For manual results these
    /// are review candidates only.
    pub related_invoices: Vec<Invoice>,
    /// Human-readable rationale
    pub notes: Option<String>,
}

impl MatchResult {
    /// Tier of this result's confidence
    pub fn tier(&self) -> ConfidenceTier {
        ConfidenceTier::from_confidence(self.confidence)
    }

    /// Ids of the related invoices
    pub fn invoice_ids(&self) -> Vec<&str> {
        self.related_invoices.iter().map(|i| i.id.as_str()).collect()
    }
}

/// Bank statement movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Bank reference, unique within a run
    pub id: String,
    /// Value date, `None` when the export cell could not be read as a date
    pub date: Option<NaiveDate>,
    /// Free-text concept written by the bank or the payer
    pub concept: String,
    pub amount: BigDecimal,
    /// ISO-4217 code as exported
    pub currency: String,
    pub status: TransactionStatus,
    /// Always present once the engine has classified the transaction
    pub match_details: Option<MatchResult>,
}

impl Transaction {
    /// Create a new, not yet classified transaction
    pub fn new(
        id: String,
        date: Option<NaiveDate>,
        concept: String,
        amount: BigDecimal,
        currency: String,
    ) -> Self {
        Self {
            id,
            date,
            concept,
            amount,
            currency,
            status: TransactionStatus::Unmatched,
            match_details: None,
        }
    }

    /// Attach the engine's decision, deriving the status from it
    pub fn classify(mut self, result: MatchResult) -> Self {
        self.status = result.classification.status();
        self.match_details = Some(result);
        self
    }

    /// Confidence of the attached decision, 0 when unclassified
    pub fn confidence(&self) -> u8 {
        self.match_details
            .as_ref()
            .map(|m| m.confidence)
            .unwrap_or(0)
    }

    /// Classification of the attached decision
    pub fn classification(&self) -> Option<Classification> {
        self.match_details.as_ref().map(|m| m.classification)
    }
}

/// Errors raised while setting up a reconciliation run
#[derive(Debug, thiserror::Error)]
pub enum ReconError {
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Invalid invoice: {0}")]
    InvalidInvoice(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for reconciliation setup
pub type ReconResult<T> = Result<T, ReconError>;
