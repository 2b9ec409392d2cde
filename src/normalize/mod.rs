//! Normalizer: turns raw spreadsheet rows into typed bank transactions and
//! invoices.
//!
//! The first row of every table is a header and is skipped. Cells are coerced
//! per field kind and never fail: blanks and unreadable values fall back to an
//! empty string, zero, or no date.

pub mod coerce;

use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub use coerce::*;

use crate::types::*;

/// One spreadsheet cell as delivered by the ingestion layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

/// A row of cells positioned by column index
pub type RawRow = Vec<Cell>;

/// Target type of a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Amount,
    Date,
}

/// Maps one column of the raw table to a named, typed field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub column: usize,
    pub name: String,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn new(column: usize, name: &str, kind: FieldKind) -> Self {
        Self {
            column,
            name: name.to_string(),
            kind,
        }
    }
}

/// Field names shared by the built-in schemas
pub mod fields {
    pub const DATE: &str = "date";
    pub const ID: &str = "id";
    pub const CONCEPT: &str = "concept";
    pub const CLIENT_NAME: &str = "client_name";
    pub const AMOUNT: &str = "amount";
    pub const CURRENCY: &str = "currency";
}

/// Column layout of a source table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// Bank export: `[date, transactionId, concept, amount, currency]`
    pub fn bank() -> Self {
        Self::new(vec![
            FieldSpec::new(0, fields::DATE, FieldKind::Date),
            FieldSpec::new(1, fields::ID, FieldKind::Text),
            FieldSpec::new(2, fields::CONCEPT, FieldKind::Text),
            FieldSpec::new(3, fields::AMOUNT, FieldKind::Amount),
            FieldSpec::new(4, fields::CURRENCY, FieldKind::Text),
        ])
    }

    /// Invoice export: `[date, invoiceId, clientName, (unused), amount]`
    pub fn invoice() -> Self {
        Self::new(vec![
            FieldSpec::new(0, fields::DATE, FieldKind::Date),
            FieldSpec::new(1, fields::ID, FieldKind::Text),
            FieldSpec::new(2, fields::CLIENT_NAME, FieldKind::Text),
            FieldSpec::new(4, fields::AMOUNT, FieldKind::Amount),
        ])
    }
}

/// A coerced field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Amount(BigDecimal),
    Date(Option<NaiveDate>),
}

/// One normalized row, keyed by field name
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Record {
    pub values: HashMap<String, FieldValue>,
}

impl Record {
    /// Text value of a field, empty when absent or of another kind
    pub fn text(&self, name: &str) -> String {
        match self.values.get(name) {
            Some(FieldValue::Text(s)) => s.clone(),
            _ => String::new(),
        }
    }

    /// Amount value of a field, zero when absent or of another kind
    pub fn amount(&self, name: &str) -> BigDecimal {
        match self.values.get(name) {
            Some(FieldValue::Amount(a)) => a.clone(),
            _ => BigDecimal::from(0),
        }
    }

    /// Date value of a field, `None` when absent, unreadable, or of another kind
    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        match self.values.get(name) {
            Some(FieldValue::Date(d)) => *d,
            _ => None,
        }
    }
}

/// Normalize a raw table with its header row into records, one per data row,
/// in input order
pub fn normalize(rows: &[RawRow], schema: &Schema) -> Vec<Record> {
    rows.iter()
        .skip(1)
        .map(|row| normalize_row(row, schema))
        .collect()
}

fn normalize_row(row: &[Cell], schema: &Schema) -> Record {
    let values = schema
        .fields
        .iter()
        .map(|field| {
            let cell = row.get(field.column).unwrap_or(&Cell::Empty);
            let value = match field.kind {
                FieldKind::Text => FieldValue::Text(coerce_text(cell)),
                FieldKind::Amount => FieldValue::Amount(coerce_amount(cell)),
                FieldKind::Date => FieldValue::Date(coerce_date(cell)),
            };
            (field.name.clone(), value)
        })
        .collect();

    Record { values }
}

impl Transaction {
    /// Build an unclassified transaction from a record of [`Schema::bank`]
    pub fn from_record(record: &Record) -> Self {
        Self::new(
            record.text(fields::ID),
            record.date(fields::DATE),
            record.text(fields::CONCEPT),
            record.amount(fields::AMOUNT),
            record.text(fields::CURRENCY).to_uppercase(),
        )
    }
}

impl Invoice {
    /// Build a pending invoice from a record of [`Schema::invoice`].
    /// Negative amounts are clamped to zero.
    pub fn from_record(record: &Record) -> Self {
        let id = record.text(fields::ID);
        let mut amount = record.amount(fields::AMOUNT);
        if amount < BigDecimal::from(0) {
            warn!(invoice = %id, amount = %amount, "Negative invoice amount, using 0");
            amount = BigDecimal::from(0);
        }

        Self::new(
            id,
            record.date(fields::DATE),
            record.text(fields::CLIENT_NAME),
            amount,
        )
    }
}

/// Normalize a bank export into unclassified transactions
pub fn normalize_transactions(rows: &[RawRow]) -> Vec<Transaction> {
    normalize(rows, &Schema::bank())
        .iter()
        .map(Transaction::from_record)
        .collect()
}

/// Normalize an invoice export into pending invoices
pub fn normalize_invoices(rows: &[RawRow]) -> Vec<Invoice> {
    normalize(rows, &Schema::invoice())
        .iter()
        .map(Invoice::from_record)
        .collect()
}
