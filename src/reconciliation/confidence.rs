//! Table-driven confidence model and rationale formatting

use bigdecimal::{BigDecimal, RoundingMode};

use crate::config::ConfidenceBands;
use crate::traits::*;
use crate::types::*;

/// Confidence of every automatic result
pub const AUTOMATIC_CONFIDENCE: u8 = 100;

/// Confidence of every manual result
pub const MANUAL_CONFIDENCE: u8 = 0;

/// Format an amount with two decimals, rounding half up
pub fn format_amount(amount: &BigDecimal) -> String {
    amount.with_scale_round(2, RoundingMode::HalfUp).to_string()
}

fn with_currency(amount: &BigDecimal, currency: &str) -> String {
    if currency.is_empty() {
        format_amount(amount)
    } else {
        format!("{} {}", format_amount(amount), currency)
    }
}

fn join_ids(invoices: &[Invoice]) -> String {
    invoices
        .iter()
        .map(|i| i.id.as_str())
        .collect::<Vec<_>>()
        .join(" + ")
}

/// Fixed confidence bands per rule: 100 for exact and grouped matches, the
/// configured bands (92 and 88 by default) for tolerance and semantic
/// suggestions, 0 for manual review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableConfidenceModel {
    bands: ConfidenceBands,
}

impl TableConfidenceModel {
    pub fn new(bands: ConfidenceBands) -> Self {
        Self { bands }
    }
}

impl ConfidenceModel for TableConfidenceModel {
    fn score(&self, rule: RuleKind, transaction: &Transaction, invoices: &[Invoice]) -> Score {
        match rule {
            RuleKind::Exact => {
                let anchor = invoices
                    .first()
                    .map(|i| format!(": invoice {} ({})", i.id, i.client_name))
                    .unwrap_or_default();
                Score::new(
                    AUTOMATIC_CONFIDENCE,
                    format!("Exact amount + reference match{anchor}"),
                )
            }
            RuleKind::GroupedSum => {
                let total: BigDecimal = invoices.iter().map(|i| &i.amount).sum();
                Score::new(
                    AUTOMATIC_CONFIDENCE,
                    format!(
                        "Payment aggregates {} invoices: {} (total {})",
                        invoices.len(),
                        join_ids(invoices),
                        with_currency(&total, &transaction.currency)
                    ),
                )
            }
            RuleKind::Tolerance => {
                let notes = match invoices.first() {
                    Some(invoice) => {
                        let difference = &invoice.amount - &transaction.amount;
                        format!(
                            "Difference of {} against invoice {} attributable to bank fees",
                            with_currency(&difference, &transaction.currency),
                            invoice.id
                        )
                    }
                    None => "Amount within bank fee tolerance".to_string(),
                };
                Score::new(self.bands.tolerance, notes)
            }
            RuleKind::Semantic => {
                let notes = match invoices.first() {
                    Some(invoice) => format!(
                        "Amount matches invoice {}; concept carries a partial client token for {}",
                        invoice.id, invoice.client_name
                    ),
                    None => "Amount match with partial client token".to_string(),
                };
                Score::new(self.bands.semantic, notes)
            }
            RuleKind::NoMatch => {
                let notes = match invoices.len() {
                    0 => "Requires manual investigation: no invoice matches this movement".to_string(),
                    1 => format!(
                        "Requires manual investigation: invoice {} shares this amount but the concept carries no reference to it",
                        invoices[0].id
                    ),
                    n => format!(
                        "Requires manual investigation: {n} pending invoices share this amount ({}), concept is ambiguous",
                        join_ids(invoices)
                    ),
                };
                Score::new(MANUAL_CONFIDENCE, notes)
            }
        }
    }
}

/// Clamp a score into the band its classification requires
pub fn enforce_band(classification: Classification, confidence: u8) -> u8 {
    match classification {
        Classification::Automatic => AUTOMATIC_CONFIDENCE,
        Classification::Manual => MANUAL_CONFIDENCE,
        Classification::AiSuggested => confidence.clamp(1, 99),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn tx(amount: &str) -> Transaction {
        Transaction::new(
            "TX-1".to_string(),
            None,
            "TRANSF".to_string(),
            dec(amount),
            "EUR".to_string(),
        )
    }

    fn invoice(id: &str, amount: &str) -> Invoice {
        Invoice::new(id.to_string(), None, "Acme".to_string(), dec(amount))
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(&dec("10")), "10.00");
        assert_eq!(format_amount(&dec("-5.125")), "-5.13");
        assert_eq!(format_amount(&dec("3780.5")), "3780.50");
    }

    #[test]
    fn test_bands() {
        let model = TableConfidenceModel::default();
        let t = tx("100");
        let inv = [invoice("FAC-1", "100")];
        assert_eq!(model.score(RuleKind::Exact, &t, &inv).confidence, 100);
        assert_eq!(model.score(RuleKind::GroupedSum, &t, &inv).confidence, 100);
        assert_eq!(model.score(RuleKind::Tolerance, &t, &inv).confidence, 92);
        assert_eq!(model.score(RuleKind::Semantic, &t, &inv).confidence, 88);
        assert_eq!(model.score(RuleKind::NoMatch, &t, &[]).confidence, 0);
    }

    #[test]
    fn test_configured_bands() {
        let model = TableConfidenceModel::new(ConfidenceBands {
            tolerance: 80,
            semantic: 60,
        });
        let t = tx("100");
        let inv = [invoice("FAC-1", "95")];
        assert_eq!(model.score(RuleKind::Tolerance, &t, &inv).confidence, 80);
        assert_eq!(model.score(RuleKind::Semantic, &t, &inv).confidence, 60);
    }

    #[test]
    fn test_tolerance_notes_report_signed_difference() {
        let model = TableConfidenceModel::default();
        let score = model.score(RuleKind::Tolerance, &tx("890.00"), &[invoice("FAC-9", "900.00")]);
        let notes = score.notes.unwrap();
        assert!(notes.contains("10.00 EUR"), "{notes}");
        assert!(notes.contains("bank fees"));

        let score = model.score(RuleKind::Tolerance, &tx("905"), &[invoice("FAC-9", "900")]);
        assert!(score.notes.unwrap().contains("-5.00 EUR"));
    }

    #[test]
    fn test_grouped_notes() {
        let model = TableConfidenceModel::default();
        let score = model.score(
            RuleKind::GroupedSum,
            &tx("3780.50"),
            &[invoice("FAC-2401", "1780.50"), invoice("FAC-2402", "2000.00")],
        );
        assert_eq!(
            score.notes.as_deref(),
            Some("Payment aggregates 2 invoices: FAC-2401 + FAC-2402 (total 3780.50 EUR)")
        );
    }

    #[test]
    fn test_manual_notes_request_investigation() {
        let model = TableConfidenceModel::default();
        let none = model.score(RuleKind::NoMatch, &tx("10"), &[]);
        assert!(none.notes.unwrap().starts_with("Requires manual investigation"));

        let many = model.score(
            RuleKind::NoMatch,
            &tx("10"),
            &[invoice("A", "10"), invoice("B", "10")],
        );
        assert!(many.notes.unwrap().contains("2 pending invoices share this amount"));
    }

    #[test]
    fn test_enforce_band() {
        assert_eq!(enforce_band(Classification::Automatic, 40), 100);
        assert_eq!(enforce_band(Classification::Manual, 40), 0);
        assert_eq!(enforce_band(Classification::AiSuggested, 100), 99);
        assert_eq!(enforce_band(Classification::AiSuggested, 0), 1);
        assert_eq!(enforce_band(Classification::AiSuggested, 92), 92);
    }
}
