//! Reconciliation of a small bank export against open invoices
//!
//! Run with `RUST_LOG=debug` to follow every rule decision.

use bank_reconciliation::{Cell, RawRow, ReconConfig, ReconciliationEngine, TransactionStatus};
use tracing_subscriber::EnvFilter;

fn bank_rows() -> Vec<RawRow> {
    let row = |date: &str, id: &str, concept: &str, amount: f64| -> RawRow {
        vec![
            Cell::from(date),
            Cell::from(id),
            Cell::from(concept),
            Cell::from(amount),
            Cell::from("EUR"),
        ]
    };

    vec![
        vec![
            Cell::from("Fecha"),
            Cell::from("ID"),
            Cell::from("Concepto"),
            Cell::from("Importe"),
            Cell::from("Divisa"),
        ],
        row("2024-03-15", "TX-001", "TRANSF CLIENTE DISTRIBUCIONES NORTE SA", 1250.00),
        row("2024-03-16", "TX-002", "TRANSF SUPERMERCADOS SUR PAGO AGRUPADO", 3780.50),
        row("2024-03-17", "TX-003", "TRANSF TALLERES UNIDOS SL", 890.00),
        row("2024-03-18", "TX-004", "PAGO FERRET CENTRAL", 640.00),
        row("2024-03-19", "TX-005", "ABONO", 315.00),
    ]
}

fn invoice_rows() -> Vec<RawRow> {
    let row = |id: &str, client: &str, amount: f64| -> RawRow {
        vec![
            Cell::from("2024-03-01"),
            Cell::from(id),
            Cell::from(client),
            Cell::Empty,
            Cell::from(amount),
        ]
    };

    vec![
        vec![
            Cell::from("Fecha"),
            Cell::from("Factura"),
            Cell::from("Cliente"),
            Cell::from("Vencimiento"),
            Cell::from("Total"),
        ],
        row("FAC-2401", "Supermercados del Sur", 1780.50),
        row("FAC-2402", "Supermercados del Sur", 2000.00),
        row("FAC-2403", "Distribuciones Norte SA", 1250.00),
        row("FAC-2404", "Talleres Unidos SL", 900.00),
        row("FAC-2405", "Ferreteria Central", 640.00),
        row("FAC-2406", "Papeleria Luna", 315.00),
        row("FAC-2407", "Papeleria Luna", 315.00),
    ]
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("🏦 Bank Reconciliation - Demo Run\n");

    let config = ReconConfig::from_toml_str(
        r#"
        tolerance_amount = "15"
        max_group_size = 4

        [name_matching]
        mode = "substring"
        "#,
    )?;
    let engine = ReconciliationEngine::new(config)?;
    let report = engine.run(&bank_rows(), &invoice_rows());

    for transaction in &report.transactions {
        let marker = match transaction.status {
            TransactionStatus::Matched => "✓",
            TransactionStatus::Partial => "?",
            TransactionStatus::Unmatched => "✗",
        };
        println!(
            "  {} {} {:>10} {:<40} confidence {:>3}",
            marker,
            transaction.id,
            transaction.amount,
            transaction.concept,
            transaction.confidence()
        );
        if let Some(details) = &transaction.match_details {
            if let Some(label) = &details.rule_label {
                println!("      {}", label);
            }
            if let Some(notes) = &details.notes {
                println!("      {}", notes);
            }
        }
    }

    let summary = &report.summary;
    println!("\n📊 Summary");
    println!("  Matched:   {} ({})", summary.matched, summary.matched_amount);
    println!("  Suggested: {} ({})", summary.partial, summary.partial_amount);
    println!("  Manual:    {} ({})", summary.unmatched, summary.unmatched_amount);
    println!(
        "  Open invoices: {} ({})",
        summary.open_invoices, summary.open_invoice_amount
    );

    println!("\n📄 JSON report");
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
