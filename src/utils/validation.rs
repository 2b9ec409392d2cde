//! Validation utilities

use bigdecimal::BigDecimal;

use crate::types::*;

/// Largest group size accepted from configuration. The grouping search is
/// combinatorial in this value.
pub const MAX_GROUP_SIZE_LIMIT: usize = 8;

/// Validate that an amount option is zero or positive
pub fn validate_non_negative_amount(option: &str, amount: &BigDecimal) -> ReconResult<()> {
    if *amount < BigDecimal::from(0) {
        Err(ReconError::InvalidConfig(format!(
            "{option} cannot be negative, got {amount}"
        )))
    } else {
        Ok(())
    }
}

/// Validate the maximum number of invoices a grouped payment may settle
pub fn validate_group_size(max_group_size: usize) -> ReconResult<()> {
    if max_group_size < 2 {
        return Err(ReconError::InvalidConfig(format!(
            "max_group_size must be at least 2, got {max_group_size}"
        )));
    }

    if max_group_size > MAX_GROUP_SIZE_LIMIT {
        return Err(ReconError::InvalidConfig(format!(
            "max_group_size cannot exceed {MAX_GROUP_SIZE_LIMIT}, got {max_group_size}"
        )));
    }

    Ok(())
}

/// Validate a confidence band for a suggested (non-automatic, non-manual) rule
pub fn validate_suggested_band(option: &str, confidence: u8) -> ReconResult<()> {
    if confidence == 0 || confidence >= 100 {
        return Err(ReconError::InvalidConfig(format!(
            "{option} must be between 1 and 99, got {confidence}"
        )));
    }

    Ok(())
}

/// Validate that invoice ids are unique within a pool
pub fn validate_unique_invoice_ids(invoices: &[Invoice]) -> ReconResult<()> {
    let mut seen = std::collections::HashSet::new();
    for invoice in invoices {
        if invoice.id.trim().is_empty() {
            return Err(ReconError::InvalidInvoice(
                "Invoice ID cannot be empty".to_string(),
            ));
        }
        if !seen.insert(invoice.id.as_str()) {
            return Err(ReconError::InvalidInvoice(format!(
                "Invoice '{}' appears more than once in the pool",
                invoice.id
            )));
        }
    }

    Ok(())
}
