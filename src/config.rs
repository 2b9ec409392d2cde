//! Engine configuration, loadable from TOML

use std::collections::BTreeMap;
use std::path::Path;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::*;
use crate::utils::validation::*;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Recognized reconciliation options. Every field has a default, so an empty
/// TOML document is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconConfig {
    /// Largest accepted gap between invoice and payment for a tolerance match
    #[serde(default = "default_tolerance_amount")]
    pub tolerance_amount: BigDecimal,
    /// Largest number of invoices a single payment may settle
    #[serde(default = "default_max_group_size")]
    pub max_group_size: usize,
    /// Rounding noise absorbed when summing a group of invoices
    #[serde(default = "default_group_tolerance")]
    pub group_tolerance: BigDecimal,
    /// Combinations the grouping search may visit per transaction before
    /// giving up
    #[serde(default = "default_group_search_budget")]
    pub group_search_budget: usize,
    /// Compare client names case-sensitively in the exact rule. The tolerance
    /// rule always ignores case.
    #[serde(default)]
    pub exact_match_case_sensitive: bool,
    #[serde(default)]
    pub name_matching: NameMatching,
    #[serde(default)]
    pub semantic: SemanticConfig,
    #[serde(default)]
    pub confidence: ConfidenceBands,
}

fn default_tolerance_amount() -> BigDecimal {
    BigDecimal::from(15)
}

fn default_max_group_size() -> usize {
    4
}

fn default_group_search_budget() -> usize {
    1_000_000
}

fn default_group_tolerance() -> BigDecimal {
    // 0.01
    BigDecimal::new(1.into(), 2)
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            tolerance_amount: default_tolerance_amount(),
            max_group_size: default_max_group_size(),
            group_tolerance: default_group_tolerance(),
            group_search_budget: default_group_search_budget(),
            exact_match_case_sensitive: false,
            name_matching: NameMatching::default(),
            semantic: SemanticConfig::default(),
            confidence: ConfidenceBands::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Name matching
// ---------------------------------------------------------------------------

/// How a client name is looked up inside a bank concept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum NameMatching {
    /// Plain substring containment
    Substring,
    /// The client's words must appear as consecutive whole words
    Token,
    /// Consecutive words within `max_distance` edits of the client name
    Fuzzy {
        #[serde(default = "default_max_distance")]
        max_distance: usize,
    },
}

fn default_max_distance() -> usize {
    2
}

impl Default for NameMatching {
    fn default() -> Self {
        Self::Substring
    }
}

// ---------------------------------------------------------------------------
// Semantic fallback
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticConfig {
    /// Shortest concept token accepted as an abbreviation of a client word
    #[serde(default = "default_min_token_len")]
    pub min_token_len: usize,
    /// Known aliases per client name, e.g. `"Distribuciones Norte SA" = ["DISNOR"]`
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,
}

fn default_min_token_len() -> usize {
    4
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            min_token_len: default_min_token_len(),
            aliases: BTreeMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Confidence bands
// ---------------------------------------------------------------------------

/// Scores reported by the suggested rules. Automatic results always score 100
/// and manual results 0, so only the suggested bands are tunable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceBands {
    #[serde(default = "default_tolerance_band")]
    pub tolerance: u8,
    #[serde(default = "default_semantic_band")]
    pub semantic: u8,
}

fn default_tolerance_band() -> u8 {
    92
}

fn default_semantic_band() -> u8 {
    88
}

impl Default for ConfidenceBands {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance_band(),
            semantic: default_semantic_band(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(input: &str) -> ReconResult<Self> {
        let config: ReconConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> ReconResult<Self> {
        let input = std::fs::read_to_string(path)?;
        Self::from_toml_str(&input)
    }

    /// Check every option against its allowed range
    pub fn validate(&self) -> ReconResult<()> {
        validate_non_negative_amount("tolerance_amount", &self.tolerance_amount)?;
        validate_non_negative_amount("group_tolerance", &self.group_tolerance)?;
        validate_group_size(self.max_group_size)?;

        if self.group_search_budget == 0 {
            return Err(ReconError::InvalidConfig(
                "group_search_budget must be at least 1".to_string(),
            ));
        }

        if let NameMatching::Fuzzy { max_distance } = self.name_matching {
            if max_distance == 0 {
                return Err(ReconError::InvalidConfig(
                    "name_matching.max_distance must be at least 1 (use mode = \"token\" for exact words)"
                        .to_string(),
                ));
            }
        }

        if self.semantic.min_token_len < 2 {
            return Err(ReconError::InvalidConfig(format!(
                "semantic.min_token_len must be at least 2, got {}",
                self.semantic.min_token_len
            )));
        }

        for (client, aliases) in &self.semantic.aliases {
            if aliases.iter().any(|a| a.trim().is_empty()) {
                return Err(ReconError::InvalidConfig(format!(
                    "semantic.aliases: client '{client}' has an empty alias"
                )));
            }
        }

        validate_suggested_band("confidence.tolerance", self.confidence.tolerance)?;
        validate_suggested_band("confidence.semantic", self.confidence.semantic)?;

        Ok(())
    }
}
