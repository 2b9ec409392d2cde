//! Text helpers for finding client names and references inside bank concepts

use strsim::levenshtein;

use crate::config::NameMatching;

/// Legal forms and filler words that carry no identity in a client name
const NOISE_WORDS: &[&str] = &[
    "sa", "sl", "slu", "sau", "sas", "sc", "scp", "cb", "srl", "spa", "inc", "ltd", "llc", "plc",
    "gmbh", "ag", "bv", "nv", "co", "cia", "corp", "de", "del", "la", "las", "el", "los", "y",
    "e", "the", "and", "of",
];

/// Split text into alphanumeric words, lowercased unless `case_sensitive`
pub fn tokenize(text: &str, case_sensitive: bool) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| {
            if case_sensitive {
                w.to_string()
            } else {
                w.to_lowercase()
            }
        })
        .collect()
}

/// Words of a client name that identify it, lowercased
///
/// "Distribuciones Norte S.A." yields `["distribuciones", "norte"]`.
pub fn significant_words(name: &str) -> Vec<String> {
    tokenize(name, false)
        .into_iter()
        .filter(|w| w.chars().count() >= 2 && !NOISE_WORDS.contains(&w.as_str()))
        .collect()
}

/// Check whether concept tokens abbreviate every significant word of a client
/// name. A token abbreviates a word when it is a prefix of it and at least
/// `min_token_len` characters long (or the whole word, if shorter).
pub fn abbreviates(concept_tokens: &[String], client_name: &str, min_token_len: usize) -> bool {
    let words = significant_words(client_name);
    if words.is_empty() {
        return false;
    }

    words.iter().all(|word| {
        let needed = min_token_len.min(word.chars().count());
        concept_tokens
            .iter()
            .any(|token| token.chars().count() >= needed && word.starts_with(token.as_str()))
    })
}

/// Looks up client names and invoice references inside bank concepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameMatcher {
    mode: NameMatching,
    case_sensitive: bool,
}

impl Default for NameMatcher {
    fn default() -> Self {
        Self::new(NameMatching::default(), false)
    }
}

impl NameMatcher {
    pub fn new(mode: NameMatching, case_sensitive: bool) -> Self {
        Self {
            mode,
            case_sensitive,
        }
    }

    /// Check whether `concept` mentions `client_name`. Blank names never match.
    pub fn contains_name(&self, concept: &str, client_name: &str) -> bool {
        let name = client_name.trim();
        if name.is_empty() {
            return false;
        }

        match self.mode {
            NameMatching::Substring => {
                if self.case_sensitive {
                    concept.contains(name)
                } else {
                    concept.to_lowercase().contains(&name.to_lowercase())
                }
            }
            NameMatching::Token => {
                let needle = tokenize(name, self.case_sensitive);
                let haystack = tokenize(concept, self.case_sensitive);
                !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle.as_slice())
            }
            NameMatching::Fuzzy { max_distance } => {
                let needle = tokenize(name, self.case_sensitive);
                let haystack = tokenize(concept, self.case_sensitive);
                if needle.is_empty() || haystack.len() < needle.len() {
                    return false;
                }
                let target = needle.join(" ");
                haystack
                    .windows(needle.len())
                    .any(|w| levenshtein(&w.join(" "), &target) <= max_distance)
            }
        }
    }

    /// Check whether `concept` quotes an invoice id verbatim. Blank ids never match.
    pub fn contains_reference(&self, concept: &str, invoice_id: &str) -> bool {
        let id = invoice_id.trim();
        !id.is_empty() && concept.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONCEPT: &str = "TRANSF CLIENTE DISTRIBUCIONES NORTE SA";

    #[test]
    fn test_substring_matching() {
        let matcher = NameMatcher::default();
        assert!(matcher.contains_name(CONCEPT, "Distribuciones Norte SA"));
        assert!(!matcher.contains_name(CONCEPT, "Supermercados del Sur"));
        assert!(!matcher.contains_name(CONCEPT, "   "));

        let strict = NameMatcher::new(NameMatching::Substring, true);
        assert!(!strict.contains_name(CONCEPT, "Distribuciones Norte SA"));
        assert!(strict.contains_name(CONCEPT, "DISTRIBUCIONES NORTE"));
    }

    #[test]
    fn test_token_matching_rejects_word_fragments() {
        let substring = NameMatcher::default();
        let token = NameMatcher::new(NameMatching::Token, false);

        // "ACE" is a fragment of "PLACE" but not a word of the concept
        assert!(substring.contains_name("PAYMENT PLACE HOLDINGS", "Ace"));
        assert!(!token.contains_name("PAYMENT PLACE HOLDINGS", "Ace"));
        assert!(token.contains_name(CONCEPT, "Distribuciones Norte SA"));
    }

    #[test]
    fn test_fuzzy_matching_tolerates_typos() {
        let fuzzy = NameMatcher::new(NameMatching::Fuzzy { max_distance: 2 }, false);
        assert!(fuzzy.contains_name("TRANSF DISTRIBUCIONES NORT", "Distribuciones Norte"));
        assert!(!fuzzy.contains_name("TRANSF DISTRIBUCIONES SUR", "Distribuciones Norte"));
        assert!(!fuzzy.contains_name("NORTE", "Distribuciones Norte"));

        // Distance counts characters, not bytes
        let strict = NameMatcher::new(NameMatching::Fuzzy { max_distance: 1 }, false);
        assert!(strict.contains_name("TRANSF ANO NUEVO SL", "Año Nuevo"));
    }

    #[test]
    fn test_reference_is_verbatim() {
        let matcher = NameMatcher::default();
        assert!(matcher.contains_reference("PAGO FAC-2403", "FAC-2403"));
        assert!(!matcher.contains_reference("PAGO fac-2403", "FAC-2403"));
        assert!(!matcher.contains_reference("PAGO FAC-2403", ""));
    }

    #[test]
    fn test_significant_words_drop_legal_forms() {
        assert_eq!(
            significant_words("Distribuciones Norte S.A."),
            vec!["distribuciones".to_string(), "norte".to_string()]
        );
        assert!(significant_words("S.L.").is_empty());
    }

    #[test]
    fn test_abbreviates() {
        let tokens = tokenize("PAGO DIST NORTE", false);
        assert!(abbreviates(&tokens, "Distribuciones Norte SA", 4));
        assert!(!abbreviates(&tokens, "Distribuciones Sur SA", 4));

        // "DI" is too short to stand for "Distribuciones"
        let tokens = tokenize("PAGO DI NORTE", false);
        assert!(!abbreviates(&tokens, "Distribuciones Norte SA", 4));

        assert!(!abbreviates(&tokenize("ABONO", false), "SA", 4));
    }
}
