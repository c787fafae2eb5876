//! Ordered rewrite rules and the forbidden-term fallback set.
//!
//! Rule order is contractual: each rule operates on the output of the
//! previous one, and specific self-identification phrases must fire before
//! the generic vendor-name rules. Several entries overlap near-identical
//! phrasings on purpose; their relative order is preserved as written
//! rather than deduplicated.

use serde::{Deserialize, Serialize};

/// The assistant identity every response must speak with.
pub const BRAND_NAME: &str = "Verdi";

/// Case-insensitive whole-word terms that must never survive a rewrite.
/// Applied as a fallback after all ordered rules.
pub const FORBIDDEN_TERMS: &[&str] = &["Claude", "Anthropic", "OpenAI", "ChatGPT", "GPT"];

/// A single ordered rewrite rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleEntry {
    /// Case-insensitive regex applied globally to the current text
    pub pattern: String,
    /// Literal replacement (may be empty to delete the match)
    #[serde(default)]
    pub replacement: String,
    /// Whether this entry is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl RuleEntry {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
            enabled: true,
        }
    }

    /// Delete the match outright.
    pub fn delete(pattern: impl Into<String>) -> Self {
        Self::new(pattern, "")
    }

    /// Validate the regex pattern
    pub fn validate(&self) -> Result<(), String> {
        regex::RegexBuilder::new(&self.pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| format!("Invalid rule pattern '{}': {}", self.pattern, e))?;
        Ok(())
    }
}

/// An ordered list of rewrite rules
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub entries: Vec<RuleEntry>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entry(&mut self, entry: RuleEntry) {
        self.entries.push(entry);
    }

    /// Validate all entries, reporting every failure with its index
    pub fn validate(&self) -> Result<(), Vec<(usize, String)>> {
        let mut errors = Vec::new();
        for (idx, entry) in self.entries.iter().enumerate() {
            if let Err(e) = entry.validate() {
                errors.push((idx, e));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// The built-in rule list, most-specific-first.
///
/// Phrase rules delete or rephrase whole clauses so the surviving text stays
/// grammatical; the forbidden-term fallback only substitutes single words,
/// so it must run after these.
pub fn default_rules() -> RuleSet {
    let i_am = r"I(?:'m| am)";
    RuleSet {
        entries: vec![
            // Exact self-identifications, attribution clause included.
            RuleEntry::new(
                format!(
                    r"{i_am} Claude,?\s+(?:an? (?:AI|artificial intelligence)(?: assistant| model)?,?\s+)?(?:made|created|developed|built|trained) by Anthropic"
                ),
                format!("I am {BRAND_NAME}"),
            ),
            RuleEntry::new(
                format!(
                    r"{i_am} ChatGPT,?\s+(?:an? (?:AI|artificial intelligence)(?: assistant| model)?,?\s+)?(?:made|created|developed|built|trained) by OpenAI"
                ),
                format!("I am {BRAND_NAME}"),
            ),
            // Attribution clauses left after other phrasing, deleted whole.
            RuleEntry::delete(
                r",?\s*(?:an? (?:AI|artificial intelligence)(?: assistant| model)?\s+)?(?:made|created|developed|built|trained) by (?:Anthropic|OpenAI)",
            ),
            RuleEntry::delete(r",?\s*(?:powered|backed) by (?:Claude|Anthropic|ChatGPT|OpenAI|GPT[-\w.]*)"),
            // Model family / version strings. Must precede the bare
            // self-identifications or "I am Claude" swallows the vendor name
            // and strands the family suffix.
            RuleEntry::new(
                r"\bClaude\s+(?:Opus|Sonnet|Haiku|Instant)(?:\s*[\d.]+)?\b",
                BRAND_NAME,
            ),
            RuleEntry::new(
                r"\bClaude\s*[\d.]+(?:\s+(?:Opus|Sonnet|Haiku|Instant))?\b",
                BRAND_NAME,
            ),
            RuleEntry::new(r"\bGPT-[\w.]+\b", BRAND_NAME),
            // Bare self-identifications.
            RuleEntry::new(format!(r"{i_am} Claude\b"), format!("I am {BRAND_NAME}")),
            RuleEntry::new(format!(r"{i_am} ChatGPT\b"), format!("I am {BRAND_NAME}")),
            RuleEntry::new(
                r"my name is (?:Claude|ChatGPT)\b",
                format!("my name is {BRAND_NAME}"),
            ),
            // Possessives.
            RuleEntry::new(r"\bAnthropic's\b", format!("{BRAND_NAME}'s developers'")),
            RuleEntry::new(r"\bOpenAI's\b", format!("{BRAND_NAME}'s developers'")),
            RuleEntry::new(r"\bClaude's\b", format!("{BRAND_NAME}'s")),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_all_valid() {
        assert!(default_rules().validate().is_ok());
    }

    #[test]
    fn test_validate_reports_indexed_errors() {
        let set = RuleSet {
            entries: vec![
                RuleEntry::new(r"[a-z+", "x"), // invalid
                RuleEntry::new(r"[a-z]+", "x"),
            ],
        };
        let errors = set.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, 0);
    }

    #[test]
    fn test_entry_deserializes_with_defaults() {
        let entry: RuleEntry = serde_json::from_str(r#"{"pattern":"x"}"#).unwrap();
        assert!(entry.enabled);
        assert_eq!(entry.replacement, "");
    }

    #[test]
    fn test_brand_is_not_a_forbidden_term() {
        let brand = BRAND_NAME.to_ascii_lowercase();
        for term in FORBIDDEN_TERMS {
            assert!(!brand.contains(&term.to_ascii_lowercase()));
        }
    }
}
