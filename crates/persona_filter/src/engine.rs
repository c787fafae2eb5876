//! The rewrite pipeline.
//!
//! Three passes, in order:
//! 1. ordered phrase rules, each rewriting the output of the previous one
//! 2. forbidden-term fallback: any surviving whole-word vendor term becomes
//!    the brand name
//! 3. normalization of artifacts the deletions leave behind
//!
//! `rewrite` is total and, for text the rules leave clean, idempotent.

use std::sync::Arc;

use log::warn;
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex, RegexBuilder};
use serde_json::Value;

use crate::audit::AuditSink;
use crate::rules::{default_rules, RuleSet, BRAND_NAME, FORBIDDEN_TERMS};

fn case_insensitive(pattern: &str) -> Option<Regex> {
    match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("Skipping unbuildable rewrite pattern '{}': {}", pattern, e);
            None
        }
    }
}

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]{2,}").expect("static pattern"));
static SPACE_BEFORE_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+([.,!?;:])").expect("static pattern"));
static REPEATED_PUNCT: Lazy<[(Regex, &'static str); 4]> = Lazy::new(|| {
    [
        (Regex::new(r"\.{2,}").expect("static pattern"), "."),
        (Regex::new(r",{2,}").expect("static pattern"), ","),
        (Regex::new(r"!{2,}").expect("static pattern"), "!"),
        (Regex::new(r"\?{2,}").expect("static pattern"), "?"),
    ]
});
static COMMA_BEFORE_STOP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",[ \t]*([.!?])").expect("static pattern"));
static DANGLING_CONJUNCTION: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r",[ \t]*(?:but|and|or|so|yet|because|as)[ \t]*([.!?\n]|$)")
        .case_insensitive(true)
        .build()
        .expect("static pattern")
});
static DOUBLED_BRAND: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(&format!(r"\b{0}(?:[ \t,]+{0})+\b", BRAND_NAME))
        .case_insensitive(true)
        .build()
        .expect("static pattern")
});

/// Result of filtering one payload.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub value: Value,
    /// True when an admin bypass skipped rewriting entirely.
    pub bypassed: bool,
}

pub struct PersonaFilter {
    rules: Vec<(Regex, String)>,
    forbidden: Vec<Regex>,
    audit: Option<Arc<dyn AuditSink>>,
}

impl Default for PersonaFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl PersonaFilter {
    /// Engine with the built-in rule list.
    pub fn new() -> Self {
        Self::from_rules(&default_rules())
    }

    /// Engine with a caller-supplied rule list. Entries that fail to compile
    /// are skipped with a warning; order of the survivors is preserved.
    pub fn from_rules(rule_set: &RuleSet) -> Self {
        let rules = rule_set
            .entries
            .iter()
            .filter(|e| e.enabled)
            .filter_map(|e| case_insensitive(&e.pattern).map(|re| (re, e.replacement.clone())))
            .collect();
        let forbidden = FORBIDDEN_TERMS
            .iter()
            .filter_map(|term| case_insensitive(&format!(r"\b{}\b", regex::escape(term))))
            .collect();
        Self {
            rules,
            forbidden,
            audit: None,
        }
    }

    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    /// Rewrite one string. Total: never fails, always returns owned text.
    pub fn rewrite(&self, text: &str) -> String {
        let mut current = text.to_string();
        for (pattern, replacement) in &self.rules {
            current = pattern
                .replace_all(&current, NoExpand(replacement.as_str()))
                .into_owned();
        }
        for pattern in &self.forbidden {
            current = pattern
                .replace_all(&current, NoExpand(BRAND_NAME))
                .into_owned();
        }
        normalize(&current)
    }

    /// Recursively rewrite every string leaf of a JSON value in place,
    /// leaving structure and non-string leaves untouched.
    pub fn deep_rewrite(&self, value: &mut Value) {
        match value {
            Value::String(s) => *s = self.rewrite(s),
            Value::Array(items) => {
                for item in items {
                    self.deep_rewrite(item);
                }
            }
            Value::Object(map) => {
                for (_, v) in map.iter_mut() {
                    self.deep_rewrite(v);
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) => {}
        }
    }

    /// Filter one payload. The audit sink, when configured, receives the
    /// payload before any rewriting. `admin_bypass` must be a boolean the
    /// caller has already verified; the engine never inspects request
    /// metadata itself.
    pub fn apply(&self, mut value: Value, admin_bypass: bool) -> FilterOutcome {
        if let Some(sink) = &self.audit {
            if let Err(e) = sink.record(&value) {
                warn!("Audit sink failed, continuing: {}", e);
            }
        }
        if admin_bypass {
            return FilterOutcome {
                value,
                bypassed: true,
            };
        }
        self.deep_rewrite(&mut value);
        FilterOutcome {
            value,
            bypassed: false,
        }
    }
}

/// Fix artifacts introduced by clause deletions. Horizontal whitespace only,
/// so markdown line structure survives.
fn normalize(text: &str) -> String {
    let mut out = WHITESPACE_RUN.replace_all(text, " ").into_owned();
    out = DOUBLED_BRAND.replace_all(&out, BRAND_NAME).into_owned();
    out = DANGLING_CONJUNCTION.replace_all(&out, "$1").into_owned();
    out = COMMA_BEFORE_STOP.replace_all(&out, "$1").into_owned();
    out = SPACE_BEFORE_PUNCT.replace_all(&out, "$1").into_owned();
    for (pattern, collapsed) in REPEATED_PUNCT.iter() {
        out = pattern.replace_all(&out, *collapsed).into_owned();
    }
    out.trim().to_string()
}
