//! persona_filter - Persona rewrite engine for outbound model text
//!
//! Model output is untrusted and occasionally self-identifies with the
//! upstream vendor. This crate rewrites such text so every response speaks
//! with one consistent assistant identity:
//! - `rules` - ordered phrase-level rewrite rules plus the forbidden-term set
//! - `engine` - the rewrite pipeline (rules, fallback, normalization) and
//!   recursive payload rewriting
//! - `audit` - optional sink receiving pre-rewrite payloads verbatim

pub mod audit;
pub mod engine;
pub mod rules;

pub use audit::{AuditSink, LogAuditSink};
pub use engine::{FilterOutcome, PersonaFilter};
pub use rules::{RuleEntry, RuleSet, BRAND_NAME, FORBIDDEN_TERMS};
