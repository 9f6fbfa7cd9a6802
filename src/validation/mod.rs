//! Validation Engine
//!
//! Schema-driven checks over parsed documents, separated from parsing and
//! LSP concerns.

pub mod config;
pub mod engine;
pub mod rules;

pub use config::{DiagnosticConfig, DiagnosticSettings, Rule, RuleLevel};
pub use engine::{validate, validate_document, Diagnostic, ValidationResult, SOURCE};
