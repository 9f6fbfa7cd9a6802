//! Validation Engine
//!
//! Runs every rule over a parsed document. Stateless: the same document,
//! schema and config always produce the same diagnostics.

use crate::core::{Range, Severity};
use crate::parser::ParsedDocument;
use crate::schema::Schema;
use crate::validation::config::{DiagnosticConfig, Rule};
use crate::validation::rules;

/// Source tag attached to every diagnostic
pub const SOURCE: &str = "xtb-xcontrol";

/// A diagnostic message for a validation issue
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub rule: Rule,
    pub severity: Severity,
    pub range: Range,
    pub message: String,
}

impl Diagnostic {
    pub fn new(rule: Rule, severity: Severity, range: Range, message: String) -> Self {
        Self {
            rule,
            severity,
            range,
            message,
        }
    }

    /// Stable code, e.g. `xtb.missingEnd`
    pub fn code(&self) -> &'static str {
        self.rule.code()
    }

    pub fn source(&self) -> &'static str {
        SOURCE
    }
}

/// Result of validating a document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationResult {
    pub document: ParsedDocument,
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// No error-severity diagnostics
    pub fn is_valid(&self) -> bool {
        !self
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn count(&self, rule: Rule) -> usize {
        self.diagnostics.iter().filter(|d| d.rule == rule).count()
    }
}

/// Validate a parsed document against the schema.
///
/// Orphan options come first, then each instruction in source order:
/// unknown instruction, missing `$end`, duplicates, then per option the
/// unknown-option and operator checks.
pub fn validate(
    document: &ParsedDocument,
    schema: &Schema,
    config: &DiagnosticConfig,
) -> Vec<Diagnostic> {
    let mut diagnostics = rules::check_orphan_options(document, config);

    for instruction in &document.instructions {
        diagnostics.extend(rules::check_unknown_instruction(instruction, schema, config));
        diagnostics.extend(rules::check_missing_end(instruction, config));
        diagnostics.extend(rules::check_duplicate_options(instruction, schema, config));

        for option in &instruction.options {
            diagnostics.extend(rules::check_unknown_option(instruction, option, schema, config));
            diagnostics.extend(rules::check_suspicious_operator(
                instruction,
                option,
                schema,
                config,
            ));
        }
    }

    diagnostics
}

/// Parse and validate document text in one step
pub fn validate_document(
    text: &str,
    schema: &Schema,
    config: &DiagnosticConfig,
) -> ValidationResult {
    let document = crate::parser::parse(text, schema);
    let diagnostics = validate(&document, schema, config);
    log::debug!(
        "Validated {} instructions, {} diagnostics",
        document.instructions.len(),
        diagnostics.len()
    );

    ValidationResult {
        document,
        diagnostics,
    }
}
