//! Validation Rules
//!
//! One function per rule. Each returns early when its rule is off, before
//! touching the schema.

use std::collections::HashSet;

use crate::parser::{InstructionNode, OptionNode, ParsedDocument};
use crate::schema::{InstructionKind, OptionKind, Schema};
use crate::validation::config::{DiagnosticConfig, Rule};
use crate::validation::engine::Diagnostic;

/// R1: instruction not present in the schema
pub fn check_unknown_instruction(
    instruction: &InstructionNode,
    schema: &Schema,
    config: &DiagnosticConfig,
) -> Option<Diagnostic> {
    let severity = config.level(Rule::UnknownInstruction).severity()?;

    if schema.find_instruction(&instruction.base_name).is_some() {
        return None;
    }

    Some(Diagnostic::new(
        Rule::UnknownInstruction,
        severity,
        instruction.range,
        format!(
            "Unknown instruction '{}'. This instruction is not recognized in the xTB schema.",
            instruction.name
        ),
    ))
}

/// R2: option key not defined for a known instruction
pub fn check_unknown_option(
    instruction: &InstructionNode,
    option: &OptionNode,
    schema: &Schema,
    config: &DiagnosticConfig,
) -> Option<Diagnostic> {
    let severity = config.level(Rule::UnknownOption).severity()?;

    // Unknown instructions are reported by R1 only
    let spec = schema.find_instruction(&instruction.base_name)?;
    if spec.find_option(&option.key).is_some() {
        return None;
    }

    Some(Diagnostic::new(
        Rule::UnknownOption,
        severity,
        option.range,
        format!(
            "Unknown option '{}' for instruction '{}'. This option is not recognized.",
            option.key, instruction.name
        ),
    ))
}

/// R3: operator differs from the option's preferred one
pub fn check_suspicious_operator(
    instruction: &InstructionNode,
    option: &OptionNode,
    schema: &Schema,
    config: &DiagnosticConfig,
) -> Option<Diagnostic> {
    let severity = config.level(Rule::SuspiciousOperator).severity()?;

    let preferred = schema
        .find_option(&instruction.base_name, &option.key)?
        .preferred_operator?;
    if option.operator == preferred {
        return None;
    }

    Some(Diagnostic::new(
        Rule::SuspiciousOperator,
        severity,
        option.range,
        format!(
            "Suspicious operator '{}' for option '{}'. The preferred operator is '{}'.",
            option.operator, option.key, preferred
        ),
    ))
}

/// R4: single-valued option repeated; every occurrence after the first is reported
pub fn check_duplicate_options(
    instruction: &InstructionNode,
    schema: &Schema,
    config: &DiagnosticConfig,
) -> Vec<Diagnostic> {
    let Some(severity) = config.level(Rule::DuplicateOption).severity() else {
        return Vec::new();
    };
    let Some(spec) = schema.find_instruction(&instruction.base_name) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut diagnostics = Vec::new();

    for option in &instruction.options {
        if seen.insert(option.key.as_str()) {
            continue;
        }

        let single = spec
            .find_option(&option.key)
            .is_some_and(|opt| opt.kind == OptionKind::Single);
        if single {
            diagnostics.push(Diagnostic::new(
                Rule::DuplicateOption,
                severity,
                option.range,
                format!(
                    "Duplicate option '{}'. This option should only appear once in '{}'.",
                    option.key, instruction.name
                ),
            ));
        }
    }

    diagnostics
}

/// R5: options outside any instruction
pub fn check_orphan_options(
    document: &ParsedDocument,
    config: &DiagnosticConfig,
) -> Vec<Diagnostic> {
    let Some(severity) = config.level(Rule::OrphanOption).severity() else {
        return Vec::new();
    };

    document
        .orphan_options
        .iter()
        .map(|option| {
            Diagnostic::new(
                Rule::OrphanOption,
                severity,
                option.range,
                format!(
                    "Orphan option '{}'. Options must appear inside an instruction block.",
                    option.key
                ),
            )
        })
        .collect()
}

/// R6: group instruction not closed by `$end`
pub fn check_missing_end(
    instruction: &InstructionNode,
    config: &DiagnosticConfig,
) -> Option<Diagnostic> {
    let severity = config.level(Rule::MissingEnd).severity()?;

    if instruction.kind != InstructionKind::Group || instruction.has_explicit_end {
        return None;
    }

    Some(Diagnostic::new(
        Rule::MissingEnd,
        severity,
        instruction.range,
        format!(
            "Group instruction '{}' is not terminated with '$end'. Consider adding '$end' for clarity.",
            instruction.name
        ),
    ))
}
