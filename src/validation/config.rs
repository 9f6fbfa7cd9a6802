//! Diagnostic Rule Configuration
//!
//! Per-rule severities, resolved from user settings merged over the
//! built-in defaults. A `DiagnosticConfig` is immutable: a settings change
//! builds a new one.

use serde::Deserialize;

use crate::core::Severity;

/// The six validation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    UnknownInstruction,
    UnknownOption,
    SuspiciousOperator,
    DuplicateOption,
    OrphanOption,
    MissingEnd,
}

impl Rule {
    pub const ALL: [Rule; 6] = [
        Rule::UnknownInstruction,
        Rule::UnknownOption,
        Rule::SuspiciousOperator,
        Rule::DuplicateOption,
        Rule::OrphanOption,
        Rule::MissingEnd,
    ];

    /// Setting name, e.g. `unknownInstruction`
    pub fn name(&self) -> &'static str {
        match self {
            Rule::UnknownInstruction => "unknownInstruction",
            Rule::UnknownOption => "unknownOption",
            Rule::SuspiciousOperator => "suspiciousOperator",
            Rule::DuplicateOption => "duplicateOption",
            Rule::OrphanOption => "orphanOption",
            Rule::MissingEnd => "missingEnd",
        }
    }

    /// Stable diagnostic code, e.g. `xtb.unknownInstruction`
    pub fn code(&self) -> &'static str {
        match self {
            Rule::UnknownInstruction => "xtb.unknownInstruction",
            Rule::UnknownOption => "xtb.unknownOption",
            Rule::SuspiciousOperator => "xtb.suspiciousOperator",
            Rule::DuplicateOption => "xtb.duplicateOption",
            Rule::OrphanOption => "xtb.orphanOption",
            Rule::MissingEnd => "xtb.missingEnd",
        }
    }

    pub fn from_code(code: &str) -> Option<Rule> {
        Rule::ALL.into_iter().find(|rule| rule.code() == code)
    }

    pub fn default_level(&self) -> RuleLevel {
        match self {
            Rule::UnknownInstruction | Rule::OrphanOption => RuleLevel::Error,
            Rule::MissingEnd => RuleLevel::Hint,
            Rule::UnknownOption | Rule::SuspiciousOperator | Rule::DuplicateOption => {
                RuleLevel::Warning
            }
        }
    }
}

/// Configured level of a rule: a severity, or disabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleLevel {
    Off,
    Error,
    Warning,
    Info,
    Hint,
}

impl RuleLevel {
    /// Parse a setting value (case-insensitive). `None` for unrecognized text.
    pub fn parse(value: &str) -> Option<RuleLevel> {
        match value.trim().to_ascii_lowercase().as_str() {
            "off" => Some(RuleLevel::Off),
            "error" => Some(RuleLevel::Error),
            "warning" => Some(RuleLevel::Warning),
            "info" | "information" => Some(RuleLevel::Info),
            "hint" => Some(RuleLevel::Hint),
            _ => None,
        }
    }

    /// Severity to report with, or `None` when the rule is off
    pub fn severity(&self) -> Option<Severity> {
        match self {
            RuleLevel::Off => None,
            RuleLevel::Error => Some(Severity::Error),
            RuleLevel::Warning => Some(Severity::Warning),
            RuleLevel::Info => Some(Severity::Info),
            RuleLevel::Hint => Some(Severity::Hint),
        }
    }
}

/// Fully resolved rule levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticConfig {
    pub unknown_instruction: RuleLevel,
    pub unknown_option: RuleLevel,
    pub suspicious_operator: RuleLevel,
    pub duplicate_option: RuleLevel,
    pub orphan_option: RuleLevel,
    pub missing_end: RuleLevel,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        Self {
            unknown_instruction: Rule::UnknownInstruction.default_level(),
            unknown_option: Rule::UnknownOption.default_level(),
            suspicious_operator: Rule::SuspiciousOperator.default_level(),
            duplicate_option: Rule::DuplicateOption.default_level(),
            orphan_option: Rule::OrphanOption.default_level(),
            missing_end: Rule::MissingEnd.default_level(),
        }
    }
}

impl DiagnosticConfig {
    pub fn level(&self, rule: Rule) -> RuleLevel {
        match rule {
            Rule::UnknownInstruction => self.unknown_instruction,
            Rule::UnknownOption => self.unknown_option,
            Rule::SuspiciousOperator => self.suspicious_operator,
            Rule::DuplicateOption => self.duplicate_option,
            Rule::OrphanOption => self.orphan_option,
            Rule::MissingEnd => self.missing_end,
        }
    }

    /// Copy with one rule changed
    pub fn with_level(mut self, rule: Rule, level: RuleLevel) -> Self {
        let slot = match rule {
            Rule::UnknownInstruction => &mut self.unknown_instruction,
            Rule::UnknownOption => &mut self.unknown_option,
            Rule::SuspiciousOperator => &mut self.suspicious_operator,
            Rule::DuplicateOption => &mut self.duplicate_option,
            Rule::OrphanOption => &mut self.orphan_option,
            Rule::MissingEnd => &mut self.missing_end,
        };
        *slot = level;
        self
    }

    /// Resolve user settings; absent or unrecognized values take the rule default
    pub fn from_settings(settings: &DiagnosticSettings) -> Self {
        Rule::ALL
            .into_iter()
            .fold(Self::default(), |config, rule| match settings.get(rule) {
                None => config,
                Some(raw) => match RuleLevel::parse(raw) {
                    Some(level) => config.with_level(rule, level),
                    None => {
                        log::warn!(
                            "Unrecognized severity '{}' for xtbXcontrol.diagnostics.{}; using '{:?}'",
                            raw,
                            rule.name(),
                            rule.default_level()
                        );
                        config
                    }
                },
            })
    }
}

/// Raw, string-valued settings as supplied by a client or settings file
/// (`xtbXcontrol.diagnostics.*`)
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagnosticSettings {
    pub unknown_instruction: Option<String>,
    pub unknown_option: Option<String>,
    pub suspicious_operator: Option<String>,
    pub duplicate_option: Option<String>,
    pub orphan_option: Option<String>,
    pub missing_end: Option<String>,
}

impl DiagnosticSettings {
    pub fn get(&self, rule: Rule) -> Option<&str> {
        match rule {
            Rule::UnknownInstruction => self.unknown_instruction.as_deref(),
            Rule::UnknownOption => self.unknown_option.as_deref(),
            Rule::SuspiciousOperator => self.suspicious_operator.as_deref(),
            Rule::DuplicateOption => self.duplicate_option.as_deref(),
            Rule::OrphanOption => self.orphan_option.as_deref(),
            Rule::MissingEnd => self.missing_end.as_deref(),
        }
    }

    /// Values from `self`, falling back to `base` where absent
    pub fn merged_over(&self, base: &DiagnosticSettings) -> DiagnosticSettings {
        let pick = |ours: &Option<String>, theirs: &Option<String>| {
            ours.clone().or_else(|| theirs.clone())
        };
        DiagnosticSettings {
            unknown_instruction: pick(&self.unknown_instruction, &base.unknown_instruction),
            unknown_option: pick(&self.unknown_option, &base.unknown_option),
            suspicious_operator: pick(&self.suspicious_operator, &base.suspicious_operator),
            duplicate_option: pick(&self.duplicate_option, &base.duplicate_option),
            orphan_option: pick(&self.orphan_option, &base.orphan_option),
            missing_end: pick(&self.missing_end, &base.missing_end),
        }
    }

    /// Read settings from a JSON value, ignoring anything malformed
    pub fn from_json(value: &serde_json::Value) -> DiagnosticSettings {
        if value.is_null() {
            return DiagnosticSettings::default();
        }
        serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            log::warn!("Ignoring malformed diagnostic settings: {}", e);
            DiagnosticSettings::default()
        })
    }
}
