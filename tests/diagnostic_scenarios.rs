//! End-to-end diagnostics against the built-in schema
use xcontrol_language_server::core::{Range, Severity};
use xcontrol_language_server::validation::{
    validate_document, DiagnosticConfig, DiagnosticSettings, Rule, RuleLevel, ValidationResult,
};
use xcontrol_language_server::Schema;

fn check(text: &str) -> ValidationResult {
    validate_document(text, Schema::builtin(), &DiagnosticConfig::default())
}

fn codes(result: &ValidationResult) -> Vec<&'static str> {
    result.diagnostics.iter().map(|d| d.code()).collect()
}

#[test]
fn test_unknown_instruction() {
    let result = check("$unknown_instruction\n   some_option: value\n$end");
    assert_eq!(codes(&result), ["xtb.unknownInstruction"]);
    assert_eq!(result.diagnostics[0].severity, Severity::Error);
    assert_eq!(result.diagnostics[0].range, Range::on_line(0, 0, 20));
}

#[test]
fn test_unknown_option() {
    let result = check("$fix\n   unknown_option: value\n$end");
    assert_eq!(codes(&result), ["xtb.unknownOption"]);
    assert_eq!(result.diagnostics[0].severity, Severity::Warning);
    assert_eq!(result.diagnostics[0].range.line(), 1);
}

#[test]
fn test_suspicious_operator() {
    let result = check("$wall\n   potential: logfermi\n   sphere = auto,30\n$end");
    assert_eq!(codes(&result), ["xtb.suspiciousOperator"]);
    let message = &result.diagnostics[0].message;
    assert!(message.contains("':'"), "{}", message);
    assert!(message.contains("'='"), "{}", message);
}

#[test]
fn test_duplicate_option_flags_second_occurrence() {
    let result = check("$wall\n   potential=logfermi\n   potential=polynomial\n$end");
    assert_eq!(codes(&result), ["xtb.duplicateOption"]);
    assert_eq!(result.diagnostics[0].range.line(), 2);
}

#[test]
fn test_orphan_option() {
    let result = check("$chrg 0\n\norphan_option: value\n\n$fix\n   atoms: 1-5\n$end");
    assert_eq!(codes(&result), ["xtb.orphanOption"]);
    assert_eq!(result.diagnostics[0].severity, Severity::Error);
    assert_eq!(result.diagnostics[0].range.line(), 2);
    assert_eq!(result.document.errors.len(), 1);
}

#[test]
fn test_missing_end_on_implicitly_closed_group() {
    let result = check("$fix\n   atoms: 1-5\n\n$constrain\n   distance: 1,2,2.5\n$end");
    assert_eq!(codes(&result), ["xtb.missingEnd"]);
    assert_eq!(result.diagnostics[0].severity, Severity::Hint);
    assert_eq!(result.diagnostics[0].range.line(), 0);
    assert!(result.diagnostics[0].message.contains("'$fix'"));
}

#[test]
fn test_well_formed_document_is_clean() {
    let text = "# xtb detailed input
$chrg 0
$spin 0

$fix
   atoms: 1-5
   elements: O
$end

$constrain
   distance: 1,2,2.5
   angle: 1,2,3,120.0 # degrees
$end

$wall
   potential=logfermi
   sphere: auto,all
   temp=300
$end

$opt
   maxcycle=200
   optlevel: tight
$end
";
    let result = check(text);
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert!(result.document.errors.is_empty());
    assert_eq!(result.document.instructions.len(), 6);
}

#[test]
fn test_crlf_document() {
    let result = check("$fix\r\n   atoms: 1-5\r\n   bogus: 1\r\n$end\r\n");
    assert_eq!(codes(&result), ["xtb.unknownOption"]);
    assert_eq!(result.diagnostics[0].range, Range::on_line(2, 0, 11));
}

#[test]
fn test_unknown_lines_are_silent() {
    let result = check("$fix\n   this is not an option\n   atoms: 1\n$end\nstray text");
    assert!(result.diagnostics.is_empty());
    assert!(result.document.errors.is_empty());
}

#[test]
fn test_unmatched_end_is_a_parse_warning_only() {
    let result = check("$chrg 0\n$end");
    assert!(result.diagnostics.is_empty());
    assert_eq!(result.document.errors.len(), 1);
    assert_eq!(result.document.errors[0].severity, Severity::Warning);
}

#[test]
fn test_settings_change_severity_and_disable_rules() {
    let settings = DiagnosticSettings {
        missing_end: Some("Error".to_string()),
        orphan_option: Some("off".to_string()),
        unknown_option: Some("not-a-level".to_string()),
        ..Default::default()
    };
    let config = DiagnosticConfig::from_settings(&settings);
    assert_eq!(config.level(Rule::UnknownOption), RuleLevel::Warning);

    let result = validate_document(
        "stray: 1\n$fix\n   atoms: 1\n   bogus: 2",
        Schema::builtin(),
        &config,
    );
    assert_eq!(codes(&result), ["xtb.missingEnd", "xtb.unknownOption"]);
    assert_eq!(result.diagnostics[0].severity, Severity::Error);
    assert_eq!(result.diagnostics[1].severity, Severity::Warning);
}

#[test]
fn test_multiple_issues() {
    let text = "orphan_before: value

$unknown
   orphan_inside: value

$fix
   atoms: 1-5
   unknown_opt: test

$wall
   potential: wrong_operator
   temp=300
   temp=350";

    let result = check(text);
    for rule in [
        Rule::OrphanOption,
        Rule::UnknownInstruction,
        Rule::UnknownOption,
        Rule::SuspiciousOperator,
        Rule::DuplicateOption,
    ] {
        assert_eq!(result.count(rule), 1, "{}", rule.name());
    }
    // $unknown, $fix and $wall are all left open
    assert_eq!(result.count(Rule::MissingEnd), 3);
    assert!(!result.is_valid());
}
