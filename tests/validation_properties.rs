//! Property-based tests for the parse/validate pipeline
//!
//! Documents are generated line by line from a mix of known and unknown
//! instructions, options with either operator, comments and junk.

use proptest::prelude::*;
use xcontrol_language_server::parser::{lex, parse, TokenKind};
use xcontrol_language_server::schema::InstructionKind;
use xcontrol_language_server::validation::{validate, DiagnosticConfig, Rule, RuleLevel};
use xcontrol_language_server::Schema;

fn identifier_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        // Known instruction names and option keys
        Just("fix".to_string()),
        Just("wall".to_string()),
        Just("constrain".to_string()),
        Just("chrg".to_string()),
        Just("atoms".to_string()),
        Just("potential".to_string()),
        Just("temp".to_string()),
        Just("distance".to_string()),
        // Anything else
        "[a-zA-Z][a-zA-Z0-9_-]{0,8}",
    ]
}

fn line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        // Blank
        "[ \t]{0,3}",
        // Comment
        "[ ]{0,2}#[a-z ]{0,10}",
        // Instruction, sometimes with a trailing value
        ("[ ]{0,2}", identifier_strategy(), "( [0-9]{1,2})?")
            .prop_map(|(indent, name, rest)| format!("{}${}{}", indent, name, rest)),
        Just("$end".to_string()),
        // Option
        (
            "[ ]{0,4}",
            identifier_strategy(),
            prop_oneof![Just(":"), Just("="), Just(" : "), Just(" = ")],
            "[a-z0-9,.]{0,8}( #[a-z]{0,4})?",
        )
            .prop_map(|(indent, key, op, value)| format!("{}{}{}{}", indent, key, op, value)),
        // Junk
        "[a-z !?]{1,12}",
    ]
}

fn document_strategy() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(line_strategy(), 0..30),
        prop_oneof![Just("\n"), Just("\r\n")],
    )
        .prop_map(|(lines, terminator)| lines.join(terminator))
}

fn off(rule: Rule) -> DiagnosticConfig {
    DiagnosticConfig::default().with_level(rule, RuleLevel::Off)
}

proptest! {
    #[test]
    fn parse_and_validate_are_pure(text in document_strategy()) {
        let schema = Schema::builtin();
        let config = DiagnosticConfig::default();

        let first = parse(&text, schema);
        let second = parse(&text, schema);
        prop_assert_eq!(&first, &second);

        prop_assert_eq!(
            validate(&first, schema, &config),
            validate(&second, schema, &config)
        );
    }

    #[test]
    fn one_token_per_line(text in "(\\PC|\r|\n){0,200}") {
        let tokens = lex(&text);
        prop_assert_eq!(tokens.len(), text.split('\n').count());

        // Arbitrary text never fails
        let document = parse(&text, Schema::builtin());
        let _ = validate(&document, Schema::builtin(), &DiagnosticConfig::default());
    }

    #[test]
    fn options_are_partitioned(text in document_strategy()) {
        let option_lines: Vec<u32> = lex(&text)
            .iter()
            .filter(|token| matches!(token.kind, TokenKind::Option(_)))
            .map(|token| token.line)
            .collect();

        let document = parse(&text, Schema::builtin());
        let mut owned: Vec<u32> = document
            .instructions
            .iter()
            .flat_map(|inst| inst.options.iter())
            .chain(document.orphan_options.iter())
            .map(|option| option.range.line())
            .collect();
        owned.sort_unstable();

        prop_assert_eq!(owned, option_lines);
    }

    #[test]
    fn instructions_close_where_expected(text in document_strategy()) {
        let tokens = lex(&text);
        let instruction_lines: Vec<u32> = tokens
            .iter()
            .filter(|token| matches!(token.kind, TokenKind::Instruction { .. }))
            .map(|token| token.line)
            .collect();
        let last_line = tokens.len() as u32 - 1;

        let document = parse(&text, Schema::builtin());
        for inst in &document.instructions {
            let opening = inst.range.line();
            prop_assert_eq!(inst.body_start_line, opening);

            match inst.kind {
                InstructionKind::Logical => {
                    prop_assert_eq!(inst.body_end_line, opening);
                    prop_assert!(!inst.has_explicit_end);
                }
                _ => {
                    let next = instruction_lines.iter().copied().find(|&line| line > opening);
                    match next {
                        Some(next) => {
                            prop_assert_eq!(inst.body_end_line, next - 1);
                        }
                        None => {
                            prop_assert!(!inst.has_explicit_end);
                            prop_assert_eq!(inst.body_end_line, last_line);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn disabling_a_rule_removes_only_its_diagnostics(text in document_strategy()) {
        let schema = Schema::builtin();
        let document = parse(&text, schema);
        let all = validate(&document, schema, &DiagnosticConfig::default());

        for rule in Rule::ALL {
            let expected: Vec<_> = all.iter().filter(|d| d.rule != rule).cloned().collect();
            prop_assert_eq!(validate(&document, schema, &off(rule)), expected);
        }
    }

    #[test]
    fn repeated_list_options_are_exempt(count in 2usize..6, value in "[0-9]{1,3}") {
        let body: String = (0..count).map(|_| format!("   atoms: {}\n", value)).collect();
        let text = format!("$fix\n{}$end", body);

        let document = parse(&text, Schema::builtin());
        let diagnostics = validate(&document, Schema::builtin(), &DiagnosticConfig::default());
        prop_assert!(diagnostics.iter().all(|d| d.rule != Rule::DuplicateOption));
    }

    #[test]
    fn repeated_single_options_flag_all_but_first(count in 2usize..6, value in "[0-9]{1,3}") {
        let body: String = (0..count).map(|_| format!("   temp={}\n", value)).collect();
        let text = format!("$wall\n{}$end", body);

        let document = parse(&text, Schema::builtin());
        let config = DiagnosticConfig::default();
        let duplicates: Vec<u32> = validate(&document, Schema::builtin(), &config)
            .iter()
            .filter(|d| d.rule == Rule::DuplicateOption)
            .map(|d| d.range.line())
            .collect();

        // Line 1 holds the first occurrence
        prop_assert_eq!(duplicates, (2..=count as u32).collect::<Vec<_>>());
    }
}
