//! xcontrol Lexer
//!
//! Line-oriented classification: every physical line becomes exactly one
//! token, decided without looking at its neighbours.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::core::position::{utf16_column, utf16_len};
use crate::core::Range;
use crate::schema::OptionOperator;

// ASCII boundary: `$fixé` still names `fix`
static INSTRUCTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\$([a-zA-Z][a-zA-Z0-9_-]*)(?-u:\b)").unwrap());

static OPTION_COLON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([a-zA-Z][a-zA-Z0-9_-]*)\s*(:)\s*(.*)$").unwrap());

static OPTION_EQUALS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([a-zA-Z][a-zA-Z0-9_-]*)\s*(=)\s*(.*)$").unwrap());

/// Classification of a single line
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Empty or whitespace only
    Blank,
    /// `# ...`, text after the `#` kept verbatim
    Comment { text: String },
    /// `$name ...`
    Instruction {
        /// Name including the `$`
        full_name: String,
        base_name: String,
    },
    /// `key: value` or `key = value`
    Option(OptionToken),
    /// Anything else
    Unknown,
}

/// Payload of an option line
#[derive(Debug, Clone, PartialEq)]
pub struct OptionToken {
    pub key: String,
    pub operator: OptionOperator,
    /// Value with inline comment removed and whitespace trimmed
    pub value: String,
    pub key_range: Range,
    pub operator_range: Range,
    pub value_range: Range,
}

/// One classified line
#[derive(Debug, Clone, PartialEq)]
pub struct LineToken {
    pub line: u32,
    /// Whole-line range
    pub range: Range,
    pub kind: TokenKind,
}

/// Lex a whole document, one token per line.
///
/// Lines are split on `\n` with an optional preceding `\r`, so a trailing
/// terminator produces a final blank token.
pub fn lex(text: &str) -> Vec<LineToken> {
    text.split('\n')
        .enumerate()
        .map(|(idx, raw)| {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            lex_line(line, idx as u32)
        })
        .collect()
}

/// Classify a single line (without its terminator)
pub fn lex_line(text: &str, line: u32) -> LineToken {
    let range = Range::on_line(line, 0, utf16_len(text));
    let kind = classify(text, line);
    LineToken { line, range, kind }
}

fn classify(text: &str, line: u32) -> TokenKind {
    if text.trim().is_empty() {
        return TokenKind::Blank;
    }

    if let Some(comment) = text.trim_start().strip_prefix('#') {
        return TokenKind::Comment {
            text: comment.to_string(),
        };
    }

    if let Some(caps) = INSTRUCTION.captures(text) {
        let base_name = caps[1].to_string();
        return TokenKind::Instruction {
            full_name: format!("${}", base_name),
            base_name,
        };
    }

    if let Some(caps) = OPTION_COLON.captures(text) {
        return TokenKind::Option(option_token(text, line, &caps, OptionOperator::Colon));
    }

    if let Some(caps) = OPTION_EQUALS.captures(text) {
        return TokenKind::Option(option_token(text, line, &caps, OptionOperator::Equals));
    }

    TokenKind::Unknown
}

fn option_token(
    text: &str,
    line: u32,
    caps: &Captures<'_>,
    operator: OptionOperator,
) -> OptionToken {
    // Groups 1-3 always participate in a match of the option patterns
    let key = caps.get(1).map_or("", |m| m.as_str());
    let key_start = caps.get(1).map_or(0, |m| m.start());
    let op_start = caps.get(2).map_or(0, |m| m.start());
    let raw_value = caps.get(3).map_or("", |m| m.as_str());
    let value_start = caps.get(3).map_or(text.len(), |m| m.start());

    let key_col = utf16_column(text, key_start);
    let op_col = utf16_column(text, op_start);

    OptionToken {
        key: key.to_string(),
        operator,
        value: strip_inline_comment(raw_value),
        key_range: Range::on_line(line, key_col, key_col + utf16_len(key)),
        operator_range: Range::on_line(line, op_col, op_col + 1),
        value_range: Range::on_line(line, utf16_column(text, value_start), utf16_len(text)),
    }
}

/// Cut the value at the first `#` and trim what remains
fn strip_inline_comment(value: &str) -> String {
    match value.find('#') {
        Some(idx) => value[..idx].trim().to_string(),
        None => value.trim().to_string(),
    }
}
