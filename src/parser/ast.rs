//! Document Structure for xcontrol
//!
//! Instructions holding their options, plus everything that could not be
//! attributed to an instruction. Built in a single forward pass over the
//! lexed lines; no validation logic lives here.

use crate::core::{Range, Severity};
use crate::parser::lexer::{LineToken, OptionToken, TokenKind};
use crate::schema::{InstructionKind, OptionOperator, Schema};

/// A `key operator value` line
#[derive(Debug, Clone, PartialEq)]
pub struct OptionNode {
    pub key: String,
    pub operator: OptionOperator,
    pub value: String,
    /// Whole-line range
    pub range: Range,
    pub key_range: Range,
}

/// A `$instruction` and the options found in its body
#[derive(Debug, Clone, PartialEq)]
pub struct InstructionNode {
    /// Name including the `$`
    pub name: String,
    pub base_name: String,
    pub kind: InstructionKind,
    /// Range of the opening line
    pub range: Range,
    pub options: Vec<OptionNode>,
    pub body_start_line: u32,
    pub body_end_line: u32,
    pub has_explicit_end: bool,
}

impl InstructionNode {
    /// Last line owned by the instruction, including its `$end` line
    pub fn last_line(&self) -> u32 {
        if self.has_explicit_end {
            self.body_end_line + 1
        } else {
            self.body_end_line
        }
    }

    /// Whether `line` lies between the opening line and the closing line
    pub fn spans_line(&self, line: u32) -> bool {
        self.range.line() <= line && line <= self.last_line()
    }

    /// Options with the given key, in source order
    pub fn options_with_key<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a OptionNode> {
        self.options.iter().filter(move |opt| opt.key == key)
    }
}

/// Structural problem found while parsing
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub range: Range,
    pub severity: Severity,
}

/// Result of parsing one document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedDocument {
    pub instructions: Vec<InstructionNode>,
    /// Options found outside any instruction
    pub orphan_options: Vec<OptionNode>,
    pub errors: Vec<ParseError>,
}

impl ParsedDocument {
    pub fn instructions_of_kind(
        &self,
        kind: InstructionKind,
    ) -> impl Iterator<Item = &InstructionNode> {
        self.instructions.iter().filter(move |inst| inst.kind == kind)
    }

    /// First instruction with the given base name
    pub fn find_instruction(&self, base_name: &str) -> Option<&InstructionNode> {
        self.instructions.iter().find(|inst| inst.base_name == base_name)
    }

    /// Instruction whose opening..closing span contains `line`
    pub fn instruction_at_line(&self, line: u32) -> Option<&InstructionNode> {
        self.instructions.iter().find(|inst| inst.spans_line(line))
    }
}

/// Assemble lexed lines into a document.
///
/// The only state carried between lines is the currently open instruction.
pub fn build_document(tokens: &[LineToken], schema: &Schema) -> ParsedDocument {
    let mut builder = Builder {
        schema,
        document: ParsedDocument::default(),
        current: None,
    };

    for token in tokens {
        match &token.kind {
            TokenKind::Instruction {
                full_name,
                base_name,
            } => builder.instruction(token, full_name, base_name),
            TokenKind::Option(option) => builder.option(token, option),
            // Unknown lines are tolerated silently
            TokenKind::Blank | TokenKind::Comment { .. } | TokenKind::Unknown => {}
        }
    }

    let last_line = tokens.len().saturating_sub(1) as u32;
    builder.close_current(last_line, false);
    builder.document
}

struct Builder<'s> {
    schema: &'s Schema,
    document: ParsedDocument,
    current: Option<InstructionNode>,
}

impl Builder<'_> {
    fn close_current(&mut self, body_end_line: u32, has_explicit_end: bool) {
        if let Some(mut instruction) = self.current.take() {
            instruction.body_end_line = body_end_line;
            instruction.has_explicit_end = has_explicit_end;
            self.document.instructions.push(instruction);
        }
    }

    fn instruction(&mut self, token: &LineToken, full_name: &str, base_name: &str) {
        let line = token.line;

        if base_name == "end" {
            if self.current.is_some() {
                self.close_current(line.saturating_sub(1), true);
            } else {
                self.document.errors.push(ParseError {
                    message: "$end without matching group instruction".to_string(),
                    range: token.range,
                    severity: Severity::Warning,
                });
            }
            return;
        }

        self.close_current(line.saturating_sub(1), false);

        // Unknown instructions are tracked as groups so their body stays attached
        let kind = self
            .schema
            .instruction_kind(base_name)
            .unwrap_or(InstructionKind::Group);

        let instruction = InstructionNode {
            name: full_name.to_string(),
            base_name: base_name.to_string(),
            kind,
            range: token.range,
            options: Vec::new(),
            body_start_line: line,
            body_end_line: line,
            has_explicit_end: false,
        };

        if kind == InstructionKind::Logical {
            self.document.instructions.push(instruction);
        } else {
            self.current = Some(instruction);
        }
    }

    fn option(&mut self, token: &LineToken, option: &OptionToken) {
        let node = OptionNode {
            key: option.key.clone(),
            operator: option.operator,
            value: option.value.clone(),
            range: token.range,
            key_range: option.key_range,
        };

        match self.current.as_mut() {
            Some(instruction) => instruction.options.push(node),
            None => {
                self.document.errors.push(ParseError {
                    message: format!(
                        "Option '{}' appears outside of any instruction block",
                        option.key
                    ),
                    range: option.key_range,
                    severity: Severity::Error,
                });
                self.document.orphan_options.push(node);
            }
        }
    }
}
