//! xcontrol Parser
//!
//! Lexing and structural parsing of xtb detailed input files.

pub mod ast;
pub mod lexer;

pub use ast::{InstructionNode, OptionNode, ParseError, ParsedDocument};
pub use lexer::{lex, lex_line, LineToken, OptionToken, TokenKind};

use crate::schema::Schema;

/// Parse document text into instructions, orphan options and parse errors
///
/// Never fails: any input produces some document. The schema is only
/// consulted for instruction kinds.
pub fn parse(text: &str, schema: &Schema) -> ParsedDocument {
    let tokens = lexer::lex(text);
    ast::build_document(&tokens, schema)
}
