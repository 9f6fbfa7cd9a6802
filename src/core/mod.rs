//! Core Types
//!
//! Positions, ranges and severities shared by the lexer, parser,
//! validation engine and LSP layer.

pub mod position;
pub mod severity;

pub use position::{Position, Range};
pub use severity::Severity;
