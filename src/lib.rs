//! xcontrol Language Server
//!
//! Language Server Protocol support for xtb detailed input (xcontrol) files.
//!
//! This library provides:
//! - Line-oriented parsing into instructions and options
//! - Schema-driven validation with configurable rule severities
//! - LSP protocol implementation
//! - Configuration management

pub mod config;
pub mod core;
pub mod lsp;
pub mod parser;
pub mod schema;
pub mod validation;

// Re-exports for clean public API
pub use config::Config;
pub use parser::{parse, ParsedDocument};
pub use schema::Schema;
pub use validation::{validate, validate_document, Diagnostic, DiagnosticConfig, ValidationResult};
