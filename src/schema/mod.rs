//! Instruction Schema
//!
//! Static catalog of known `$instructions`, their kind and their options.

pub mod registry;
pub mod types;

pub use registry::Schema;
pub use types::{InstructionKind, InstructionSpec, OptionKind, OptionOperator, OptionSpec};
