//! Schema Types
//!
//! Instruction and option definitions, deserialized straight from the schema TOML.

use serde::Deserialize;
use std::fmt;

/// Root schema file structure (matches TOML)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SchemaFile {
    pub schema: SchemaMeta,
    #[serde(default)]
    pub instructions: Vec<InstructionSpec>,
}

/// Schema metadata
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SchemaMeta {
    pub name: String,
    pub version: Option<String>,
    pub description: Option<String>,
}

/// Kind of a `$instruction`
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InstructionKind {
    /// Single line, no body
    Logical,
    /// Has a body of options, expects `$end`
    Group,
    /// The `$end` marker
    End,
}

impl InstructionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstructionKind::Logical => "logical",
            InstructionKind::Group => "group",
            InstructionKind::End => "end",
        }
    }
}

/// Whether an option may be repeated inside one block
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Single,
    List,
}

impl OptionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionKind::Single => "single",
            OptionKind::List => "list",
        }
    }
}

/// Assignment operator between an option key and its value
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Hash)]
pub enum OptionOperator {
    #[serde(rename = "=")]
    Equals,
    #[serde(rename = ":")]
    Colon,
}

impl OptionOperator {
    pub fn as_char(&self) -> char {
        match self {
            OptionOperator::Equals => '=',
            OptionOperator::Colon => ':',
        }
    }
}

impl fmt::Display for OptionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Instruction definition
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct InstructionSpec {
    /// Name without the leading `$`
    pub name: String,
    pub kind: InstructionKind,
    pub description: Option<String>,
    #[serde(default)]
    pub options: Vec<OptionSpec>,
}

/// Option definition within an instruction
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OptionSpec {
    pub key: String,
    pub kind: OptionKind,
    #[serde(rename = "operator", default)]
    pub preferred_operator: Option<OptionOperator>,
    pub description: Option<String>,
}

impl InstructionSpec {
    /// Find option definition by key (case-sensitive)
    pub fn find_option(&self, key: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|opt| opt.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_instruction() {
        let toml_text = r#"
            [schema]
            name = "test"

            [[instructions]]
            name = "wall"
            kind = "group"

            [[instructions.options]]
            key = "potential"
            kind = "single"
            operator = "="

            [[instructions.options]]
            key = "sphere"
            kind = "single"
        "#;

        let file: SchemaFile = toml::from_str(toml_text).unwrap();
        assert_eq!(file.schema.name, "test");
        assert_eq!(file.instructions.len(), 1);

        let wall = &file.instructions[0];
        assert_eq!(wall.kind, InstructionKind::Group);
        assert_eq!(
            wall.find_option("potential").unwrap().preferred_operator,
            Some(OptionOperator::Equals)
        );
        assert_eq!(wall.find_option("sphere").unwrap().preferred_operator, None);
        assert!(wall.find_option("Potential").is_none());
    }

    #[test]
    fn test_rejects_unknown_operator() {
        let toml_text = r#"
            [schema]
            name = "test"

            [[instructions]]
            name = "wall"
            kind = "group"

            [[instructions.options]]
            key = "potential"
            kind = "single"
            operator = "=>"
        "#;

        assert!(toml::from_str::<SchemaFile>(toml_text).is_err());
    }

    #[test]
    fn test_operator_display() {
        assert_eq!(OptionOperator::Equals.to_string(), "=");
        assert_eq!(OptionOperator::Colon.to_string(), ":");
    }
}
