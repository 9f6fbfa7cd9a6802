//! Schema Registry
//!
//! Read-only instruction catalog with O(1) lookup by name. Built once and
//! shared between every document that gets validated.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;

use super::types::{InstructionKind, InstructionSpec, OptionSpec, SchemaFile};

const EMBEDDED_SCHEMA: &str = include_str!("../../resources/schema/xtb.xcontrol-schema.toml");

static BUILTIN: Lazy<Schema> = Lazy::new(|| match Schema::from_toml_str(EMBEDDED_SCHEMA) {
    Ok(schema) => schema,
    Err(e) => {
        log::error!("Failed to parse embedded xtb schema: {:#}. Using an empty schema.", e);
        Schema::default()
    }
});

/// Immutable schema of known instructions and their options
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub name: String,
    pub version: Option<String>,
    pub description: Option<String>,
    instructions: Vec<InstructionSpec>,
    index: HashMap<String, usize>,
}

impl From<SchemaFile> for Schema {
    fn from(file: SchemaFile) -> Self {
        let mut index = HashMap::with_capacity(file.instructions.len());

        for (position, spec) in file.instructions.iter().enumerate() {
            if index.contains_key(&spec.name) {
                // First definition wins, same as a front-to-back scan
                log::warn!(
                    "Schema '{}' defines instruction '{}' more than once; keeping the first",
                    file.schema.name,
                    spec.name
                );
                continue;
            }
            index.insert(spec.name.clone(), position);
        }

        Self {
            name: file.schema.name,
            version: file.schema.version,
            description: file.schema.description,
            instructions: file.instructions,
            index,
        }
    }
}

impl Schema {
    /// The xtb schema compiled into the binary
    pub fn builtin() -> &'static Schema {
        &BUILTIN
    }

    /// Parse a schema from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: SchemaFile = toml::from_str(text).context("Invalid schema TOML")?;
        Ok(Self::from(file))
    }

    /// Load a schema file from disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema file {}", path.display()))?;
        let schema = Self::from_toml_str(&text)
            .with_context(|| format!("Failed to load schema file {}", path.display()))?;
        log::info!(
            "Loaded schema '{}' with {} instructions from {}",
            schema.name,
            schema.instructions.len(),
            path.display()
        );
        Ok(schema)
    }

    /// All instruction definitions in declaration order
    pub fn instructions(&self) -> &[InstructionSpec] {
        &self.instructions
    }

    /// Find instruction by base name (without `$`)
    pub fn find_instruction(&self, name: &str) -> Option<&InstructionSpec> {
        self.index.get(name).map(|&i| &self.instructions[i])
    }

    /// Find an option definition inside a named instruction
    pub fn find_option(&self, instruction: &str, key: &str) -> Option<&OptionSpec> {
        self.find_instruction(instruction)?.find_option(key)
    }

    /// Declared kind of an instruction, if known
    pub fn instruction_kind(&self, name: &str) -> Option<InstructionKind> {
        self.find_instruction(name).map(|spec| spec.kind)
    }
}
