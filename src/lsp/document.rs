use crate::parser::{self, ParsedDocument};
use crate::schema::Schema;

/// State for each open document
#[derive(Debug)]
pub struct DocumentState {
    pub content: String,
    pub version: Option<i32>,
    /// Parse of `content`, refreshed on every change
    pub document: ParsedDocument,
}

impl DocumentState {
    pub fn new(content: String, version: Option<i32>, schema: &Schema) -> Self {
        let document = parser::parse(&content, schema);
        Self {
            content,
            version,
            document,
        }
    }

    /// Text of line `idx` without its terminator
    pub fn line(&self, idx: u32) -> Option<&str> {
        self.content
            .split('\n')
            .nth(idx as usize)
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
    }
}
