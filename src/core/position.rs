//! Document Positions
//!
//! Zero-based line/character addressing. Characters are counted in UTF-16
//! code units so ranges can be handed to an LSP client unchanged.

/// A position in a text document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// A half-open range confined to a single line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Range {
    pub start: Position,
    /// Exclusive
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Range on `line` spanning `[start, end)`
    pub fn on_line(line: u32, start: u32, end: u32) -> Self {
        Self {
            start: Position::new(line, start),
            end: Position::new(line, end),
        }
    }

    pub fn line(&self) -> u32 {
        self.start.line
    }

    /// Whether `pos` falls inside the range (end exclusive, except for empty ranges)
    pub fn contains(&self, pos: Position) -> bool {
        if self.start == self.end {
            return pos == self.start;
        }
        self.start <= pos && pos < self.end
    }
}

/// Convert a byte offset within `line` into a UTF-16 column.
///
/// Offsets past the end of the line clamp to the line length.
pub fn utf16_column(line: &str, byte_offset: usize) -> u32 {
    let end = byte_offset.min(line.len());
    line[..end].encode_utf16().count() as u32
}

/// UTF-16 length of a line
pub fn utf16_len(line: &str) -> u32 {
    line.encode_utf16().count() as u32
}

/// Convert a UTF-16 column back into a byte offset within `line`.
pub fn byte_offset(line: &str, column: u32) -> usize {
    let mut units = 0u32;
    for (idx, ch) in line.char_indices() {
        if units >= column {
            return idx;
        }
        units += ch.len_utf16() as u32;
    }
    line.len()
}
