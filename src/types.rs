/// Core domain types shared by the rewrite walker, the aggregator and the report.
use std::path::PathBuf;

use serde::Serialize;

/// One unmatched color occurrence. Produced exactly once per occurrence,
/// never deduplicated within a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Canonical hex form of the literal, e.g. `#00ff00` for `rgb(0 255 0)`.
    pub color: String,
    /// One-based column of the color literal, counted in characters.
    pub column: u32,
    /// Stylesheet the literal was found in.
    pub file: PathBuf,
    /// One-based line of the color literal.
    pub line: u32,
    /// The literal exactly as written in the source.
    pub literal: String,
    /// Property of the declaration holding the literal.
    pub property: String,
}

impl Diagnostic {
    /// Human-readable message used in the text report.
    pub fn message(&self) -> String {
        return format!(
            "`{}` in `{}` has no matching theme variable",
            self.literal, self.property
        );
    }
}

/// One-based line and character column in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    /// One-based column, counted in characters.
    pub column: u32,
    /// One-based line number.
    pub line: u32,
}

/// A top-level variable whose value is not a color literal the table can use,
/// e.g. `@primary: darken(@red, 10%)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedVariable {
    /// Stylesheet declaring the variable.
    pub file: PathBuf,
    /// Variable name without its sigil.
    pub name: String,
    /// Where the declaration starts.
    pub position: Position,
    /// Raw right-hand side text.
    pub value: String,
}
