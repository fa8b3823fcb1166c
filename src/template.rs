//! Content splitting and template re-assembly of rewritten output.
use regex::Regex;

use crate::document::{Document, StatementKind};
use crate::error::Error;

/// A `{{ name }}` placeholder.
const PLACEHOLDER: &str = r"\{\{\s*([A-Za-z_][\w-]*)\s*\}\}";

/// Names a template may use, in lookup order.
const SECTION_NAMES: [(&str, Section); 3] = [
    ("basic", Section::Basic),
    ("colors", Section::Colors),
    ("imports", Section::Imports),
];

/// One of the three buckets the rewritten content is split into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Statements no rewrite touched.
    Basic,
    /// Statements containing at least one rewritten color.
    Colors,
    /// `@import`, `@use` and `@forward` statements.
    Imports,
}

/// The rewritten content split into buckets, each in source order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Sections {
    /// Statements no rewrite touched.
    pub basic: String,
    /// Statements containing a rewritten color.
    pub colors: String,
    /// Import statements.
    pub imports: String,
}

/// A parsed output template: literal text interleaved with section placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// Pieces in template order.
    segments: Vec<Segment>,
}

/// A piece of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Text copied to the output as is.
    Literal(String),
    /// Replaced by the named section.
    Placeholder(Section),
}

impl Sections {
    /// Text of one bucket.
    fn get(&self, section: Section) -> &str {
        return match section {
            Section::Basic => &self.basic,
            Section::Colors => &self.colors,
            Section::Imports => &self.imports,
        };
    }
}

impl Template {
    /// Parse template text. Every placeholder must name a known section.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownPlaceholder` for a placeholder with any other name.
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded placeholder regex is invalid (compile-time invariant).
    pub fn parse(text: &str) -> Result<Self, Error> {
        let pattern = Regex::new(PLACEHOLDER).expect("valid regex");
        let mut segments = Vec::new();
        let mut cursor = 0_usize;
        for captures in pattern.captures_iter(text) {
            let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            let section = SECTION_NAMES
                .iter()
                .find(|(known, _)| return *known == name.as_str())
                .map(|(_, section)| return *section)
                .ok_or_else(|| {
                    return Error::UnknownPlaceholder {
                        name: name.as_str().to_string(),
                    };
                })?;
            if whole.start() > cursor {
                segments.push(Segment::Literal(text.get(cursor..whole.start()).unwrap_or("").to_string()));
            }
            segments.push(Segment::Placeholder(section));
            cursor = whole.end();
        }
        if cursor < text.len() {
            segments.push(Segment::Literal(text.get(cursor..).unwrap_or("").to_string()));
        }
        return Ok(Self { segments });
    }

    /// Substitute the sections into the template.
    pub fn render(&self, sections: &Sections) -> String {
        return self
            .segments
            .iter()
            .map(|segment| {
                return match segment {
                    Segment::Literal(text) => text.as_str(),
                    Segment::Placeholder(section) => sections.get(*section),
                };
            })
            .collect();
    }
}

/// Classify each top-level statement of a rewritten document into a bucket.
///
/// Each statement is printed with its edits applied and trimmed; statements in
/// a bucket are joined by newlines.
pub fn split(document: &Document) -> Sections {
    let mut basic = Vec::new();
    let mut colors = Vec::new();
    let mut imports = Vec::new();
    for statement in document.statements() {
        let text = document.print_range(statement.range.clone());
        let text = text.trim().to_string();
        if text.is_empty() {
            continue;
        }
        match statement.kind {
            StatementKind::Import => imports.push(text),
            StatementKind::Comment | StatementKind::Variable => basic.push(text),
            StatementKind::Rule if document.has_edit_within(&statement.range) => colors.push(text),
            StatementKind::Rule => basic.push(text),
        }
    }
    return Sections {
        basic: basic.join("\n"),
        colors: colors.join("\n"),
        imports: imports.join("\n"),
    };
}
