//! The variable table: canonical color value to the theme variable that holds it.
use std::collections::HashMap;

use regex::Regex;

use crate::color::Rgba;
use crate::document::Document;
use crate::syntax::Dialect;
use crate::types::UnresolvedVariable;

/// Trailing flags stripped from a variable value before it is evaluated.
const VALUE_FLAGS: &[&str] = &["!default", "!global", "!important"];

/// A theme variable that holds a color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableEntry {
    /// Variable name without its sigil.
    pub name: String,
}

/// Mapping from canonical color to the earliest variable declaring it.
///
/// Read-only once the rewrite walker starts. A batch shares one seeded table
/// and every file extends its own copy.
#[derive(Debug, Clone, Default)]
pub struct VariableTable {
    /// Entries keyed by canonical color.
    by_color: HashMap<Rgba, VariableEntry>,
}

impl VariableTable {
    /// Build the table for one document: a copy of `seed` followed by the
    /// document's own top-level variables.
    ///
    /// Returns the table and the variables whose values could not be evaluated.
    pub fn build(
        seed: &Self,
        document: &Document,
        dialect: Dialect,
        named_colors: bool,
    ) -> (Self, Vec<UnresolvedVariable>) {
        let mut table = seed.clone();
        let unresolved = table.extend_from(document, dialect, named_colors);
        return (table, unresolved);
    }

    /// Add the top-level variables of `document` after the existing entries.
    ///
    /// Literal colors are inserted; values that reference other variables or
    /// call functions are returned as unresolved. Anything else (lengths,
    /// strings, keywords) is ignored.
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded expression regexes are invalid (compile-time invariant).
    pub fn extend_from(&mut self, document: &Document, dialect: Dialect, named_colors: bool) -> Vec<UnresolvedVariable> {
        let reference = Regex::new(&format!(r"{}[\w{{-]", regex::escape(&dialect.sigil().to_string()))).expect("valid regex");
        let call = Regex::new(r"[A-Za-z_][\w-]*\(").expect("valid regex");
        let mut unresolved = Vec::new();

        for variable in document.variables() {
            let value = strip_flags(document.text(&variable.value));
            if let Some(color) = Rgba::parse(value, named_colors) {
                if !self.insert(&variable.name, color) {
                    log::debug!(
                        "{}: `{}` holds {}, already taken by an earlier variable",
                        document.path().display(),
                        variable.name,
                        color.canonical()
                    );
                }
                continue;
            }
            if reference.is_match(value) || call.is_match(value) {
                unresolved.push(UnresolvedVariable {
                    file: document.path().to_path_buf(),
                    name: variable.name.clone(),
                    position: document.position(variable.statement.start),
                    value: value.to_string(),
                });
            }
        }

        log::debug!(
            "{}: {} color variables known, {} unresolved",
            document.path().display(),
            self.by_color.len(),
            unresolved.len()
        );
        return unresolved;
    }

    /// The variable declared first for `color`, if any.
    pub fn get(&self, color: &Rgba) -> Option<&VariableEntry> {
        return self.by_color.get(color);
    }

    /// Record a variable. The earliest declaration of a color wins; returns
    /// whether this one became the table entry.
    pub fn insert(&mut self, name: &str, value: Rgba) -> bool {
        if self.by_color.contains_key(&value) {
            return false;
        }
        self.by_color.insert(value, VariableEntry { name: name.to_string() });
        return true;
    }

    /// Whether no color variable is known.
    pub fn is_empty(&self) -> bool {
        return self.by_color.is_empty();
    }

    /// Number of distinct colors with a variable.
    pub fn len(&self) -> usize {
        return self.by_color.len();
    }
}

/// Trim a value and remove trailing `!default`-style flags.
fn strip_flags(value: &str) -> &str {
    let mut rest = value.trim();
    while let Some(flag) = VALUE_FLAGS.iter().find(|flag| return rest.ends_with(*flag)) {
        rest = rest.get(..rest.len().saturating_sub(flag.len())).unwrap_or("").trim_end();
    }
    return rest;
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::syntax::{Less, Scss, StylesheetSyntax};

    fn less_table(source: &str) -> (VariableTable, Vec<UnresolvedVariable>) {
        let doc = Less.parse(Path::new("vars.less"), source.to_string()).unwrap();
        return VariableTable::build(&VariableTable::default(), &doc, Dialect::Less, false);
    }

    #[test]
    fn earliest_declaration_wins() {
        let (table, _) = less_table("@red: #f00;\n@danger: #FF0000;\n@blue: rgb(0, 0, 255);\n");
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&Rgba::from_hex("#ff0000").unwrap()).unwrap().name, "red");
        assert_eq!(table.get(&Rgba::from_hex("#00f").unwrap()).unwrap().name, "blue");
        assert!(!table.clone().insert("crimson", Rgba::from_hex("#f00").unwrap()));
    }

    #[test]
    fn forward_references_resolve() {
        let (table, _) = less_table("a { color: @red; }\n@red: #f00;\n");
        assert!(table.get(&Rgba::from_hex("#f00").unwrap()).is_some());
    }

    #[test]
    fn expressions_are_unresolved() {
        let (table, unresolved) = less_table("@red: #f00;\n@dark: darken(@red, 10%);\n@alias: @red;\n@gap: 4px;\n");
        assert_eq!(table.len(), 1);
        let names: Vec<&str> = unresolved.iter().map(|u| return u.name.as_str()).collect();
        assert_eq!(names, vec!["dark", "alias"]);
        assert_eq!(unresolved[0].position.line, 2);
        assert_eq!(unresolved[0].value, "darken(@red, 10%)");
    }

    #[test]
    fn scss_flags_are_ignored() {
        let doc = Scss.parse(Path::new("v.scss"), "$brand: #123456 !default;\n".to_string()).unwrap();
        let (table, unresolved) = VariableTable::build(&VariableTable::default(), &doc, Dialect::Scss, false);
        assert!(unresolved.is_empty());
        assert_eq!(table.get(&Rgba::from_hex("#123456").unwrap()).unwrap().name, "brand");
    }

    #[test]
    fn named_colors_need_opt_in() {
        let doc = Less.parse(Path::new("v.less"), "@red: red;\n".to_string()).unwrap();
        assert!(VariableTable::build(&VariableTable::default(), &doc, Dialect::Less, false).0.is_empty());
        assert_eq!(VariableTable::build(&VariableTable::default(), &doc, Dialect::Less, true).0.len(), 1);
    }

    #[test]
    fn extending_keeps_seed_entries_first() {
        let (seed, _) = less_table("@brand: #123456;\n");
        let doc = Less.parse(Path::new("a.less"), "@local: #123456;\n@other: #abcdef;\n".to_string()).unwrap();
        let (table, _) = VariableTable::build(&seed, &doc, Dialect::Less, false);
        assert_eq!(seed.len(), 1);
        assert_eq!(table.get(&Rgba::from_hex("#123456").unwrap()).unwrap().name, "brand");
        assert_eq!(table.get(&Rgba::from_hex("#abcdef").unwrap()).unwrap().name, "other");
        assert_eq!(table.len(), 2);
    }
}
