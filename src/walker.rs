//! The rewrite walker: replaces matched color literals with variable references.
use crate::document::{Declaration, Document};
use crate::matcher::{ValueSpan, ValueTokenizer, match_color};
use crate::syntax::Dialect;
use crate::types::Diagnostic;
use crate::variables::VariableTable;

/// Result of walking one document.
#[derive(Debug, Default)]
pub struct WalkSummary {
    /// One entry per unmatched color occurrence, in source order.
    pub diagnostics: Vec<Diagnostic>,
    /// Number of color literals replaced by a reference.
    pub rewritten: usize,
}

/// Text that replaces a matched literal in `declaration`, or `None` when the
/// declaration is the variable itself (`@red: #f00` nested in a rule).
fn replacement(declaration: &Declaration, name: &str, dialect: Dialect) -> Option<String> {
    let reference = dialect.reference(name);
    if declaration.property == reference {
        return None;
    }
    if declaration.property.starts_with("--") {
        return Some(dialect.custom_property_reference(name));
    }
    return Some(reference);
}

/// Rewrite every declaration value of `document` against `table`.
///
/// Nested variable declarations and custom properties are walked like any
/// other declaration. Matched literals become references in the dialect's
/// syntax; unmatched ones are left as written and reported. Existing
/// references are never touched, so walking an already converted document
/// changes nothing.
pub fn rewrite(document: &mut Document, table: &VariableTable, dialect: Dialect, tokenizer: &ValueTokenizer) -> WalkSummary {
    let mut summary = WalkSummary::default();
    let declarations = document.declarations().to_vec();

    for declaration in declarations {
        let value = document.text(&declaration.value).to_string();
        for span in tokenizer.spans(&value, declaration.value.start) {
            let ValueSpan::Color(token) = span else {
                continue;
            };
            match match_color(&token, table) {
                Some(entry) => {
                    let Some(text) = replacement(&declaration, &entry.name, dialect) else {
                        continue;
                    };
                    if document.replace(token.range.clone(), text) {
                        summary.rewritten = summary.rewritten.saturating_add(1);
                    }
                },
                None => {
                    let position = document.position(token.range.start);
                    summary.diagnostics.push(Diagnostic {
                        color: token.color.canonical(),
                        column: position.column,
                        file: document.path().to_path_buf(),
                        line: position.line,
                        literal: token.text,
                        property: declaration.property.clone(),
                    });
                },
            }
        }
    }
    return summary;
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::color::Rgba;
    use crate::syntax::{Less, Scss, StylesheetSyntax};

    fn red_table() -> VariableTable {
        let mut table = VariableTable::default();
        table.insert("red", Rgba::from_hex("#ff0000").unwrap());
        return table;
    }

    fn walk_less(source: &str, table: &VariableTable) -> (String, WalkSummary) {
        let mut doc = Less.parse(Path::new("a.less"), source.to_string()).unwrap();
        let summary = rewrite(&mut doc, table, Dialect::Less, &ValueTokenizer::new(false));
        return (Less.print(&doc), summary);
    }

    #[test]
    fn matched_literal_becomes_reference() {
        let (out, summary) = walk_less("a { color: #FF0000; }", &red_table());
        assert_eq!(out, "a { color: @red; }");
        assert!(summary.diagnostics.is_empty());
        assert_eq!(summary.rewritten, 1);
    }

    #[test]
    fn unmatched_literal_is_reported_at_its_position() {
        let (out, summary) = walk_less("a {\n  color: #00FF00;\n}", &VariableTable::default());
        assert_eq!(out, "a {\n  color: #00FF00;\n}");
        assert_eq!(summary.diagnostics.len(), 1);
        let diagnostic = &summary.diagnostics[0];
        assert_eq!((diagnostic.line, diagnostic.column), (2, 10));
        assert_eq!(diagnostic.literal, "#00FF00");
        assert_eq!(diagnostic.property, "color");
    }

    #[test]
    fn repeated_unmatched_literals_each_report() {
        let (_, summary) = walk_less("a { color: #0f0; background: #0f0; }", &red_table());
        assert_eq!(summary.diagnostics.len(), 2);
        assert!(summary.diagnostics[0].column < summary.diagnostics[1].column);
    }

    #[test]
    fn rewriting_twice_changes_nothing() {
        let source = "@red: #f00;\na { color: #FF0000; border: 1px solid rgb(255, 0, 0); }";
        let mut doc = Less.parse(Path::new("a.less"), source.to_string()).unwrap();
        let (table, _) = VariableTable::build(&VariableTable::default(), &doc, Dialect::Less, false);
        let tokenizer = ValueTokenizer::new(false);
        rewrite(&mut doc, &table, Dialect::Less, &tokenizer);
        let once = Less.print(&doc);
        assert_eq!(once, "@red: #f00;\na { color: @red; border: 1px solid @red; }");

        let (twice, summary) = walk_less(&once, &table);
        assert_eq!(twice, once);
        assert!(summary.diagnostics.is_empty());
        assert_eq!(summary.rewritten, 0);
    }

    #[test]
    fn nested_variables_and_custom_properties_are_rewritten() {
        let (out, summary) = walk_less("a { @local: #f00; --brand: #f00; color: #f00; }", &red_table());
        assert_eq!(out, "a { @local: @red; --brand: @red; color: @red; }");
        assert!(summary.diagnostics.is_empty());
        assert_eq!(summary.rewritten, 3);
    }

    #[test]
    fn unmatched_nested_variables_and_custom_properties_are_reported() {
        let (_, summary) = walk_less("a { @local: #0f0; --accent: #00f; }", &red_table());
        let reported: Vec<(&str, &str)> = summary
            .diagnostics
            .iter()
            .map(|d| return (d.property.as_str(), d.color.as_str()))
            .collect();
        assert_eq!(reported, vec![("@local", "#00ff00"), ("--accent", "#0000ff")]);
    }

    #[test]
    fn a_variable_never_references_itself() {
        let (out, summary) = walk_less(".dark { @red: #f00; }", &red_table());
        assert_eq!(out, ".dark { @red: #f00; }");
        assert!(summary.diagnostics.is_empty());
        assert_eq!(summary.rewritten, 0);
    }

    #[test]
    fn scss_custom_properties_use_interpolation() {
        let source = "a { --brand: #f00; $local: #ff0000; }";
        let mut doc = Scss.parse(Path::new("a.scss"), source.to_string()).unwrap();
        let tokenizer = ValueTokenizer::new(false);
        rewrite(&mut doc, &red_table(), Dialect::Scss, &tokenizer);
        let once = Scss.print(&doc);
        assert_eq!(once, "a { --brand: #{$red}; $local: $red; }");

        let mut again = Scss.parse(Path::new("a.scss"), once.clone()).unwrap();
        let summary = rewrite(&mut again, &red_table(), Dialect::Scss, &tokenizer);
        assert_eq!(Scss.print(&again), once);
        assert!(summary.diagnostics.is_empty());
    }

    #[test]
    fn less_sugar_around_rules_is_walked() {
        let source = concat!(
            "@r: { color: #f00; };\n",
            ".btn when (@mode = dark) { &-primary { color: #F00; background: ~\"#0f0\"; } }\n",
            ".guard when (default()) { border-color: #0f0; }\n",
            ".a { @c: @@name; outline-color: rgb(255 0 0); }\n",
        );
        let (out, summary) = walk_less(source, &red_table());
        assert_eq!(out, concat!(
            "@r: { color: @red; };\n",
            ".btn when (@mode = dark) { &-primary { color: @red; background: ~\"#0f0\"; } }\n",
            ".guard when (default()) { border-color: #0f0; }\n",
            ".a { @c: @@name; outline-color: @red; }\n",
        ));
        assert_eq!(summary.rewritten, 3);
        assert_eq!(summary.diagnostics.len(), 1);
        assert_eq!(summary.diagnostics[0].property, "border-color");
        assert_eq!((summary.diagnostics[0].line, summary.diagnostics[0].column), (3, 41));
    }

    #[test]
    fn scss_parent_selectors_and_nested_properties_are_walked() {
        let source = ".btn { &__icon { fill: #f00; } border: { color: #ff0000; } }";
        let mut doc = Scss.parse(Path::new("a.scss"), source.to_string()).unwrap();
        let summary = rewrite(&mut doc, &red_table(), Dialect::Scss, &ValueTokenizer::new(false));
        assert_eq!(Scss.print(&doc), ".btn { &__icon { fill: $red; } border: { color: $red; } }");
        assert_eq!(summary.rewritten, 2);
    }

    #[test]
    fn scss_references_use_dollar() {
        let mut doc = Scss.parse(Path::new("a.scss"), "a { b { color: #ff0000 } }".to_string()).unwrap();
        rewrite(&mut doc, &red_table(), Dialect::Scss, &ValueTokenizer::new(false));
        assert_eq!(Scss.print(&doc), "a { b { color: $red } }");
    }
}
