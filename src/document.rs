use std::ops::Range;
use std::path::{Path, PathBuf};

use raffia::ast::{ComponentValue, Declaration as DeclarationNode, SimpleBlock, Statement as Node, Stylesheet};
use raffia::{Parser, Span, Spanned, Syntax};

use crate::error::Error;
use crate::syntax::Dialect;
use crate::types::Position;

/// At-rules that pull another stylesheet in.
const IMPORT_RULES: &[&str] = &["forward", "import", "use"];

/// Walks the syntax tree and records every declaration as byte ranges.
struct Collector<'s> {
    /// Declarations found so far, in source order.
    declarations: Vec<Declaration>,
    /// Source the tree was parsed from.
    source: &'s str,
}

/// One `property: value` declaration, at any nesting depth.
///
/// Variable declarations inside blocks count as declarations, with the
/// variable name (sigil included) as the property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Property name exactly as written.
    pub property: String,
    /// Byte range of the value in the source, trimmed, terminator excluded.
    pub value: Range<usize>,
}

/// A pending replacement of a source byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
    /// Bytes being replaced.
    range: Range<usize>,
    /// Text written in their place.
    replacement: String,
}

/// A parsed stylesheet. Rewrites are recorded as edits and applied when printing,
/// so bytes outside an edit are reproduced exactly.
pub struct Document {
    /// Every declaration in source order.
    declarations: Vec<Declaration>,
    /// Recorded edits, sorted by start and never overlapping.
    edits: Vec<Edit>,
    /// Line start offsets for position lookups.
    lines: LineIndex,
    /// File the source came from.
    path: PathBuf,
    /// Original source text.
    source: String,
    /// Top-level statements covering the whole source, in order.
    statements: Vec<Statement>,
    /// Top-level variable declarations, in order.
    variables: Vec<VariableDeclaration>,
}

/// Byte offsets of every line start, for offset to line/column conversion.
struct LineIndex {
    /// Offset of the first byte of each line. Always starts with 0.
    starts: Vec<usize>,
}

/// A top-level statement, with any comments and blank lines before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// What kind of statement this is.
    pub kind: StatementKind,
    /// Byte range from the end of the previous statement to the end of this one.
    pub range: Range<usize>,
}

/// Classification of a top-level statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Trailing comments after the last statement.
    Comment,
    /// `@import`, `@use` or `@forward`.
    Import,
    /// Rule sets, at-rule blocks, mixin calls and bare declarations.
    Rule,
    /// A variable declaration.
    Variable,
}

/// A top-level variable declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDeclaration {
    /// Variable name without its sigil.
    pub name: String,
    /// Byte range of the statement, terminator included.
    pub statement: Range<usize>,
    /// Byte range of the value, trimmed. Trailing SCSS flags are part of it.
    pub value: Range<usize>,
}

impl<'s> Collector<'s> {
    /// Record the declarations of every statement in a block.
    fn block(&mut self, block: &SimpleBlock<'_>) {
        for node in &block.statements {
            self.statement(node);
        }
    }

    /// Record a declaration node. An SCSS nested property block
    /// (`font: { family: x; }`) ends the value and is walked as a block.
    fn declaration(&mut self, declaration: &DeclarationNode<'_>) {
        let nesting = match declaration.value.last() {
            Some(ComponentValue::SassNestingDeclaration(nesting)) => Some(nesting),
            _ => None,
        };
        let end = nesting.map_or(declaration.span.end, |nesting| return nesting.span.start);
        self.push(declaration.name.span(), declaration.colon_span.end, end);
        if let Some(nesting) = nesting {
            self.block(&nesting.block);
        }
    }

    /// Record the declarations of one optional block.
    fn optional_block(&mut self, block: Option<&SimpleBlock<'_>>) {
        if let Some(block) = block {
            self.block(block);
        }
    }

    /// Record a declaration whose value runs from `colon_end` to `end`. Empty
    /// values are skipped.
    fn push(&mut self, name: &Span, colon_end: usize, end: usize) {
        let Some(value) = trimmed(self.source, colon_end..end) else {
            return;
        };
        let property = self.text(name).to_string();
        self.declarations.push(Declaration { property, value });
    }

    /// Record the declarations of one statement and of every block nested in it.
    fn statement(&mut self, node: &Node<'_>) {
        match node {
            Node::AtRule(rule) => self.optional_block(rule.block.as_ref()),
            Node::Declaration(declaration) => self.declaration(declaration),
            Node::KeyframeBlock(keyframe) => self.block(&keyframe.block),
            Node::LessConditionalQualifiedRule(rule) => self.block(&rule.block),
            Node::LessExtendRule(_) | Node::LessMixinCall(_) | Node::LessVariableCall(_) => {},
            Node::LessFunctionCall(call) => {
                for argument in &call.args {
                    if let ComponentValue::LessDetachedRuleset(ruleset) = argument {
                        self.block(&ruleset.block);
                    }
                }
            },
            Node::LessMixinDefinition(mixin) => self.block(&mixin.block),
            Node::LessVariableDeclaration(variable) => {
                if let ComponentValue::LessDetachedRuleset(ruleset) = &variable.value {
                    self.block(&ruleset.block);
                } else {
                    self.push(&variable.name.span, variable.colon_span.end, variable.span.end);
                }
            },
            Node::QualifiedRule(rule) => self.block(&rule.block),
            Node::SassIfAtRule(rule) => {
                self.block(&rule.if_clause.block);
                for clause in &rule.else_if_clauses {
                    self.block(&clause.block);
                }
                self.optional_block(rule.else_clause.as_ref());
            },
            Node::SassVariableDeclaration(variable) => {
                self.push(&variable.name.span, variable.colon_span.end, variable.span.end);
            },
            Node::UnknownSassAtRule(rule) => self.optional_block(rule.block.as_ref()),
        }
    }

    /// Source text of a span.
    fn text(&self, span: &Span) -> &'s str {
        return self.source.get(span.start..span.end).unwrap_or("");
    }

    /// Split the stylesheet into top-level statements and record its variables.
    ///
    /// Each statement absorbs the comments and whitespace before it; text after
    /// the last statement becomes a trailing comment statement. Top-level
    /// variables define the theme and are not collected as declarations, but
    /// the body of a LESS detached ruleset (`@r: { ... }`) is.
    fn top_level(&mut self, stylesheet: &Stylesheet<'_>) -> (Vec<Statement>, Vec<VariableDeclaration>) {
        let mut statements = Vec::with_capacity(stylesheet.statements.len().saturating_add(1));
        let mut variables = Vec::new();
        let mut cursor = 0_usize;

        for node in &stylesheet.statements {
            let start = node.span().start;
            let end = terminated_end(self.source, node.span().end).max(cursor);
            let kind = match node {
                Node::AtRule(rule) if IMPORT_RULES.contains(&rule.name.name.to_ascii_lowercase().as_str()) => {
                    StatementKind::Import
                },
                Node::LessVariableDeclaration(variable) => {
                    if let ComponentValue::LessDetachedRuleset(ruleset) = &variable.value {
                        self.block(&ruleset.block);
                    } else if let Some(value) = trimmed(self.source, variable.colon_span.end..variable.span.end) {
                        variables.push(VariableDeclaration {
                            name: self.text(&variable.name.span).trim_start_matches('@').to_string(),
                            statement: start..end,
                            value,
                        });
                    }
                    StatementKind::Variable
                },
                Node::SassVariableDeclaration(variable) => {
                    let value = trimmed(self.source, variable.colon_span.end..variable.span.end);
                    if let (None, Some(value)) = (&variable.namespace, value) {
                        variables.push(VariableDeclaration {
                            name: self.text(&variable.name.span).trim_start_matches('$').to_string(),
                            statement: start..end,
                            value,
                        });
                    }
                    StatementKind::Variable
                },
                _ => {
                    self.statement(node);
                    StatementKind::Rule
                },
            };
            statements.push(Statement { kind, range: cursor..end });
            cursor = end;
        }

        if self.source.get(cursor..).is_some_and(|rest| return !rest.trim().is_empty()) {
            statements.push(Statement {
                kind: StatementKind::Comment,
                range: cursor..self.source.len(),
            });
        }
        return (statements, variables);
    }
}

impl Document {
    /// Every declaration in source order.
    pub fn declarations(&self) -> &[Declaration] {
        return &self.declarations;
    }

    /// Whether any recorded edit falls inside `range`.
    pub fn has_edit_within(&self, range: &Range<usize>) -> bool {
        return self
            .edits
            .iter()
            .any(|edit| return edit.range.start >= range.start && edit.range.end <= range.end);
    }

    /// Parse LESS or SCSS source.
    ///
    /// # Errors
    ///
    /// Returns `Error::ParseFailed` at the first syntax error the parser cannot
    /// recover from.
    pub fn parse(path: &Path, source: String, dialect: Dialect) -> Result<Self, Error> {
        let lines = LineIndex::new(&source);
        let syntax = match dialect {
            Dialect::Less => Syntax::Less,
            Dialect::Scss => Syntax::Scss,
        };

        let (declarations, statements, variables) = {
            let mut parser = Parser::new(&source, syntax);
            let stylesheet = parser.parse::<Stylesheet>().map_err(|e| {
                let position = lines.position(&source, e.span.start);
                return Error::ParseFailed {
                    column: position.column,
                    file: path.to_path_buf(),
                    line: position.line,
                    reason: e.kind.to_string(),
                };
            })?;
            let recovered = parser.recoverable_errors().len();
            if recovered > 0 {
                log::debug!("{}: parsed past {recovered} recoverable syntax errors", path.display());
            }

            let mut collector = Collector {
                declarations: Vec::new(),
                source: &source,
            };
            let (statements, variables) = collector.top_level(&stylesheet);
            (collector.declarations, statements, variables)
        };

        return Ok(Self {
            declarations,
            edits: Vec::new(),
            lines,
            path: path.to_path_buf(),
            source,
            statements,
            variables,
        });
    }

    /// File the source came from.
    pub fn path(&self) -> &Path {
        return &self.path;
    }

    /// One-based line and character column of a byte offset.
    pub fn position(&self, offset: usize) -> Position {
        return self.lines.position(&self.source, offset);
    }

    /// The whole source with every edit applied.
    pub fn print(&self) -> String {
        return self.print_range(0..self.source.len());
    }

    /// The source bytes in `range` with the edits inside it applied.
    pub fn print_range(&self, range: Range<usize>) -> String {
        let mut out = String::with_capacity(range.len());
        let mut cursor = range.start;
        for edit in self
            .edits
            .iter()
            .filter(|edit| return edit.range.start >= range.start && edit.range.end <= range.end)
        {
            out.push_str(self.source.get(cursor..edit.range.start).unwrap_or(""));
            out.push_str(&edit.replacement);
            cursor = edit.range.end;
        }
        out.push_str(self.source.get(cursor..range.end).unwrap_or(""));
        return out;
    }

    /// Record a replacement of `range`. Returns false and records nothing if the
    /// range is out of bounds or overlaps an earlier edit.
    pub fn replace(&mut self, range: Range<usize>, replacement: String) -> bool {
        if range.start > range.end || self.source.get(range.clone()).is_none() {
            return false;
        }
        let index = self.edits.partition_point(|edit| return edit.range.start < range.start);
        let overlaps_previous = index
            .checked_sub(1)
            .and_then(|previous| return self.edits.get(previous))
            .is_some_and(|edit| return edit.range.end > range.start);
        let overlaps_next = self.edits.get(index).is_some_and(|edit| return edit.range.start < range.end);
        if overlaps_previous || overlaps_next {
            return false;
        }
        self.edits.insert(index, Edit { range, replacement });
        return true;
    }

    /// Original source text.
    pub fn source(&self) -> &str {
        return &self.source;
    }

    /// Top-level statements covering the source, in order.
    pub fn statements(&self) -> &[Statement] {
        return &self.statements;
    }

    /// Original source text of a byte range, or an empty string if out of bounds.
    pub fn text(&self, range: &Range<usize>) -> &str {
        return self.source.get(range.clone()).unwrap_or("");
    }

    /// Top-level variable declarations, in order.
    pub fn variables(&self) -> &[VariableDeclaration] {
        return &self.variables;
    }
}

impl LineIndex {
    /// Index the line starts of `source`.
    fn new(source: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(at, _)| return at.saturating_add(1)))
            .collect();
        return Self { starts };
    }

    /// One-based line and character column of a byte offset into `source`.
    fn position(&self, source: &str, offset: usize) -> Position {
        let line_index = self.starts.partition_point(|start| return *start <= offset).saturating_sub(1);
        let line_start = self.starts.get(line_index).copied().unwrap_or(0);
        let column = source
            .get(line_start..offset)
            .map_or(0, |prefix| return prefix.chars().count());
        return Position {
            column: u32::try_from(column).unwrap_or(u32::MAX).saturating_add(1),
            line: u32::try_from(line_index).unwrap_or(u32::MAX).saturating_add(1),
        };
    }
}

/// End of a statement, extended past the `;` that terminates it if one follows.
fn terminated_end(source: &str, end: usize) -> usize {
    let Some(rest) = source.get(end..) else {
        return end;
    };
    let after_whitespace = rest.trim_start();
    if !after_whitespace.starts_with(';') {
        return end;
    }
    return end
        .saturating_add(rest.len().saturating_sub(after_whitespace.len()))
        .saturating_add(1);
}

/// `range` without surrounding whitespace, or `None` if nothing is left.
fn trimmed(source: &str, range: Range<usize>) -> Option<Range<usize>> {
    let raw = source.get(range.clone())?;
    let leading = raw.len().saturating_sub(raw.trim_start().len());
    let trailing = raw.len().saturating_sub(raw.trim_end().len());
    let start = range.start.saturating_add(leading);
    let end = range.end.saturating_sub(trailing);
    return (start < end).then_some(start..end);
}
