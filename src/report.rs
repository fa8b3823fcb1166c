//! Batch-level aggregation of per-file results into one report.
use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::batch::BatchResult;
use crate::syntax::Dialect;
use crate::types::{Diagnostic, UnresolvedVariable};

/// A file whose transform failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    /// File path relative to the base directory.
    pub file: PathBuf,
    /// Rendered error.
    pub reason: String,
}

/// Diagnostics and notes for one successfully transformed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    /// Whether the output differs from the source.
    pub changed: bool,
    /// Unmatched colors, in source order.
    pub diagnostics: Vec<Diagnostic>,
    /// File path relative to the base directory.
    pub file: PathBuf,
    /// Variables the table could not evaluate.
    pub unresolved: Vec<UnresolvedVariable>,
}

/// The aggregated result of a batch, files in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Files whose transform failed.
    pub failures: Vec<Failure>,
    /// Files that were transformed.
    pub files: Vec<FileReport>,
    /// Distinct unmatched literals, grouped under the first file they appear in.
    pub undeclared: Vec<UndeclaredGroup>,
}

/// Distinct unmatched literals first seen in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UndeclaredGroup {
    /// File path relative to the base directory.
    pub file: PathBuf,
    /// Literals exactly as written, in first-seen order.
    pub literals: Vec<String>,
}

impl Report {
    /// Aggregate batch results. Paths are shown relative to `base`.
    pub fn aggregate(results: Vec<BatchResult>, base: &Path) -> Self {
        let mut failures = Vec::new();
        let mut files = Vec::new();
        let mut undeclared = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for result in results {
            let file = relative_to(&result.path, base);
            let outcome = match result.outcome {
                Ok(outcome) => outcome,
                Err(e) => {
                    failures.push(Failure {
                        file,
                        reason: e.to_string(),
                    });
                    continue;
                },
            };

            let literals: Vec<String> = outcome
                .diagnostics
                .iter()
                .filter(|diagnostic| return seen.insert(diagnostic.literal.clone()))
                .map(|diagnostic| return diagnostic.literal.clone())
                .collect();
            if !literals.is_empty() {
                undeclared.push(UndeclaredGroup {
                    file: file.clone(),
                    literals,
                });
            }
            files.push(FileReport {
                changed: outcome.changed,
                diagnostics: outcome.diagnostics,
                file,
                unresolved: outcome.unresolved,
            });
        }

        return Self {
            failures,
            files,
            undeclared,
        };
    }

    /// Variable declarations for every undeclared literal, ready to append to a
    /// variable file. Each file group is introduced by a `// <file>` marker line,
    /// and names are numbered from zero in first-seen order.
    /// Returns `None` when nothing is undeclared.
    pub fn completion(&self, dialect: Dialect) -> Option<String> {
        if self.undeclared.is_empty() {
            return None;
        }
        let mut out = String::from("\n");
        let mut index = 0_usize;
        for group in &self.undeclared {
            let _ = writeln!(out, "// {}", group.file.display());
            for literal in &group.literals {
                let _ = writeln!(out, "{}: {literal};", dialect.reference(&format!("theme-color{index}")));
                index = index.saturating_add(1);
            }
        }
        return Some(out);
    }

    /// Whether any file failed to transform.
    pub fn has_failures(&self) -> bool {
        return !self.failures.is_empty();
    }

    /// Human-readable listing: per-file diagnostics, failures, notes, the
    /// undeclared literals and a summary line.
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        for (number, file) in self.files.iter().filter(|f| return !f.diagnostics.is_empty()).enumerate() {
            let _ = writeln!(out, "{}. \"{}\", errors =>", number.saturating_add(1), file.file.display());
            for (item, diagnostic) in file.diagnostics.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "    <{}>. {}, line: {}, column: {}",
                    item.saturating_add(1),
                    diagnostic.message(),
                    diagnostic.line,
                    diagnostic.column
                );
            }
            out.push('\n');
        }

        if !self.failures.is_empty() {
            out.push_str("Failed files:\n");
            for failure in &self.failures {
                let _ = writeln!(out, "- {}: {}", failure.file.display(), failure.reason);
            }
            out.push('\n');
        }

        let notes: Vec<(&Path, &UnresolvedVariable)> = self
            .files
            .iter()
            .flat_map(|f| return f.unresolved.iter().map(|u| return (f.file.as_path(), u)))
            .collect();
        if !notes.is_empty() {
            out.push_str("Notes:\n");
            for (file, variable) in notes {
                let _ = writeln!(
                    out,
                    "- {}:{}:{}: `{}` is `{}`, not a color literal",
                    file.display(),
                    variable.position.line,
                    variable.position.column,
                    variable.name,
                    variable.value
                );
            }
            out.push('\n');
        }

        if !self.undeclared.is_empty() {
            out.push_str("Undeclared variable colors:\n");
            for group in &self.undeclared {
                let _ = writeln!(out, "// {}", group.file.display());
                for literal in &group.literals {
                    let _ = writeln!(out, "{literal}");
                }
            }
            out.push('\n');
        }

        let checked = self.files.len().saturating_add(self.failures.len());
        let changed = self.files.iter().filter(|f| return f.changed).count();
        let _ = writeln!(
            out,
            "{checked} files checked, {changed} changed, {} failed, {} unmatched colors",
            self.failures.len(),
            self.unmatched_count()
        );
        return out;
    }

    /// Total unmatched color occurrences across the batch.
    pub fn unmatched_count(&self) -> usize {
        return self.files.iter().map(|f| return f.diagnostics.len()).sum();
    }
}

/// `path` relative to `base`, or `path` itself when it lies elsewhere.
fn relative_to(path: &Path, base: &Path) -> PathBuf {
    return path.strip_prefix(base).map_or_else(|_| return path.to_path_buf(), Path::to_path_buf);
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::Error;
    use crate::transform::FileOutcome;

    fn diagnostic(file: &str, line: u32, literal: &str) -> Diagnostic {
        return Diagnostic {
            color: literal.to_string(),
            column: 10,
            file: PathBuf::from(file),
            line,
            literal: literal.to_string(),
            property: "color".to_string(),
        };
    }

    fn ok(file: &str, diagnostics: Vec<Diagnostic>) -> BatchResult {
        return BatchResult {
            outcome: Ok(FileOutcome {
                changed: false,
                diagnostics,
                elapsed: Duration::ZERO,
                output: None,
                path: PathBuf::from(file),
                unresolved: Vec::new(),
            }),
            path: PathBuf::from(file),
        };
    }

    fn sample() -> Report {
        return Report::aggregate(
            vec![
                ok("/p/a.less", vec![diagnostic("/p/a.less", 1, "#0f0"), diagnostic("/p/a.less", 2, "#0f0")]),
                BatchResult {
                    outcome: Err(Error::ParseFailed {
                        column: 1,
                        file: PathBuf::from("/p/b.less"),
                        line: 2,
                        reason: "unexpected `}`".to_string(),
                    }),
                    path: PathBuf::from("/p/b.less"),
                },
                ok("/p/c.less", vec![diagnostic("/p/c.less", 3, "#0f0"), diagnostic("/p/c.less", 4, "#abc")]),
            ],
            Path::new("/p"),
        );
    }

    #[test]
    fn literals_are_deduplicated_across_the_batch() {
        let report = sample();
        assert_eq!(report.unmatched_count(), 4);
        assert_eq!(report.undeclared, vec![
            UndeclaredGroup {
                file: PathBuf::from("a.less"),
                literals: vec!["#0f0".to_string()],
            },
            UndeclaredGroup {
                file: PathBuf::from("c.less"),
                literals: vec!["#abc".to_string()],
            },
        ]);
        assert_eq!(report.failures[0].file, PathBuf::from("b.less"));
        assert!(report.has_failures());
    }

    #[test]
    fn completion_numbers_colors_in_first_seen_order() {
        let report = sample();
        assert_eq!(
            report.completion(Dialect::Less).unwrap(),
            "\n// a.less\n@theme-color0: #0f0;\n// c.less\n@theme-color1: #abc;\n"
        );
        assert!(report.completion(Dialect::Scss).unwrap().contains("$theme-color1: #abc;"));
    }

    #[test]
    fn text_report_lists_files_in_order() {
        let text = sample().render_text();
        assert!(text.starts_with("1. \"a.less\", errors =>\n    <1>. `#0f0` in `color` has no matching theme variable, line: 1, column: 10\n"));
        assert!(text.contains("2. \"c.less\", errors =>"));
        assert!(text.contains("Failed files:\n- b.less: parse failed: /p/b.less:2:1: unexpected `}`\n"));
        assert!(text.contains("Undeclared variable colors:\n// a.less\n#0f0\n// c.less\n#abc\n"));
        assert!(text.ends_with("3 files checked, 0 changed, 1 failed, 4 unmatched colors\n"));
    }
}
