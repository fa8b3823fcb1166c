//! Per-file pipeline: read, parse, build the table, walk, re-assemble, write.
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::Error;
use crate::matcher::ValueTokenizer;
use crate::syntax::StylesheetSyntax;
use crate::template::{self, Template};
use crate::types::{Diagnostic, UnresolvedVariable};
use crate::variables::VariableTable;
use crate::walker;

/// What one file's transform produced.
#[derive(Debug)]
pub struct FileOutcome {
    /// Whether the output differs from the source.
    pub changed: bool,
    /// Unmatched colors, in source order.
    pub diagnostics: Vec<Diagnostic>,
    /// Wall time spent on the file.
    pub elapsed: Duration,
    /// Final text, or `None` in check mode.
    pub output: Option<String>,
    /// The file.
    pub path: PathBuf,
    /// Top-level variables the table could not evaluate.
    pub unresolved: Vec<UnresolvedVariable>,
}

/// Everything a transform needs besides the file path. Workers borrow it
/// read-only for the length of the batch.
pub struct Transformer {
    /// Report only, never write.
    pub check: bool,
    /// Treat bare CSS color names as colors.
    pub named_colors: bool,
    /// Pretty-print the output.
    pub pretty: bool,
    /// Variables from external files. Each file extends its own copy.
    pub seed: VariableTable,
    /// Dialect parser and printer.
    pub syntax: &'static dyn StylesheetSyntax,
    /// Output template, if the content should be re-assembled.
    pub template: Option<Template>,
}

impl Transformer {
    /// Build the seed table from external variable files, in order.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if a file cannot be read, or `Error::ParseFailed`
    /// if one does not parse.
    pub fn seed_from_files(
        syntax: &dyn StylesheetSyntax,
        files: &[PathBuf],
        named_colors: bool,
    ) -> Result<VariableTable, Error> {
        let mut table = VariableTable::default();
        for file in files {
            let source = std::fs::read_to_string(file)?;
            let document = syntax.parse(file, source)?;
            for variable in table.extend_from(&document, syntax.dialect(), named_colors) {
                log::debug!("{}: `{}` is not a color literal, skipped", file.display(), variable.name);
            }
        }
        if table.is_empty() && !files.is_empty() {
            log::warn!("variable files declare no color variables");
        }
        log::debug!("seeded {} color variables from {} files", table.len(), files.len());
        return Ok(table);
    }

    /// Transform one file, writing it back unless in check mode or unchanged.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` for read/write failures, `Error::ParseFailed` if the
    /// source does not parse, or `Error::PrettyPrintFailed` if the formatter
    /// rejects the output.
    pub fn run(&self, path: &Path) -> Result<FileOutcome, Error> {
        let started = Instant::now();
        let source = std::fs::read_to_string(path)?;
        let mut document = self.syntax.parse(path, source)?;
        let dialect = self.syntax.dialect();

        let (table, unresolved) = VariableTable::build(&self.seed, &document, dialect, self.named_colors);
        let tokenizer = ValueTokenizer::new(self.named_colors);
        let summary = walker::rewrite(&mut document, &table, dialect, &tokenizer);

        let mut output = match &self.template {
            Some(template) => template.render(&template::split(&document)),
            None => self.syntax.print(&document),
        };
        if self.pretty {
            output = self.syntax.pretty(path, &output)?;
        }

        let changed = output != document.source();
        if changed && !self.check {
            std::fs::write(path, &output)?;
            log::info!(
                "wrote {} ({} colors replaced) in {}ms",
                path.display(),
                summary.rewritten,
                started.elapsed().as_millis()
            );
        }

        return Ok(FileOutcome {
            changed,
            diagnostics: summary.diagnostics,
            elapsed: started.elapsed(),
            output: (!self.check).then_some(output),
            path: path.to_path_buf(),
            unresolved,
        });
    }
}
