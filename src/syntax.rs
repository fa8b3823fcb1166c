//! Stylesheet dialects: lookup by name, parsing and printing.
//!
//! Both dialects parse with raffia, which keeps byte spans into the original
//! source, and pretty-print with malva.
use std::path::Path;

use malva::config::FormatOptions;

use crate::document::Document;
use crate::error::Error;

/// Every supported dialect, in the order they are listed to users.
const SYNTAXES: [&dyn StylesheetSyntax; 2] = [&Less, &Scss];

/// A stylesheet source syntax with its own variable sigil.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// LESS: `@name: value;`, referenced as `@name`.
    Less,
    /// SCSS: `$name: value;`, referenced as `$name`.
    Scss,
}

impl Dialect {
    /// Render a reference to the named variable inside a custom property
    /// value. SCSS passes custom property values through verbatim unless they
    /// are interpolated.
    pub fn custom_property_reference(self, name: &str) -> String {
        return match self {
            Self::Less => self.reference(name),
            Self::Scss => format!("#{{${name}}}"),
        };
    }

    /// The dialect's name as accepted by [`resolve`].
    pub const fn name(self) -> &'static str {
        return match self {
            Self::Less => "less",
            Self::Scss => "scss",
        };
    }

    /// Render a reference to the named variable, e.g. `@red` or `$red`.
    pub fn reference(self, name: &str) -> String {
        return format!("{}{name}", self.sigil());
    }

    /// The character that introduces a variable name.
    pub const fn sigil(self) -> char {
        return match self {
            Self::Less => '@',
            Self::Scss => '$',
        };
    }
}

/// LESS parser and printer.
pub struct Less;

/// SCSS parser and printer.
pub struct Scss;

/// Capability shared by every dialect: turn source text into a document and back.
pub trait StylesheetSyntax: Send + Sync {
    /// Which dialect this is.
    fn dialect(&self) -> Dialect;

    /// Parse source text into a document.
    ///
    /// # Errors
    ///
    /// Returns `Error::ParseFailed` if the source has a syntax error.
    fn parse(&self, path: &Path, source: String) -> Result<Document, Error> {
        return Document::parse(path, source, self.dialect());
    }

    /// Reformat final output text following the dialect's conventions.
    ///
    /// # Errors
    ///
    /// Returns `Error::PrettyPrintFailed` if the formatter rejects the text.
    fn pretty(&self, path: &Path, text: &str) -> Result<String, Error>;

    /// Serialize a document, applying every rewrite recorded on it.
    fn print(&self, document: &Document) -> String {
        return document.print();
    }
}

impl StylesheetSyntax for Less {
    fn dialect(&self) -> Dialect {
        return Dialect::Less;
    }

    fn pretty(&self, path: &Path, text: &str) -> Result<String, Error> {
        return format_with_malva(path, text, malva::Syntax::Less);
    }
}

impl StylesheetSyntax for Scss {
    fn dialect(&self) -> Dialect {
        return Dialect::Scss;
    }

    fn pretty(&self, path: &Path, text: &str) -> Result<String, Error> {
        return format_with_malva(path, text, malva::Syntax::Scss);
    }
}

/// Run the dialect's formatter over final output.
///
/// # Errors
///
/// Returns `Error::PrettyPrintFailed` with the formatter's message.
fn format_with_malva(path: &Path, text: &str, syntax: malva::Syntax) -> Result<String, Error> {
    return malva::format_text(text, syntax, &FormatOptions::default()).map_err(|e| {
        return Error::PrettyPrintFailed {
            file: path.to_path_buf(),
            reason: e.to_string(),
        };
    });
}

/// Look up a dialect by its name, case-insensitively.
///
/// # Errors
///
/// Returns `Error::UnsupportedSyntax` when no dialect has that name.
pub fn resolve(name: &str) -> Result<&'static dyn StylesheetSyntax, Error> {
    let wanted = name.trim().to_ascii_lowercase();
    return SYNTAXES
        .iter()
        .find(|syntax| return syntax.dialect().name() == wanted)
        .copied()
        .ok_or_else(|| {
            return Error::UnsupportedSyntax {
                name: name.to_string(),
                supported: SYNTAXES.iter().map(|syntax| return syntax.dialect().name()).collect(),
            };
        });
}
