use std::fmt::Write as _;

use crate::error::Error;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and, where there is one,
/// how to fix it.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::UnsupportedSyntax { name, supported } => render_unsupported_syntax(name, supported),
        Error::NoMatchingFiles { base, pattern } => format!("\
# Error: No Matching Files

`{pattern}` matched no files under `{}`.

## Fix

Check the `modules` pattern and the `base` directory. Patterns are matched
against paths relative to the base directory, e.g. `**/*.less`.
", base.display()),
        Error::MissingInput => "\
# Error: No Input

Pass a stylesheet or a `modules` glob:

    colorvar src/index.less
    colorvar --modules \"**/*.less\"
"
        .to_string(),
        Error::UnknownPlaceholder { name } => format!("\
# Error: Unknown Template Placeholder

The template uses `{{{{ {name} }}}}`.

## Available placeholders

- `{{{{ imports }}}}`
- `{{{{ basic }}}}`
- `{{{{ colors }}}}`
"),
        _ => render_generic(e),
    };
}

fn render_generic(e: &Error) -> String {
    return match e {
        Error::InputNotFound { path } => format!("\
# Error: Input Not Found

`{}` does not exist.
", path.display()),

        Error::InputNotFile { path } => format!("\
# Error: Input Not A File

`{}` is not a regular file.
", path.display()),

        Error::InvalidGlob { pattern, reason } => format!("\
# Error: Invalid Glob

`{pattern}`: {reason}
"),

        Error::ConfigInvalid { path, reason } => format!("\
# Error: Invalid Config

`{}`: {reason}
", path.display()),

        Error::ParseFailed { column, file, line, reason } => format!("\
# Error: Parse Failed

Could not parse `{}` at line {line}, column {column}: {reason}
", file.display()),

        Error::PrettyPrintFailed { file, reason } => format!("\
# Error: Pretty Print Failed

Could not format `{}`: {reason}
", file.display()),

        Error::Io(e) => format!("\
# Error: I/O

{e}
"),
        Error::Json(e) => format!("\
# Error: JSON

{e}
"),
        Error::TomlDe(e) => format!("\
# Error: Invalid TOML

{e}
"),
        // Already handled in render_error, but need exhaustive match.
        _ => format!("\
# Error

{e}
"),
    };
}

fn render_unsupported_syntax(name: &str, supported: &[&str]) -> String {
    let mut out = format!("\
# Error: Unsupported Syntax

`{name}` is not a supported stylesheet syntax.

## Supported syntaxes

");
    for s in supported {
        let _ = writeln!(out, "- `{s}`");
    }
    out.push_str("\
\n## Fix

    colorvar --syntax less
");
    return out;
}
