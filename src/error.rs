/// Crate-level error types for colorvar diagnostics.
use std::path::PathBuf;

/// All errors in colorvar carry enough context to produce a useful diagnostic
/// without a debugger. Each variant names the file, pattern, or reason for failure.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A config file exists but its content does not describe valid options.
    #[error("invalid config {}: {reason}", path.display())]
    ConfigInvalid {
        /// Config file that was rejected.
        path: PathBuf,
        /// Description of what is wrong with it.
        reason: String,
    },

    /// The input path given on the command line does not exist.
    #[error("input not found: {}", path.display())]
    InputNotFound {
        /// Absolute path that was looked up.
        path: PathBuf,
    },

    /// The input path exists but is a directory or other non-regular file.
    #[error("input is not a file: {}", path.display())]
    InputNotFile {
        /// Absolute path that was looked up.
        path: PathBuf,
    },

    /// The `modules` glob could not be compiled.
    #[error("invalid glob `{pattern}`: {reason}")]
    InvalidGlob {
        /// Pattern as written by the user.
        pattern: String,
        /// Description from the glob compiler.
        reason: String,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON config could not be deserialized, or a report could not be serialized.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// Neither a file nor a `modules` pattern was supplied.
    #[error("no input: pass a file or a `modules` glob")]
    MissingInput,

    /// Batch mode glob matched no files under the base directory.
    #[error("no files match `{pattern}` under {}", base.display())]
    NoMatchingFiles {
        /// Base directory the pattern was applied to.
        base: PathBuf,
        /// Glob pattern that matched nothing.
        pattern: String,
    },

    /// The stylesheet parser rejected the source. Reported per file.
    #[error("parse failed: {}:{line}:{column}: {reason}", file.display())]
    ParseFailed {
        /// One-based column of the first offending node.
        column: u32,
        /// File that failed to parse.
        file: PathBuf,
        /// One-based line of the first offending node.
        line: u32,
        /// Description of the parse failure.
        reason: String,
    },

    /// The pretty printer rejected the rewritten output.
    #[error("pretty print failed: {}: {reason}", file.display())]
    PrettyPrintFailed {
        /// File whose output could not be formatted.
        file: PathBuf,
        /// Description from the formatter.
        reason: String,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// The output template names a placeholder that has no content bucket.
    #[error("unknown template placeholder: `{{{{{name}}}}}`")]
    UnknownPlaceholder {
        /// Placeholder name between the braces.
        name: String,
    },

    /// The dialect name is not one of the supported stylesheet syntaxes.
    #[error("unsupported syntax `{name}`, supported: {}", supported.join(", "))]
    UnsupportedSyntax {
        /// Dialect name as given by the user.
        name: String,
        /// Every dialect name the lookup table knows.
        supported: Vec<&'static str>,
    },
}

