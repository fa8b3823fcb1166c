use std::path::{Path, PathBuf};

use crate::error::Error;

/// Config files looked up in the working directory, first hit wins.
const CONFIG_FILES: [&str; 4] = ["package.json", ".colorvarrc", ".colorvarrc.json", ".colorvar.toml"];

/// Key holding the options inside `package.json`.
const PACKAGE_KEY: &str = "colorvar";

/// Options read from a config file. Every field is optional; `None` means the
/// file did not set it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Append declarations for unmatched colors in check mode.
    pub auto_complete: Option<bool>,
    /// Base directory for `modules` and relative input files.
    pub base: Option<PathBuf>,
    /// Report only, never write.
    pub check: Option<bool>,
    /// Glob selecting files under the base directory.
    pub modules: Option<String>,
    /// Treat bare CSS color names as colors.
    pub named_colors: Option<bool>,
    /// File the options were read from.
    pub path: Option<PathBuf>,
    /// Pretty-print the output.
    pub pretty: Option<bool>,
    /// Dialect name.
    pub syntax: Option<String>,
    /// Output template file.
    pub template: Option<PathBuf>,
    /// Stylesheets whose variables seed the table.
    pub variable_files: Vec<PathBuf>,
}

/// Raw config structure shared by the JSON and TOML formats.
#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ColorvarFileConfig {
    /// `autoComplete`, also accepted under the misspelling `autoComple`.
    #[serde(alias = "autoComple", default)]
    auto_complete: Option<Flag>,
    /// `base`.
    #[serde(default)]
    base: Option<PathBuf>,
    /// `checkMode`.
    #[serde(default)]
    check_mode: Option<Flag>,
    /// `modules`.
    #[serde(default)]
    modules: Option<String>,
    /// `namedColors`.
    #[serde(default)]
    named_colors: Option<Flag>,
    /// `pretty`.
    #[serde(default)]
    pretty: Option<Flag>,
    /// `syntax`.
    #[serde(default)]
    syntax: Option<String>,
    /// `template`.
    #[serde(default)]
    template: Option<PathBuf>,
    /// `variableFiles`.
    #[serde(default)]
    variable_files: Vec<PathBuf>,
}

/// A boolean option as config files spell it: `true`, `1` or `"1"`.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum Flag {
    /// `true` / `false`.
    Bool(bool),
    /// `1` / `0`.
    Number(i64),
    /// `"1"` / `"0"` / `"true"` / `"false"`.
    Text(String),
}

/// How the batch report is printed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    /// Machine-readable JSON.
    Json,
    /// Human-readable listing.
    #[default]
    Text,
}

/// Values given on the command line. `None` defers to the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    /// Append declarations for unmatched colors in check mode.
    pub auto_complete: Option<bool>,
    /// Base directory.
    pub base: Option<PathBuf>,
    /// Check mode.
    pub check: Option<bool>,
    /// Single input file.
    pub file: Option<PathBuf>,
    /// Report format.
    pub format: ReportFormat,
    /// Worker count.
    pub jobs: Option<usize>,
    /// Glob selecting files.
    pub modules: Option<String>,
    /// Named color recognition.
    pub named_colors: Option<bool>,
    /// Pretty printing.
    pub pretty: Option<bool>,
    /// Dialect name.
    pub syntax: Option<String>,
    /// Output template file.
    pub template: Option<PathBuf>,
    /// Extra variable files, added after the config file's.
    pub variable_files: Vec<PathBuf>,
}

/// Fully resolved options for one run. Built once, then shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Append declarations for unmatched colors. Only acts in check mode.
    pub auto_complete: bool,
    /// Absolute base directory.
    pub base: PathBuf,
    /// Report only, never write.
    pub check: bool,
    /// Single input file, as given.
    pub file: Option<PathBuf>,
    /// Report format.
    pub format: ReportFormat,
    /// Number of worker threads, at least one.
    pub jobs: usize,
    /// Glob selecting files under `base`.
    pub modules: Option<String>,
    /// Treat bare CSS color names as colors.
    pub named_colors: bool,
    /// Pretty-print the output.
    pub pretty: bool,
    /// Dialect name, validated later by the syntax lookup.
    pub syntax: String,
    /// Absolute path of the output template.
    pub template: Option<PathBuf>,
    /// Absolute paths of the variable files, config entries first.
    pub variable_files: Vec<PathBuf>,
}

impl Config {
    /// Find and load the first config file in `dir`.
    /// Returns an empty config when none exists. A file that exists but is
    /// malformed is an error, never silently ignored.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// `Error::Json` / `Error::TomlDe` for malformed files, or
    /// `Error::ConfigInvalid` for values of the wrong shape.
    pub fn discover(dir: &Path) -> Result<Self, Error> {
        for name in CONFIG_FILES {
            let path = dir.join(name);
            let content = match std::fs::read_to_string(&path) {
                Ok(c) => c,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(Error::Io(e)),
            };

            let raw: ColorvarFileConfig = match name {
                "package.json" => {
                    let mut manifest: serde_json::Value = serde_json::from_str(&content)?;
                    let Some(section) = manifest.get_mut(PACKAGE_KEY).map(serde_json::Value::take) else {
                        log::debug!("{} has no `{PACKAGE_KEY}` key, skipping", path.display());
                        continue;
                    };
                    serde_json::from_value(section)?
                },
                ".colorvar.toml" => toml::from_str(&content)?,
                _ => serde_json::from_str(&content)?,
            };
            log::debug!("loaded config from {}", path.display());
            return Self::from_raw(raw, path);
        }
        log::debug!("no config file in {}", dir.display());
        return Ok(Self::default());
    }

    /// Validate a raw config read from `path`.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigInvalid` if a boolean option has an unrecognized spelling.
    fn from_raw(raw: ColorvarFileConfig, path: PathBuf) -> Result<Self, Error> {
        let flag = |key: &str, value: Option<Flag>| -> Result<Option<bool>, Error> {
            return value
                .map(|v| {
                    return v.enabled().ok_or_else(|| {
                        return Error::ConfigInvalid {
                            path: path.clone(),
                            reason: format!("`{key}` must be true/false or 1/0"),
                        };
                    });
                })
                .transpose();
        };

        return Ok(Self {
            auto_complete: flag("autoComplete", raw.auto_complete)?,
            base: raw.base,
            check: flag("checkMode", raw.check_mode)?,
            modules: raw.modules,
            named_colors: flag("namedColors", raw.named_colors)?,
            path: Some(path.clone()),
            pretty: flag("pretty", raw.pretty)?,
            syntax: raw.syntax,
            template: raw.template,
            variable_files: raw.variable_files,
        });
    }
}

impl Flag {
    /// The boolean this spelling stands for, if it is a recognized one.
    fn enabled(&self) -> Option<bool> {
        return match self {
            Self::Bool(b) => Some(*b),
            Self::Number(n) => match *n {
                0 => Some(false),
                1 => Some(true),
                _ => None,
            },
            Self::Text(text) => parse_flag(text).ok(),
        };
    }
}

impl Options {
    /// Merge command-line values over config values over defaults.
    /// Relative paths are resolved against `cwd`.
    pub fn resolve(cwd: &Path, overrides: Overrides, config: Config) -> Self {
        let base = overrides.base.or(config.base).unwrap_or_else(|| return PathBuf::from("."));
        let jobs = overrides
            .jobs
            .unwrap_or_else(|| return std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get))
            .max(1);
        let variable_files = config
            .variable_files
            .into_iter()
            .chain(overrides.variable_files)
            .map(|path| return cwd.join(path))
            .collect();

        return Self {
            auto_complete: overrides.auto_complete.or(config.auto_complete).unwrap_or(false),
            base: cwd.join(base),
            check: overrides.check.or(config.check).unwrap_or(false),
            file: overrides.file,
            format: overrides.format,
            jobs,
            modules: overrides.modules.or(config.modules),
            named_colors: overrides.named_colors.or(config.named_colors).unwrap_or(false),
            pretty: overrides.pretty.or(config.pretty).unwrap_or(false),
            syntax: overrides.syntax.or(config.syntax).unwrap_or_else(|| return "less".to_string()),
            template: overrides.template.or(config.template).map(|path| return cwd.join(path)),
            variable_files,
        };
    }
}

/// Parse a boolean option spelled `1`/`0` or `true`/`false`.
///
/// # Errors
///
/// Returns a message naming the accepted spellings for anything else.
pub fn parse_flag(text: &str) -> Result<bool, String> {
    return match text.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        other => Err(format!("expected 1/0 or true/false, got `{other}`")),
    };
}
