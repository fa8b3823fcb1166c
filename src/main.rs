mod batch;
mod color;
mod commands;
mod config;
mod diagnostics;
mod document;
mod error;
mod logging;
mod matcher;
mod report;
mod scanner;
mod syntax;
mod template;
mod transform;
mod types;
mod variables;
mod walker;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use crate::config::{Config, Options, Overrides, ReportFormat};

#[derive(Parser)]
#[command(
    name = "colorvar",
    about = "Replace hard-coded colors in LESS/SCSS with theme variables",
    version
)]
struct Cli {
    /// Append declarations for unmatched colors to the first variable file (check mode only)
    #[arg(long)]
    auto_complete: bool,
    /// Base directory for --modules and relative input files
    #[arg(short, long)]
    base: Option<PathBuf>,
    /// Check mode: 1 reports without writing, 0 rewrites files
    #[arg(short = 'c', long = "check-mode", value_name = "0|1", value_parser = config::parse_flag)]
    check_mode: Option<bool>,
    /// Stylesheet to convert
    file: Option<PathBuf>,
    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,
    /// Number of files transformed concurrently
    #[arg(short, long)]
    jobs: Option<usize>,
    /// Glob selecting stylesheets under the base directory
    #[arg(short, long)]
    modules: Option<String>,
    /// Treat CSS color names such as `red` as colors
    #[arg(long)]
    named_colors: bool,
    /// Pretty-print the output
    #[arg(long)]
    pretty: bool,
    /// Stylesheet syntax: less or scss
    #[arg(short, long)]
    syntax: Option<String>,
    /// Template re-assembling output from {{ imports }}, {{ basic }} and {{ colors }}
    #[arg(long)]
    template: Option<PathBuf>,
    /// Stylesheet whose variables seed the table (repeatable)
    #[arg(long = "variables", value_name = "FILE")]
    variables: Vec<PathBuf>,
    /// More logging: -v for info, -vv for debug
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Command-line values that override the config file.
    fn overrides(self) -> Overrides {
        return Overrides {
            auto_complete: self.auto_complete.then_some(true),
            base: self.base,
            check: self.check_mode,
            file: self.file,
            format: self.format,
            jobs: self.jobs,
            modules: self.modules,
            named_colors: self.named_colors.then_some(true),
            pretty: self.pretty.then_some(true),
            syntax: self.syntax,
            template: self.template,
            variable_files: self.variables,
        };
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    return match load_options(cli).and_then(|options| return commands::run(&options)) {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(2)
        },
    };
}

/// Merge the command line with the config file found in the working directory.
///
/// # Errors
///
/// Returns `Error::Io` if the working directory is unavailable, or the config
/// loader's errors.
fn load_options(cli: Cli) -> Result<Options, error::Error> {
    let cwd = std::env::current_dir()?;
    let config = Config::discover(&cwd)?;
    if let Some(path) = &config.path {
        log::info!("using options from {}", path.display());
    }
    return Ok(Options::resolve(&cwd, cli.overrides(), config));
}
