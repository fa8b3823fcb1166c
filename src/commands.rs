//! The colorvar run: discover files, transform them, report, auto-complete.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::batch;
use crate::config::{Options, ReportFormat};
use crate::error::Error;
use crate::report::Report;
use crate::scanner;
use crate::syntax::{self, Dialect};
use crate::template::Template;
use crate::transform::Transformer;

/// Append generated declarations for every undeclared color to the first
/// variable file. A missing target is logged and skipped.
///
/// # Errors
///
/// Returns `Error::Io` if the target exists but cannot be appended to.
fn append_completion(report: &Report, dialect: Dialect, variable_files: &[PathBuf]) -> Result<(), Error> {
    let Some(completion) = report.completion(dialect) else {
        return Ok(());
    };
    let Some(target) = variable_files.first() else {
        log::warn!("auto-complete is on but no variable file is configured");
        return Ok(());
    };
    if !target.is_file() {
        log::warn!("auto-complete target {} does not exist, skipping", target.display());
        return Ok(());
    }

    let mut file = std::fs::OpenOptions::new().append(true).open(target)?;
    file.write_all(completion.as_bytes())?;
    let count = report.undeclared.iter().map(|group| return group.literals.len()).sum::<usize>();
    log::info!("appended {count} color variables to {}", target.display());
    return Ok(());
}

/// Exit code for a finished batch: failures (2) over unmatched colors (1) over clean (0).
fn exit_code(report: &Report) -> ExitCode {
    if report.has_failures() {
        return ExitCode::from(2);
    } else if report.unmatched_count() > 0 {
        return ExitCode::from(1);
    } else {
        return ExitCode::SUCCESS;
    }
}

/// Resolve the input files: the single file if given, otherwise the `modules` glob.
///
/// # Errors
///
/// Returns `Error::InputNotFound` / `Error::InputNotFile` for a bad single file,
/// `Error::MissingInput` if neither is set, or the scanner's errors.
fn input_files(options: &Options) -> Result<Vec<PathBuf>, Error> {
    if let Some(file) = &options.file {
        return Ok(vec![scanner::resolve_file(&options.base, file)?]);
    }
    let pattern = options.modules.as_deref().ok_or(Error::MissingInput)?;
    return scanner::scan(&options.base, pattern);
}

/// Read and parse the output template.
///
/// # Errors
///
/// Returns `Error::InputNotFound` if the file is missing, `Error::Io` if it
/// cannot be read, or `Error::UnknownPlaceholder` if it names an unknown section.
fn load_template(path: &Path) -> Result<Template, Error> {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::InputNotFound {
                path: path.to_path_buf(),
            });
        },
        Err(e) => return Err(Error::Io(e)),
    };
    return Template::parse(&text);
}

/// Print the report to stdout in the requested format.
///
/// # Errors
///
/// Returns `Error::Json` if the report cannot be serialized.
fn print_report(report: &Report, format: ReportFormat) -> Result<(), Error> {
    match format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        ReportFormat::Text => print!("{}", report.render_text()),
    }
    return Ok(());
}

/// Run one batch with fully resolved options.
///
/// Fatal problems (unknown syntax, bad inputs, bad template or variable files)
/// abort before any file is transformed. Per-file failures are collected into
/// the report.
///
/// # Errors
///
/// Returns the fatal error that stopped the run before the batch started, or
/// `Error::Io` / `Error::Json` from reporting and auto-completion.
pub fn run(options: &Options) -> Result<ExitCode, Error> {
    let syntax = syntax::resolve(&options.syntax)?;
    let template = options.template.as_deref().map(load_template).transpose()?;
    let files = input_files(options)?;
    let seed = Transformer::seed_from_files(syntax, &options.variable_files, options.named_colors)?;

    let transformer = Transformer {
        check: options.check,
        named_colors: options.named_colors,
        pretty: options.pretty,
        seed,
        syntax,
        template,
    };
    let results = batch::run(&files, options.jobs, &transformer);
    let report = Report::aggregate(results, &options.base);
    print_report(&report, options.format)?;

    if options.check && options.auto_complete {
        append_completion(&report, syntax.dialect(), &options.variable_files)?;
    }

    return Ok(exit_code(&report));
}
