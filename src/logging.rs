use std::io::Write as _;

use log::{Level, LevelFilter, Log, Metadata, Record};

/// Writes `[LEVEL] message` lines to stderr.
struct StderrLogger {
    /// Most verbose level that is printed.
    level: LevelFilter,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        return metadata.level() <= self.level;
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            let _ = writeln!(std::io::stderr().lock(), "[{}] {}", record.level(), record.args());
        }
    }
}

/// Map the number of `-v` flags to a level: warnings by default, then info, then debug.
pub const fn level_for(verbosity: u8) -> LevelFilter {
    return match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
}

/// Install the stderr logger. Calling it twice keeps the first logger.
pub fn init(verbosity: u8) {
    let level = level_for(verbosity);
    if log::set_boxed_logger(Box::new(StderrLogger { level })).is_ok() {
        log::set_max_level(level);
    }
    log::debug!("log level {}", level.to_level().unwrap_or(Level::Error));
}
