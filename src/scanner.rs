use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use walkdir::WalkDir;

use crate::error::Error;

/// Compile the `modules` glob.
///
/// # Errors
///
/// Returns `Error::InvalidGlob` if the pattern does not compile.
fn compile_glob(pattern: &str) -> Result<GlobMatcher, Error> {
    return Glob::new(pattern)
        .map(|glob| return glob.compile_matcher())
        .map_err(|e| {
            return Error::InvalidGlob {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            };
        });
}

/// Resolve a single input file against the base directory.
///
/// # Errors
///
/// Returns `Error::InputNotFound` if nothing exists at the path, or
/// `Error::InputNotFile` if it is a directory or other non-regular file.
pub fn resolve_file(base: &Path, file: &Path) -> Result<PathBuf, Error> {
    let path = if file.is_absolute() { file.to_path_buf() } else { base.join(file) };
    let metadata = match std::fs::metadata(&path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(Error::InputNotFound { path }),
        Err(e) => return Err(Error::Io(e)),
    };
    if !metadata.is_file() {
        return Err(Error::InputNotFile { path });
    }
    return Ok(path);
}

/// Find every file under `base` whose path relative to `base` matches `pattern`.
/// Entries are visited sorted by file name, so the result order is stable
/// across runs and platforms.
///
/// # Errors
///
/// Returns `Error::InvalidGlob` for a bad pattern, `Error::Io` if the base
/// directory cannot be walked, or `Error::NoMatchingFiles` if nothing matches.
pub fn scan(base: &Path, pattern: &str) -> Result<Vec<PathBuf>, Error> {
    let matcher = compile_glob(pattern)?;
    let mut files = Vec::new();

    for entry in WalkDir::new(base).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(base).unwrap_or(entry.path());
        if matcher.is_match(relative) {
            files.push(entry.into_path());
        }
    }

    if files.is_empty() {
        return Err(Error::NoMatchingFiles {
            base: base.to_path_buf(),
            pattern: pattern.to_string(),
        });
    }
    log::debug!("{} files match `{pattern}` under {}", files.len(), base.display());
    return Ok(files);
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src/b")).unwrap();
        std::fs::write(dir.path().join("src/z.less"), "").unwrap();
        std::fs::write(dir.path().join("src/b/a.less"), "").unwrap();
        std::fs::write(dir.path().join("src/a.less"), "").unwrap();
        std::fs::write(dir.path().join("src/a.scss"), "").unwrap();
        return dir;
    }

    #[test]
    fn matches_relative_to_base_in_stable_order() {
        let dir = tree();
        let files = scan(dir.path(), "src/**/*.less").unwrap();
        let relative: Vec<PathBuf> = files
            .iter()
            .map(|f| return f.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(relative, vec![
            PathBuf::from("src/a.less"),
            PathBuf::from("src/b/a.less"),
            PathBuf::from("src/z.less")
        ]);
    }

    #[test]
    fn no_match_is_an_error() {
        let dir = tree();
        assert!(matches!(scan(dir.path(), "**/*.styl"), Err(Error::NoMatchingFiles { .. })));
    }

    #[test]
    fn invalid_glob_is_an_error() {
        let dir = tree();
        assert!(matches!(scan(dir.path(), "src/[a"), Err(Error::InvalidGlob { .. })));
    }

    #[test]
    fn single_file_resolves_against_base() {
        let dir = tree();
        let path = resolve_file(&dir.path().join("src"), Path::new("a.less")).unwrap();
        assert_eq!(path, dir.path().join("src/a.less"));
        assert!(matches!(
            resolve_file(dir.path(), Path::new("missing.less")),
            Err(Error::InputNotFound { .. })
        ));
        assert!(matches!(resolve_file(dir.path(), Path::new("src")), Err(Error::InputNotFile { .. })));
    }
}
