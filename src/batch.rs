//! Fixed-size worker pool that transforms files concurrently.
use std::path::PathBuf;

use crate::error::Error;
use crate::transform::{FileOutcome, Transformer};

/// Result of one file in a batch, in discovery order.
pub struct BatchResult {
    /// Transform output, or the per-file failure.
    pub outcome: Result<FileOutcome, Error>,
    /// The file.
    pub path: PathBuf,
}

/// Transform every file with up to `jobs` workers.
///
/// Workers pull paths from a shared queue and send results tagged with the
/// discovery index. Results are buffered until every worker finishes and then
/// returned in discovery order, whatever order they completed in. A failing
/// file does not stop the others.
pub fn run(files: &[PathBuf], jobs: usize, transformer: &Transformer) -> Vec<BatchResult> {
    let workers = jobs.clamp(1, files.len().max(1));
    let (job_tx, job_rx) = crossbeam_channel::unbounded::<(usize, &PathBuf)>();
    let (result_tx, result_rx) = crossbeam_channel::unbounded::<(usize, Result<FileOutcome, Error>)>();

    for job in files.iter().enumerate() {
        if job_tx.send(job).is_err() {
            break;
        }
    }
    drop(job_tx);
    log::info!("transforming {} files with {workers} workers", files.len());

    std::thread::scope(|scope| {
        for _ in 0..workers {
            let jobs = job_rx.clone();
            let results = result_tx.clone();
            scope.spawn(move || {
                for (index, path) in jobs {
                    let outcome = transformer.run(path);
                    if let Ok(done) = &outcome {
                        log::debug!(
                            "{}: {} output bytes in {}ms",
                            done.path.display(),
                            done.output.as_ref().map_or(0, String::len),
                            done.elapsed.as_millis()
                        );
                    }
                    if results.send((index, outcome)).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(result_tx);

    let mut slots: Vec<Option<Result<FileOutcome, Error>>> = files.iter().map(|_| return None).collect();
    for (index, outcome) in result_rx {
        if let Some(slot) = slots.get_mut(index) {
            *slot = Some(outcome);
        }
    }

    return files
        .iter()
        .zip(slots)
        .map(|(path, slot)| {
            return BatchResult {
                outcome: slot.unwrap_or_else(|| {
                    return Err(Error::Io(std::io::Error::other("worker exited before finishing the file")));
                }),
                path: path.clone(),
            };
        })
        .collect();
}
