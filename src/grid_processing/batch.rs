use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use walkdir::WalkDir;

use super::{ConversionOutcome, GridConverter, GridSize};
use crate::error::{GridError, GridResult};
use crate::utils::has_valid_extension;

/// Suffix appended to the source stem for grid documents
pub const GRID_SUFFIX: &str = "_grid.json";

/// Default extensions picked up when scanning directories
pub const DEFAULT_EXTENSIONS: &str = "png,jpg,jpeg,bmp,gif,webp,tiff";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    pub source: PathBuf,
    pub destination: PathBuf,
}

#[derive(Debug)]
pub struct BatchResult {
    pub job: BatchJob,
    pub result: GridResult<ConversionOutcome>,
}

/// `<stem>_grid.json`, next to the source or inside `output_dir`
pub fn grid_output_path(source: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let file_name = format!("{}{}", stem, GRID_SUFFIX);

    match output_dir {
        Some(dir) => dir.join(file_name),
        None => source.with_file_name(file_name),
    }
}

/// Expand the inputs into a sorted list of image files.
///
/// Files given explicitly are kept as-is (missing ones are reported later by
/// the converter); directories are walked recursively and filtered by extension.
pub fn discover_images(inputs: &[PathBuf], extensions: &[String]) -> GridResult<Vec<PathBuf>> {
    let mut image_files = Vec::new();

    for input in inputs {
        if !input.is_dir() {
            image_files.push(input.clone());
            continue;
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(input).follow_links(false).max_depth(10) {
            let entry = entry.map_err(|e| GridError::io(input, e.into()))?;
            let path = entry.path();
            if path.is_file() && has_valid_extension(path, extensions) {
                found.push(path.to_path_buf());
            }
        }
        found.sort();
        image_files.extend(found);
    }

    Ok(image_files)
}

/// Pair every source with a destination, keeping destinations unique.
///
/// `photo.png` and `photo.jpg` in the same place would both map to
/// `photo_grid.json`; the later one becomes `photo_jpg_grid.json`, and any
/// further clash gets a counter: `photo_jpg_2_grid.json`.
pub fn plan_jobs(sources: &[PathBuf], output_dir: Option<&Path>) -> Vec<BatchJob> {
    let mut taken = HashSet::new();

    sources
        .iter()
        .map(|source| {
            let mut destination = grid_output_path(source, output_dir);
            if !taken.insert(destination.clone()) {
                let ext = source
                    .extension()
                    .map(|e| e.to_string_lossy().to_lowercase())
                    .unwrap_or_default();
                let stem = source
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "image".to_string());

                destination.set_file_name(format!("{}_{}{}", stem, ext, GRID_SUFFIX));
                let mut counter = 2;
                while !taken.insert(destination.clone()) {
                    destination
                        .set_file_name(format!("{}_{}_{}{}", stem, ext, counter, GRID_SUFFIX));
                    counter += 1;
                }
            }
            BatchJob {
                source: source.clone(),
                destination,
            }
        })
        .collect()
}

/// Converts many files, one file per worker.
///
/// Each file is still converted by the single-threaded core; parallelism only
/// spans files. Runs on the current rayon pool.
pub struct BatchConverter {
    converter: GridConverter,
    size: GridSize,
}

impl BatchConverter {
    pub fn new(converter: GridConverter, size: GridSize) -> Self {
        Self { converter, size }
    }

    /// Convert every job. A failure never stops the others.
    ///
    /// `on_done(result, finished_count)` runs on the worker thread after each file.
    pub fn convert_all<F>(&self, jobs: &[BatchJob], on_done: F) -> Vec<BatchResult>
    where
        F: Fn(&BatchResult, usize) + Send + Sync,
    {
        let finished = AtomicUsize::new(0);
        let width = i64::from(self.size.width());
        let height = i64::from(self.size.height());

        jobs.par_iter()
            .map(|job| {
                let result = self.converter.convert_file(
                    &job.source,
                    &job.destination,
                    width,
                    height,
                    |_, _| {},
                );
                let batch_result = BatchResult {
                    job: job.clone(),
                    result,
                };

                let count = finished.fetch_add(1, Ordering::Relaxed) + 1;
                on_done(&batch_result, count);
                batch_result
            })
            .collect()
    }
}
