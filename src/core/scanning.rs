//! Input discovery
//!
//! Turns the paths given on the command line into the flat file list a
//! batch runs over. Files pass through untouched; directories are walked
//! recursively and filtered down to audio the classifier recognizes.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::audio::{detect_format, Classifier};

/// Expand `paths` into the files to convert.
///
/// Explicit files are kept even if they are not audio, so the batch can
/// report them as failures. Directory contents are sorted by name at every
/// level.
pub fn collect_inputs(paths: &[PathBuf], classifier: &dyn Classifier) -> Result<Vec<PathBuf>, String> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            let found = scan_directory(path, classifier);
            log::debug!("Found {} audio files under {}", found.len(), path.display());
            files.extend(found);
        } else if path.exists() {
            files.push(path.clone());
        } else {
            return Err(format!("Path does not exist: {}", path.display()));
        }
    }

    Ok(files)
}

/// Every supported audio file below `path`
pub fn scan_directory(path: &Path, classifier: &dyn Classifier) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(path)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        match detect_format(classifier, entry.path()) {
            Ok(format) if format.is_supported() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => log::debug!("Skipping {}: {}", entry.path().display(), e),
        }
    }

    files
}
