//! Input discovery.
//!
//! Turns the paths given on the command line into an ordered list of image
//! files. Explicit files are taken as-is, in argument order. Directories are
//! walked recursively and contribute their supported images sorted by path,
//! so repeated runs see the same order.
//!
//! An entry that cannot be walked or read (a dangling symlink, a permission
//! error) is logged and returned as [`Unreadable`]; the rest of the batch
//! carries on. Only a command-line path that does not exist at all is an
//! error.
//!
//! Loaded files are named by their file name. When a recursive walk turns up
//! the same name twice, later files get a numeric suffix (`photo.png`,
//! `photo-2.png`) so every file keeps its own output slot.

use crate::imaging::supported_input_extensions;
use crate::types::ImageFile;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Input not found: {0}")]
    NotFound(PathBuf),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A path that was found but could not be walked or read.
#[derive(Debug)]
pub struct Unreadable {
    pub path: PathBuf,
    pub error: ScanError,
}

/// Image paths to process, plus entries that could not be walked.
#[derive(Debug, Default)]
pub struct Inputs {
    pub files: Vec<PathBuf>,
    pub unreadable: Vec<Unreadable>,
}

/// Files read into memory, plus paths that could not be read.
#[derive(Debug, Default)]
pub struct Loaded {
    pub files: Vec<ImageFile>,
    pub unreadable: Vec<Unreadable>,
}

/// Whether `path` has an extension with a compiled-in decoder.
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

/// Expand `inputs` into a list of files.
pub fn collect_inputs(inputs: &[PathBuf]) -> Result<Inputs, ScanError> {
    let mut collected = Inputs::default();

    for input in inputs {
        if input.is_dir() {
            let mut found = Vec::new();
            for entry in WalkDir::new(input).follow_links(true) {
                match entry {
                    Ok(entry) => {
                        if entry.file_type().is_file() && is_supported_image(entry.path()) {
                            found.push(entry.into_path());
                        }
                    }
                    Err(err) => {
                        let path = err
                            .path()
                            .map(Path::to_path_buf)
                            .unwrap_or_else(|| input.clone());
                        warn!("cannot read {}: {}", path.display(), err);
                        collected.unreadable.push(Unreadable {
                            path,
                            error: err.into(),
                        });
                    }
                }
            }
            found.sort();
            collected.files.extend(found);
        } else if input.is_file() {
            collected.files.push(input.clone());
        } else {
            return Err(ScanError::NotFound(input.clone()));
        }
    }

    Ok(collected)
}

/// Read a file into memory, named by its file name.
pub fn load_file(path: &Path) -> Result<ImageFile, ScanError> {
    let data = std::fs::read(path)?;
    Ok(ImageFile::new(file_name(path), data))
}

/// Read every path, skipping unreadable ones and keeping names unique.
pub fn load_files(paths: &[PathBuf]) -> Loaded {
    let mut loaded = Loaded::default();
    // Lowercased, since output directories may be case-insensitive.
    let mut taken: HashMap<String, &Path> = HashMap::new();

    for path in paths {
        let mut file = match load_file(path) {
            Ok(file) => file,
            Err(error) => {
                warn!("cannot read {}: {}", path.display(), error);
                loaded.unreadable.push(Unreadable {
                    path: path.clone(),
                    error,
                });
                continue;
            }
        };

        if let Some(first) = taken.get(&file.name.to_lowercase()) {
            let renamed = unique_name(&file.name, &taken);
            warn!(
                "{} has the same name as {}; writing it as {}",
                path.display(),
                first.display(),
                renamed
            );
            file.name = renamed;
        }
        taken.insert(file.name.to_lowercase(), path);
        loaded.files.push(file);
    }

    loaded
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// First `stem-N.ext` (N from 2) not already in `taken`.
fn unique_name(name: &str, taken: &HashMap<String, &Path>) -> String {
    let path = Path::new(name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let ext = path.extension().map(|e| e.to_string_lossy());

    let mut n = 2;
    loop {
        let candidate = match &ext {
            Some(ext) => format!("{stem}-{n}.{ext}"),
            None => format!("{stem}-{n}"),
        };
        if !taken.contains_key(&candidate.to_lowercase()) {
            return candidate;
        }
        n += 1;
    }
}
