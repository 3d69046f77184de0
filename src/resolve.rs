//! Expands command-line paths into (input, output) pairs.
//!
//! Directory entries are taken in the order the OS lists them. With
//! recursion disabled a subdirectory entry is still returned as a target,
//! so stamping it fails like any other unreadable input.

use crate::error::StampError;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

const OUT_SUFFIX: &str = ".out";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Target {
    pub fn new(input: PathBuf, output_dir: Option<&Path>) -> Self {
        let output = output_path_for(&input, output_dir);
        Self { input, output }
    }
}

/// `<output_dir>/<basename>.out` when an output directory is set, otherwise
/// `<input>.out` next to the input. Inputs sharing a basename map to the
/// same file inside an output directory.
pub fn output_path_for(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    match output_dir {
        Some(dir) => {
            let mut name = input
                .file_name()
                .map(OsString::from)
                .unwrap_or_default();
            name.push(OUT_SUFFIX);
            dir.join(name)
        }
        None => {
            let mut path = input.as_os_str().to_owned();
            path.push(OUT_SUFFIX);
            PathBuf::from(path)
        }
    }
}

/// Resolves one command-line path. A directory that cannot be listed yields
/// an error entry in place of its contents.
pub fn resolve(
    path: &Path,
    recursive: bool,
    output_dir: Option<&Path>,
) -> Vec<Result<Target, StampError>> {
    let mut targets = Vec::new();
    if path.is_dir() {
        walk(path, recursive, output_dir, &mut targets);
    } else {
        targets.push(Ok(Target::new(path.to_path_buf(), output_dir)));
    }
    targets
}

fn walk(
    dir: &Path,
    recursive: bool,
    output_dir: Option<&Path>,
    targets: &mut Vec<Result<Target, StampError>>,
) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(source) => {
            targets.push(Err(StampError::ListDir {
                path: dir.to_path_buf(),
                source,
            }));
            return;
        }
    };

    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(source) => {
                targets.push(Err(StampError::ListDir {
                    path: dir.to_path_buf(),
                    source,
                }));
                continue;
            }
        };

        if recursive && path.is_dir() {
            walk(&path, recursive, output_dir, targets);
        } else {
            targets.push(Ok(Target::new(path, output_dir)));
        }
    }
}
