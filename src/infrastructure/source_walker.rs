use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Go files found under the command-line paths, plus the paths that could
/// not be read.
#[derive(Debug, Default)]
pub struct Collected {
    pub files: Vec<PathBuf>,
    pub errors: Vec<(PathBuf, anyhow::Error)>,
}

/// Expands `paths` into the Go files to process.
///
/// File arguments are taken as given. Directories are walked recursively in
/// lexical order, keeping `*.go` files whose name does not start with `.` and
/// whose path does not match `ignore`.
pub fn collect_go_files(paths: &[PathBuf], ignore: Option<&Regex>) -> Collected {
    let mut out = Collected::default();
    for path in paths {
        match fs::metadata(path) {
            Ok(meta) if meta.is_dir() => walk_dir(path, ignore, &mut out),
            Ok(_) => out.files.push(path.clone()),
            Err(e) => out.errors.push((path.clone(), e.into())),
        }
    }
    debug!("[tryhard] Collected {} files", out.files.len());
    out
}

fn walk_dir(dir: &Path, ignore: Option<&Regex>, out: &mut Collected) {
    let entries = match sorted_entries(dir) {
        Ok(entries) => entries,
        Err(e) if is_vanished(&e) => return,
        Err(e) => {
            out.errors.push((dir.to_path_buf(), e));
            return;
        }
    };
    for path in entries {
        let meta = match fs::symlink_metadata(&path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => {
                out.errors.push((path, e.into()));
                continue;
            }
        };
        if meta.is_dir() {
            walk_dir(&path, ignore, out);
        } else if is_go_file(&path) {
            if ignore.is_some_and(|rx| rx.is_match(&path.to_string_lossy())) {
                debug!("[tryhard] Ignoring {}", path.display());
                continue;
            }
            out.files.push(path);
        }
    }
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()
        .with_context(|| format!("Failed to list directory {}", dir.display()))?;
    entries.sort();
    Ok(entries)
}

fn is_vanished(e: &anyhow::Error) -> bool {
    e.downcast_ref::<io::Error>()
        .is_some_and(|e| e.kind() == io::ErrorKind::NotFound)
}

fn is_go_file(path: &Path) -> bool {
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => !name.starts_with('.') && name.ends_with(".go"),
        None => false,
    }
}
