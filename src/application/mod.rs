use crate::domain::config::Config;
use crate::domain::stats::Stats;
use crate::domain::walker::walk_file;
use crate::ports::{FileWriter, SourceParser, SourcePrinter};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Outcome of processing one file.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub stats: Stats,
    pub rewritten: bool,
}

/// A path that could not be processed.
#[derive(Debug)]
pub struct FileError {
    pub path: PathBuf,
    pub error: anyhow::Error,
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:#}", self.path.display(), self.error)
    }
}

/// Combined outcome of a run over many files.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Files attempted, failed ones included.
    pub files: usize,
    pub stats: Stats,
    pub rewritten: Vec<PathBuf>,
    pub errors: Vec<FileError>,
}

impl RunReport {
    pub fn push_error(&mut self, path: PathBuf, error: anyhow::Error) {
        self.errors.push(FileError { path, error });
    }
}

pub struct TryhardUsecase<'a> {
    pub parser: &'a dyn SourceParser,
    pub printer: &'a dyn SourcePrinter,
    pub writer: &'a dyn FileWriter,
    pub config: &'a Config,
}

impl<'a> TryhardUsecase<'a> {
    /// Reads, parses and walks one file. In rewrite mode a modified file is
    /// printed and written back.
    pub fn process_file(&self, path: &Path) -> Result<FileReport> {
        let source = fs::read_to_string(path).context("Failed to read file")?;
        let name = path.to_string_lossy();
        let mut file = self.parser.parse(&name, &source)?;

        let mut stats = Stats::new();
        let modified = walk_file(&mut file, self.config, &mut stats);

        let mut rewritten = false;
        if modified {
            let updated = self.printer.print(&source, &file)?;
            if updated != source {
                self.writer.write(path, &source, &updated)?;
                rewritten = true;
                debug!("[tryhard] Rewrote {}", path.display());
            }
        }

        Ok(FileReport {
            path: path.to_path_buf(),
            stats,
            rewritten,
        })
    }

    /// Processes `paths` in parallel. Statistics are merged in input order so
    /// the reported positions do not depend on scheduling.
    pub fn run(&self, paths: &[PathBuf]) -> RunReport {
        let results: Vec<Result<FileReport>> = paths
            .par_iter()
            .map(|path| self.process_file(path))
            .collect();

        let mut report = RunReport::default();
        for (path, result) in paths.iter().zip(results) {
            report.files += 1;
            match result {
                Ok(file) => {
                    if file.rewritten {
                        report.rewritten.push(file.path);
                    }
                    report.stats.merge(file.stats);
                }
                Err(e) => report.push_error(path.clone(), e),
            }
        }

        info!(
            "[tryhard] Processed {} files ({} rewritten, {} errors)",
            report.files,
            report.rewritten.len(),
            report.errors.len()
        );
        report
    }
}
