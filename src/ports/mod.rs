use crate::domain::ast::File;
use anyhow::Result;
use std::path::Path;

pub mod report_exporter;

pub trait SourceParser: Send + Sync {
    /// Parses one Go source file. `path` is only used for diagnostics and
    /// recorded positions.
    fn parse(&self, path: &str, source: &str) -> Result<File>;
}

pub trait SourcePrinter: Send + Sync {
    /// Renders `file`, which was parsed from `source` and possibly rewritten.
    fn print(&self, source: &str, file: &File) -> Result<String>;
}

pub trait FileWriter: Send + Sync {
    fn write(&self, path: &Path, original: &str, updated: &str) -> Result<()>;
}
