use crate::ports::FileWriter;
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Overwrites files in place, keeping a backup of the original next to the
/// file until the new content is written.
pub struct BackupWriter;

impl BackupWriter {
    /// Writes `original` to `<path>.<random>` with the permissions of `path`.
    fn backup(path: &Path, original: &str) -> Result<PathBuf> {
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let name = path
            .file_name()
            .ok_or_else(|| anyhow!("{} is not a file path", path.display()))?;
        let perms = fs::metadata(path)
            .with_context(|| format!("Failed to stat {}", path.display()))?
            .permissions();

        let mut tmp = tempfile::Builder::new()
            .prefix(&format!("{}.", name.to_string_lossy()))
            .tempfile_in(dir)
            .with_context(|| format!("Failed to create backup for {}", path.display()))?;
        tmp.write_all(original.as_bytes())
            .context("Failed to write backup")?;
        let (_, backup) = tmp.keep().context("Failed to keep backup file")?;
        fs::set_permissions(&backup, perms)
            .with_context(|| format!("Failed to set permissions on {}", backup.display()))?;
        Ok(backup)
    }

    /// Backs up `path`, then runs `write` on it. If `write` fails the backup
    /// is moved back over `path`.
    fn replace_with(
        path: &Path,
        original: &str,
        write: impl FnOnce(&Path) -> io::Result<()>,
    ) -> Result<()> {
        let backup = Self::backup(path, original)?;
        debug!("[tryhard] Backed up {} to {}", path.display(), backup.display());

        if let Err(e) = write(path) {
            if let Err(restore) = fs::rename(&backup, path) {
                warn!(
                    "[tryhard] Failed to restore {} from {}: {}",
                    path.display(),
                    backup.display(),
                    restore
                );
            }
            return Err(e).with_context(|| format!("Failed to write {}", path.display()));
        }
        fs::remove_file(&backup)
            .with_context(|| format!("Failed to remove backup {}", backup.display()))
    }
}

impl FileWriter for BackupWriter {
    fn write(&self, path: &Path, original: &str, updated: &str) -> Result<()> {
        Self::replace_with(path, original, |path| fs::write(path, updated))
    }
}
