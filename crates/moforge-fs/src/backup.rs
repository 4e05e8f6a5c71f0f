//! Backups go to a fresh, persistent directory per call:
//! `$TMPDIR/moforge_backup_<utc timestamp>_XXXXXX/<basename>`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// Copy a file or directory tree into a new backup dir and return that dir.
pub fn backup_path(path: &Path) -> Result<PathBuf> {
    let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ");
    let backup_dir = tempfile::Builder::new()
        .prefix(&format!("moforge_backup_{}_", stamp))
        .tempdir()
        .context("Create backup dir")?
        .keep();
    let base_name = path
        .file_name()
        .with_context(|| format!("Cannot back up path without a name: {}", path.display()))?;
    let dest = backup_dir.join(base_name);

    if path.is_dir() {
        copy_tree(path, &dest)?;
    } else if path.is_file() {
        fs::copy(path, &dest)
            .with_context(|| format!("Failed to back up {}", path.display()))?;
    }
    tracing::info!(from = %path.display(), to = %backup_dir.display(), "backup created");
    Ok(backup_dir)
}

fn copy_tree(src: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry.with_context(|| format!("Failed to walk {}", src.display()))?;
        let rel = entry.path().strip_prefix(src)?;
        let target = dest.join(rel);
        let ft = entry.file_type();
        if ft.is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create {}", target.display()))?;
        } else if ft.is_file() {
            fs::copy(entry.path(), &target)
                .with_context(|| format!("Failed to copy {}", entry.path().display()))?;
        } else if ft.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, target: &Path) -> Result<()> {
    let link = fs::read_link(src)?;
    std::os::unix::fs::symlink(link, target)
        .with_context(|| format!("Failed to copy symlink {}", src.display()))
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, _target: &Path) -> Result<()> {
    tracing::warn!(path = %src.display(), "symlink not backed up on this platform");
    Ok(())
}

/// Back up a directory, then remove it. Returns the backup location.
pub fn remove_dir_with_backup(path: &Path) -> Result<PathBuf> {
    let backup = backup_path(path)?;
    fs::remove_dir_all(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    Ok(backup)
}
