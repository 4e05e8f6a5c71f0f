//! Confirm-before-overwrite file and directory creation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use moforge_core::project::Confirm;

use crate::backup::backup_path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// Existing file kept because the overwrite was declined.
    Skipped,
    Overwritten { backup: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirOutcome {
    Created,
    /// Existing directory reused as is.
    Existing,
    /// Existing directory backed up, removed and recreated empty.
    Recreated { backup: PathBuf },
}

/// Write `content` to `path`. An existing file is only replaced after
/// confirmation, and only after it has been backed up.
pub fn safe_write_file(path: &Path, content: &str, confirm: &mut dyn Confirm) -> Result<WriteOutcome> {
    let mut outcome = WriteOutcome::Written;
    if path.exists() {
        if !confirm.confirm(&format!("File '{}' exists. Overwrite?", path.display())) {
            eprintln!("Skipped writing to '{}'.", path.display());
            return Ok(WriteOutcome::Skipped);
        }
        let backup = backup_path(path)?;
        eprintln!("Backed up '{}' to '{}'.", path.display(), backup.display());
        outcome = WriteOutcome::Overwritten { backup };
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    eprintln!("Wrote file '{}'.", path.display());
    Ok(outcome)
}

/// Create a directory. An existing one is kept unless the user confirms
/// overwriting it, in which case it is backed up and recreated empty.
pub fn safe_create_dir(path: &Path, confirm: &mut dyn Confirm) -> Result<DirOutcome> {
    if path.exists() {
        if !confirm.confirm(&format!("Directory '{}' exists. Overwrite?", path.display())) {
            eprintln!("Using existing directory '{}'.", path.display());
            return Ok(DirOutcome::Existing);
        }
        let backup = backup_path(path)?;
        eprintln!("Backed up directory '{}' to '{}'.", path.display(), backup.display());
        let removed = if path.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };
        removed.with_context(|| format!("Failed to remove {}", path.display()))?;
        fs::create_dir_all(path).with_context(|| format!("Failed to create {}", path.display()))?;
        eprintln!("Created directory '{}'.", path.display());
        return Ok(DirOutcome::Recreated { backup });
    }
    fs::create_dir_all(path).with_context(|| format!("Failed to create {}", path.display()))?;
    eprintln!("Created directory '{}'.", path.display());
    Ok(DirOutcome::Created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use moforge_core::project::FixedAnswer;

    #[test]
    fn test_write_new_file() {
        let tmp = tempfile::tempdir().unwrap();
        let f = tmp.path().join("sub").join("a.txt");
        let out = safe_write_file(&f, "hello", &mut FixedAnswer::new(false)).unwrap();
        assert_eq!(out, WriteOutcome::Written);
        assert_eq!(fs::read_to_string(&f).unwrap(), "hello");
    }

    #[test]
    fn test_existing_file_declined_is_untouched() {
        let tmp = tempfile::tempdir().unwrap();
        let f = tmp.path().join("a.txt");
        fs::write(&f, "old").unwrap();
        let mut no = FixedAnswer::new(false);
        let out = safe_write_file(&f, "new", &mut no).unwrap();
        assert_eq!(out, WriteOutcome::Skipped);
        assert_eq!(fs::read_to_string(&f).unwrap(), "old");
        assert_eq!(no.asked.len(), 1);
    }

    #[test]
    fn test_existing_file_overwritten_with_backup() {
        let tmp = tempfile::tempdir().unwrap();
        let f = tmp.path().join("a.txt");
        fs::write(&f, "old").unwrap();
        let out = safe_write_file(&f, "new", &mut FixedAnswer::new(true)).unwrap();
        let WriteOutcome::Overwritten { backup } = out else {
            panic!("expected overwrite, got {out:?}");
        };
        assert_eq!(fs::read_to_string(&f).unwrap(), "new");
        assert_eq!(fs::read_to_string(backup.join("a.txt")).unwrap(), "old");
        fs::remove_dir_all(backup).unwrap();
    }

    #[test]
    fn test_create_dir_existing_kept_or_recreated() {
        let tmp = tempfile::tempdir().unwrap();
        let d = tmp.path().join("wrappers");
        assert_eq!(
            safe_create_dir(&d, &mut FixedAnswer::new(true)).unwrap(),
            DirOutcome::Created
        );
        fs::write(d.join("keep.py"), "").unwrap();

        assert_eq!(
            safe_create_dir(&d, &mut FixedAnswer::new(false)).unwrap(),
            DirOutcome::Existing
        );
        assert!(d.join("keep.py").exists());

        let out = safe_create_dir(&d, &mut FixedAnswer::new(true)).unwrap();
        let DirOutcome::Recreated { backup } = out else {
            panic!("expected recreate, got {out:?}");
        };
        assert!(d.is_dir());
        assert!(!d.join("keep.py").exists());
        assert!(backup.join("wrappers").join("keep.py").exists());
        fs::remove_dir_all(backup).unwrap();
    }
}
