//! Renames that keep git history when the project is a git work tree.

use std::fs;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};

/// Rename `src` to `dst` (both relative to `base`).
///
/// Uses `git mv` when git is installed and `base` is inside a work tree;
/// falls back to a plain rename otherwise, or when `git mv` refuses (for
/// example on untracked folders).
pub fn rename_path(base: &Path, src: &str, dst: &str) -> Result<()> {
    if in_git_work_tree(base) {
        let out = Command::new("git")
            .args(["mv", src, dst])
            .current_dir(base)
            .output()
            .context("Failed to spawn git mv")?;
        if out.status.success() {
            tracing::info!(from = %src, to = %dst, "renamed with git mv");
            return Ok(());
        }
        tracing::warn!(
            from = %src,
            to = %dst,
            stderr = %String::from_utf8_lossy(&out.stderr).trim(),
            "git mv failed; falling back to plain rename"
        );
    }
    fs::rename(base.join(src), base.join(dst))
        .with_context(|| format!("Failed to rename '{}' to '{}'", src, dst))?;
    tracing::info!(from = %src, to = %dst, "renamed");
    Ok(())
}

fn in_git_work_tree(base: &Path) -> bool {
    if which::which("git").is_err() {
        return false;
    }
    Command::new("git")
        .args(["rev-parse", "--is-inside-work-tree"])
        .current_dir(base)
        .output()
        .map(|o| o.status.success() && String::from_utf8_lossy(&o.stdout).trim() == "true")
        .unwrap_or(false)
}
