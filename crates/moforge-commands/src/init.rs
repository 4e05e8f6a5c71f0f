//! `mo init`: scaffold a model project.
//!
//! Layout:
//!   <Model_Name>/
//!     Mo.yaml  requirements.txt  tox.ini  build.sh
//!     config/.env  wrappers/  tests/  utils/

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use moforge_core::project::{Confirm, MoManifest, MANIFEST_FILE};
use moforge_fs::{safe_create_dir, safe_write_file};

use crate::templates::Templates;

const PROJECT_DIRS: &[&str] = &["wrappers", "config", "tests", "utils"];

/// Project directory name: spaces become underscores.
pub fn project_dir_name(model: &str) -> String {
    model.trim().replace(' ', "_")
}

/// `mo init --model <NAME>`; returns the project directory.
pub fn cmd_init(
    parent: &Path,
    model: &str,
    templates: &Templates,
    confirm: &mut dyn Confirm,
) -> Result<PathBuf> {
    let model = model.trim();
    if model.is_empty() {
        anyhow::bail!("Model name must not be empty");
    }
    let dir_name = project_dir_name(model);
    if dir_name.contains(['/', '\\']) || dir_name.starts_with('.') {
        anyhow::bail!("Model name '{}' cannot be used as a directory name", model);
    }
    let base = parent.join(&dir_name);

    safe_create_dir(&base, confirm)?;
    for d in PROJECT_DIRS {
        safe_create_dir(&base.join(d), confirm)?;
    }

    safe_write_file(
        &base.join("config").join(".env"),
        "# environment variables go here\n",
        confirm,
    )?;
    safe_write_file(&base.join("tox.ini"), &templates.tox_ini(), confirm)?;
    safe_write_file(&base.join("requirements.txt"), &templates.requirements(), confirm)?;

    let build_sh = base.join("build.sh");
    safe_write_file(&build_sh, &templates.build_sh(), confirm)?;
    make_executable(&build_sh)?;

    let manifest = MoManifest::new(model);
    safe_write_file(&base.join(MANIFEST_FILE), &manifest.to_yaml()?, confirm)?;

    let shown = base.canonicalize().unwrap_or_else(|_| base.clone());
    eprintln!("Initialized model '{}' in {}.", model, shown.display());
    tracing::info!(model = %model, dir = %shown.display(), "project initialized");
    Ok(base)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = std::fs::metadata(path)
        .with_context(|| format!("Failed to stat {}", path.display()))?
        .permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms)
        .with_context(|| format!("Failed to chmod {}", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
