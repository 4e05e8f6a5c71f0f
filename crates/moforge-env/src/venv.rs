//! Interpreter lookup and venv creation.

use std::path::{Path, PathBuf};

use moforge_core::config::ToolchainConfig;

use crate::error::EnvError;
use crate::runner::{steps, CommandRunner, ToolCommand};

/// Paths inside a virtual environment (POSIX `bin/` or Windows `Scripts/`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenvLayout {
    root: PathBuf,
}

impl VenvLayout {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn posix_python(&self) -> PathBuf {
        self.root.join("bin").join("python")
    }

    fn windows_python(&self) -> PathBuf {
        self.root.join("Scripts").join("python.exe")
    }

    /// Directory holding the venv's executables. An existing layout wins over
    /// the platform default.
    pub fn bin_dir(&self) -> PathBuf {
        if self.posix_python().exists() {
            self.root.join("bin")
        } else if self.windows_python().exists() || cfg!(windows) {
            self.root.join("Scripts")
        } else {
            self.root.join("bin")
        }
    }

    pub fn python(&self) -> PathBuf {
        if self.posix_python().exists() {
            self.posix_python()
        } else if self.windows_python().exists() || cfg!(windows) {
            self.windows_python()
        } else {
            self.posix_python()
        }
    }

    /// A venv exists when its interpreter does.
    pub fn exists(&self) -> bool {
        self.posix_python().exists() || self.windows_python().exists()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VenvStatus {
    Created,
    Existing,
}

/// Resolve the base interpreter: `MOFORGE_PYTHON`, then python3, then python.
pub fn find_python(config: &ToolchainConfig) -> Result<PathBuf, EnvError> {
    if let Some(ref p) = config.python {
        if p.is_file() {
            return Ok(p.clone());
        }
        return which::which(p).map_err(|_| EnvError::PythonOverrideNotFound(p.clone()));
    }
    for name in ["python3", "python"] {
        if let Ok(path) = which::which(name) {
            tracing::debug!(python = %path.display(), "found interpreter");
            return Ok(path);
        }
    }
    Err(EnvError::PythonNotFound)
}

/// Create a venv at `path` unless one already exists there.
pub fn ensure_venv(
    runner: &dyn CommandRunner,
    python: &Path,
    path: &Path,
) -> Result<VenvStatus, EnvError> {
    let layout = VenvLayout::new(path);
    if layout.exists() {
        tracing::info!(venv = %path.display(), "using existing virtual environment");
        return Ok(VenvStatus::Existing);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    eprintln!("Creating virtual environment at {}...", path.display());
    runner.run(
        &ToolCommand::new(steps::CREATE_VENV, python)
            .args(["-m", "venv"])
            .arg(path),
    )?;
    if !layout.exists() {
        return Err(EnvError::MissingArtifact {
            step: steps::CREATE_VENV.to_string(),
            path: layout.python(),
        });
    }
    Ok(VenvStatus::Created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::fake::FakeRunner;

    #[test]
    fn test_ensure_venv_creates_once() {
        let tmp = tempfile::tempdir().unwrap();
        let venv = tmp.path().join("nested").join(".venv");
        let runner = FakeRunner::default();

        let first = ensure_venv(&runner, Path::new("python3"), &venv).unwrap();
        assert_eq!(first, VenvStatus::Created);
        assert!(VenvLayout::new(&venv).exists());

        let second = ensure_venv(&runner, Path::new("python3"), &venv).unwrap();
        assert_eq!(second, VenvStatus::Existing);
        assert_eq!(runner.steps(), [steps::CREATE_VENV]);
        let args = runner.calls()[0].args_lossy();
        assert_eq!(&args[..2], ["-m", "venv"]);
    }

    #[test]
    fn test_ensure_venv_propagates_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = FakeRunner::failing_at(steps::CREATE_VENV);
        let err = ensure_venv(&runner, Path::new("python3"), &tmp.path().join("v")).unwrap_err();
        assert!(matches!(err, EnvError::CommandFailed { ref step, .. } if step == steps::CREATE_VENV));
    }

    #[test]
    fn test_layout_prefers_existing_interpreter() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = VenvLayout::new(tmp.path());
        assert!(!layout.exists());
        std::fs::create_dir_all(tmp.path().join("Scripts")).unwrap();
        std::fs::write(tmp.path().join("Scripts").join("python.exe"), "").unwrap();
        assert!(layout.exists());
        assert_eq!(layout.bin_dir(), tmp.path().join("Scripts"));
    }

    #[test]
    fn test_find_python_override_missing() {
        let cfg = ToolchainConfig {
            python: Some(PathBuf::from("/nonexistent/moforge/python9")),
            ..ToolchainConfig::default()
        };
        assert!(matches!(
            find_python(&cfg),
            Err(EnvError::PythonOverrideNotFound(_))
        ));
    }
}
