//! Disposable build-and-package flow.
//!
//! Every temporary directory is owned by a [`Scratch`] guard, so the venv,
//! the sideloaded tool and the packager workspace are removed on every exit
//! path: success, a failed tool, or an early `?`.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::activation::Activation;
use crate::error::EnvError;
use crate::runner::{steps, CommandRunner, ToolCommand};
use crate::sideload::{install_requirements, needs_sideload, sideload_tool};
use crate::venv::{ensure_venv, VenvLayout};

#[derive(Debug, Clone)]
pub struct PackageRequest {
    /// Working directory; relative paths below resolve against it.
    pub workdir: PathBuf,
    pub entry: PathBuf,
    pub requirements: PathBuf,
    pub dist_dir: PathBuf,
    pub sideload_tool: String,
    /// Packager module run as `python -m <packager>`.
    pub packager: String,
}

impl PackageRequest {
    fn resolve(&self, p: &Path) -> PathBuf {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.workdir.join(p)
        }
    }
}

#[derive(Debug, Clone)]
pub struct PackageOutcome {
    pub executable: PathBuf,
    /// Scratch directories used by the run; all removed by the time this is returned.
    pub scratch_paths: Vec<PathBuf>,
}

/// Owner of the run's temporary directories.
pub struct Scratch {
    venv: TempDir,
    tool: TempDir,
    work: TempDir,
}

impl Scratch {
    pub fn new() -> Result<Self, EnvError> {
        Ok(Self {
            venv: tempfile::Builder::new().prefix("moforge-venv-").tempdir()?,
            tool: tempfile::Builder::new().prefix("moforge-tool-").tempdir()?,
            work: tempfile::Builder::new().prefix("moforge-work-").tempdir()?,
        })
    }

    pub fn venv_dir(&self) -> &Path {
        self.venv.path()
    }

    pub fn tool_dir(&self) -> &Path {
        self.tool.path()
    }

    pub fn work_dir(&self) -> &Path {
        self.work.path()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        vec![
            self.venv_dir().to_path_buf(),
            self.tool_dir().to_path_buf(),
            self.work_dir().to_path_buf(),
        ]
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        // The TempDir fields remove themselves right after this.
        tracing::debug!(dirs = ?self.paths(), "removing scratch directories");
    }
}

/// Package `request.entry` into `dist/<entry stem>`.
///
/// Inputs are checked before any temporary directory is created.
pub fn package(
    runner: &dyn CommandRunner,
    python: &Path,
    request: &PackageRequest,
) -> Result<PackageOutcome, EnvError> {
    let entry = request.resolve(&request.entry);
    let requirements = request.resolve(&request.requirements);
    let dist_dir = request.resolve(&request.dist_dir);
    if !entry.is_file() {
        return Err(EnvError::MissingInput {
            what: "Entry-point script",
            path: entry,
        });
    }
    if !requirements.is_file() {
        return Err(EnvError::MissingInput {
            what: "Requirements file",
            path: requirements,
        });
    }
    let stem = entry
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| EnvError::MissingInput {
            what: "Entry-point file name",
            path: entry.clone(),
        })?;

    let scratch = Scratch::new()?;
    let scratch_paths = scratch.paths();
    tracing::info!(scratch = ?scratch_paths, entry = %entry.display(), "packaging started");

    ensure_venv(runner, python, scratch.venv_dir())?;
    let layout = VenvLayout::new(scratch.venv_dir());
    let venv_python = layout.python();
    let mut activation = Activation::for_venv(&layout)?;

    if needs_sideload(&request.sideload_tool) {
        sideload_tool(
            runner,
            &venv_python,
            &request.sideload_tool,
            scratch.tool_dir(),
            &activation,
        )?;
        activation = activation.with_python_path_prefix(scratch.tool_dir())?;
    }
    install_requirements(
        runner,
        &venv_python,
        &request.sideload_tool,
        &requirements,
        &activation,
    )?;

    runner.run(
        &ToolCommand::new(steps::PACKAGE, &venv_python)
            .args(["-m", request.packager.as_str(), "--noconfirm", "--onefile", "--name"])
            .arg(&stem)
            .arg("--distpath")
            .arg(&dist_dir)
            .arg("--workpath")
            .arg(scratch.work_dir().join("build"))
            .arg("--specpath")
            .arg(scratch.work_dir())
            .arg(&entry)
            .cwd(&request.workdir)
            .activation(&activation),
    )?;

    let executable = dist_dir.join(format!("{}{}", stem, std::env::consts::EXE_SUFFIX));
    if !executable.is_file() {
        return Err(EnvError::MissingArtifact {
            step: steps::PACKAGE.to_string(),
            path: executable,
        });
    }

    drop(activation);
    drop(scratch);
    tracing::info!(executable = %executable.display(), "packaging finished");
    Ok(PackageOutcome {
        executable,
        scratch_paths,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::fake::FakeRunner;
    use std::fs;

    fn project() -> (tempfile::TempDir, PackageRequest) {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("task1.py"), "print('hi')\n").unwrap();
        fs::write(tmp.path().join("requirements.txt"), "pyinstaller\n").unwrap();
        let request = PackageRequest {
            workdir: tmp.path().to_path_buf(),
            entry: PathBuf::from("task1.py"),
            requirements: PathBuf::from("requirements.txt"),
            dist_dir: PathBuf::from("dist"),
            sideload_tool: "uv".to_string(),
            packager: "PyInstaller".to_string(),
        };
        (tmp, request)
    }

    fn scratch_from_calls(runner: &FakeRunner) -> Vec<PathBuf> {
        let calls = runner.calls();
        let mut dirs = Vec::new();
        if let Some(c) = calls.iter().find(|c| c.step == steps::CREATE_VENV) {
            dirs.push(PathBuf::from(c.args_lossy().last().unwrap()));
        }
        if let Some(c) = calls.iter().find(|c| c.step == steps::SIDELOAD) {
            let args = c.args_lossy();
            dirs.push(PathBuf::from(&args[args.len() - 2]));
        }
        dirs
    }

    #[test]
    fn test_happy_path_produces_executable_and_cleans_up() {
        let (tmp, request) = project();
        let runner = FakeRunner::default();

        let outcome = package(&runner, Path::new("python3"), &request).unwrap();

        let expected = tmp
            .path()
            .join("dist")
            .join(format!("task1{}", std::env::consts::EXE_SUFFIX));
        assert_eq!(outcome.executable, expected);
        assert!(expected.is_file());
        assert_eq!(outcome.scratch_paths.len(), 3);
        for p in &outcome.scratch_paths {
            assert!(!p.exists(), "scratch dir leaked: {}", p.display());
        }
        assert_eq!(
            runner.steps(),
            [
                steps::CREATE_VENV,
                steps::SIDELOAD,
                steps::INSTALL_REQUIREMENTS,
                steps::PACKAGE
            ]
        );
    }

    #[test]
    fn test_install_sees_sideloaded_tool_on_pythonpath() {
        let (_tmp, request) = project();
        let runner = FakeRunner::default();
        package(&runner, Path::new("python3"), &request).unwrap();

        let calls = runner.calls();
        let tool_dir = scratch_from_calls(&runner).pop().unwrap();
        let install = calls
            .iter()
            .find(|c| c.step == steps::INSTALL_REQUIREMENTS)
            .unwrap();
        let first = std::env::split_paths(install.env_var("PYTHONPATH").unwrap())
            .next()
            .unwrap();
        assert_eq!(first, tool_dir);
        assert!(calls[0].env_var("PYTHONPATH").is_none());
    }

    #[test]
    fn test_packager_arguments() {
        let (tmp, request) = project();
        let runner = FakeRunner::default();
        package(&runner, Path::new("python3"), &request).unwrap();

        let pkg = runner
            .calls()
            .into_iter()
            .find(|c| c.step == steps::PACKAGE)
            .unwrap();
        let args = pkg.args_lossy();
        assert_eq!(&args[..5], ["-m", "PyInstaller", "--noconfirm", "--onefile", "--name"]);
        assert_eq!(args[5], "task1");
        assert_eq!(args.last().unwrap(), &tmp.path().join("task1.py").to_string_lossy());
        assert_eq!(pkg.cwd.as_deref(), Some(tmp.path()));
    }

    #[test]
    fn test_failure_at_any_step_still_removes_scratch() {
        for step in [
            steps::CREATE_VENV,
            steps::SIDELOAD,
            steps::INSTALL_REQUIREMENTS,
            steps::PACKAGE,
        ] {
            let (tmp, request) = project();
            let runner = FakeRunner::failing_at(step);
            let err = package(&runner, Path::new("python3"), &request).unwrap_err();
            assert!(
                matches!(err, EnvError::CommandFailed { step: ref s, .. } if s == step),
                "unexpected error for {step}: {err}"
            );
            for dir in scratch_from_calls(&runner) {
                assert!(!dir.exists(), "{step}: scratch dir leaked: {}", dir.display());
            }
            assert!(!tmp.path().join("dist").join("task1").exists());
        }
    }

    #[test]
    fn test_missing_requirements_fails_before_any_tool_runs() {
        let (tmp, request) = project();
        fs::remove_file(tmp.path().join("requirements.txt")).unwrap();
        let runner = FakeRunner::default();
        let err = package(&runner, Path::new("python3"), &request).unwrap_err();
        assert!(matches!(err, EnvError::MissingInput { what: "Requirements file", .. }));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_missing_artifact_is_an_error() {
        let (_tmp, request) = project();
        let runner = FakeRunner {
            skip_artifact: true,
            ..FakeRunner::default()
        };
        let err = package(&runner, Path::new("python3"), &request).unwrap_err();
        assert!(matches!(err, EnvError::MissingArtifact { .. }));
        for dir in scratch_from_calls(&runner) {
            assert!(!dir.exists());
        }
    }

    #[test]
    fn test_pip_tool_skips_sideload() {
        let (_tmp, mut request) = project();
        request.sideload_tool = "pip".to_string();
        let runner = FakeRunner::default();
        package(&runner, Path::new("python3"), &request).unwrap();
        assert!(!runner.steps().iter().any(|s| s == steps::SIDELOAD));
    }
}
