//! Environment bootstrap: ensure a venv at a caller-chosen path, activate
//! it, run the build steps, deactivate.

use std::path::{Path, PathBuf};

use crate::activation::Activation;
use crate::error::EnvError;
use crate::runner::{CommandRunner, ToolCommand};
use crate::venv::{ensure_venv, VenvLayout, VenvStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    pub venv: PathBuf,
    pub status: VenvStatus,
    pub steps_run: usize,
}

/// Each step is a whitespace-separated command line. Programs that exist in
/// the venv's bin dir are run from there; others are looked up on PATH.
pub fn bootstrap(
    runner: &dyn CommandRunner,
    python: &Path,
    venv_path: &Path,
    steps: &[String],
) -> Result<BootstrapReport, EnvError> {
    let status = ensure_venv(runner, python, venv_path)?;
    let layout = VenvLayout::new(venv_path);
    let activation = Activation::for_venv(&layout)?;

    eprintln!("Building the project...");
    let mut steps_run = 0;
    for (i, line) in steps.iter().enumerate() {
        let mut parts = line.split_whitespace();
        let Some(program) = parts.next() else {
            continue;
        };
        let in_venv = layout.bin_dir().join(program);
        let program = if in_venv.is_file() {
            in_venv
        } else {
            PathBuf::from(program)
        };
        runner.run(
            &ToolCommand::new(format!("build step {} ({})", i + 1, line.trim()), program)
                .args(parts)
                .activation(&activation),
        )?;
        steps_run += 1;
    }
    drop(activation);
    tracing::info!(venv = %venv_path.display(), steps_run, "bootstrap finished");

    Ok(BootstrapReport {
        venv: venv_path.to_path_buf(),
        status,
        steps_run,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::fake::FakeRunner;
    use crate::runner::steps;

    #[test]
    fn test_bootstrap_creates_then_reuses() {
        let tmp = tempfile::tempdir().unwrap();
        let venv = tmp.path().join("venv");
        let runner = FakeRunner::default();

        let report = bootstrap(&runner, Path::new("python3"), &venv, &[]).unwrap();
        assert_eq!(report.status, VenvStatus::Created);
        assert_eq!(report.steps_run, 0);

        let report = bootstrap(&runner, Path::new("python3"), &venv, &[]).unwrap();
        assert_eq!(report.status, VenvStatus::Existing);
        assert_eq!(runner.steps(), [steps::CREATE_VENV]);
    }

    #[test]
    fn test_build_steps_run_inside_activation() {
        let tmp = tempfile::tempdir().unwrap();
        let venv = tmp.path().join("venv");
        let runner = FakeRunner::default();
        let steps = vec![
            "python -m pip install -r requirements.txt".to_string(),
            "   ".to_string(),
            "pytest -q".to_string(),
        ];

        let report = bootstrap(&runner, Path::new("python3"), &venv, &steps).unwrap();
        assert_eq!(report.steps_run, 2);

        let calls = runner.calls();
        assert_eq!(calls.len(), 3);
        // The venv creation runs before any build step.
        assert_eq!(calls[0].step, steps::CREATE_VENV);
        let first = &calls[1];
        assert_eq!(first.program, VenvLayout::new(&venv).python());
        assert_eq!(first.args_lossy(), ["-m", "pip", "install", "-r", "requirements.txt"]);
        assert_eq!(first.env_var("VIRTUAL_ENV"), Some(venv.as_os_str()));
        assert_eq!(calls[2].program, PathBuf::from("pytest"));
    }

    #[test]
    fn test_failing_step_aborts() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = FakeRunner::failing_at("build step 1 (false)");
        let err = bootstrap(
            &runner,
            Path::new("python3"),
            &tmp.path().join("venv"),
            &["false".to_string(), "true".to_string()],
        )
        .unwrap_err();
        assert!(matches!(err, EnvError::CommandFailed { .. }));
        assert_eq!(runner.calls().len(), 2);
    }
}
