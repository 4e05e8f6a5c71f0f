//! CommandRunner trait: the single seam between moforge and external tools.
//!
//! `SystemRunner` spawns real processes; tests substitute a scripted runner
//! that records invocations and simulates tool side effects.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use crate::activation::Activation;
use crate::error::EnvError;

/// Step names used in logs and errors.
pub mod steps {
    pub const CREATE_VENV: &str = "create venv";
    pub const SIDELOAD: &str = "sideload package manager";
    pub const INSTALL_REQUIREMENTS: &str = "install requirements";
    pub const PACKAGE: &str = "package executable";
}

/// Keep only the tail of captured stderr in errors.
const STDERR_TAIL_BYTES: usize = 4000;

/// One external tool invocation.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    pub step: String,
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub cwd: Option<PathBuf>,
    pub env: Vec<(String, OsString)>,
    pub env_remove: Vec<String>,
}

impl ToolCommand {
    pub fn new(step: impl Into<String>, program: impl Into<PathBuf>) -> Self {
        Self {
            step: step.into(),
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
            env_remove: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn cwd(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Run inside an activated environment.
    pub fn activation(mut self, activation: &Activation) -> Self {
        self.env.extend(
            activation
                .vars()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        self.env_remove
            .extend(activation.removed().iter().cloned());
        self
    }

    /// Value of an environment override, if this command sets one.
    pub fn env_var(&self, key: &str) -> Option<&OsStr> {
        self.env
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_os_str())
    }

    /// Arguments as strings, for logs and assertions.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs tool commands to completion, one at a time.
pub trait CommandRunner {
    /// Run `cmd` and block until it exits. A non-zero exit is an error.
    fn run(&self, cmd: &ToolCommand) -> Result<ToolOutput, EnvError>;
}

/// Spawns real processes with `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, cmd: &ToolCommand) -> Result<ToolOutput, EnvError> {
        let args = cmd.args_lossy();
        tracing::info!(
            step = %cmd.step,
            program = %cmd.program.display(),
            args = ?args,
            cwd = ?cmd.cwd,
            "running"
        );

        let mut command = Command::new(&cmd.program);
        command.args(&cmd.args);
        if let Some(ref dir) = cmd.cwd {
            command.current_dir(dir);
        }
        for key in &cmd.env_remove {
            command.env_remove(key);
        }
        for (k, v) in &cmd.env {
            command.env(k, v);
        }

        let started = Instant::now();
        let out = command.output().map_err(|source| EnvError::Spawn {
            step: cmd.step.clone(),
            program: cmd.program.display().to_string(),
            source,
        })?;
        let duration_ms = started.elapsed().as_millis() as u64;
        let stdout = String::from_utf8_lossy(&out.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&out.stderr).into_owned();

        tracing::info!(
            step = %cmd.step,
            exit_code = ?out.status.code(),
            duration_ms,
            "finished"
        );
        if !stdout.trim().is_empty() {
            tracing::debug!(step = %cmd.step, stdout = %stdout.trim_end(), "tool output");
        }

        if !out.status.success() {
            let status = match out.status.code() {
                Some(code) => format!("exit code {}", code),
                None => "terminated by signal".to_string(),
            };
            return Err(EnvError::CommandFailed {
                step: cmd.step.clone(),
                status,
                stderr: tail(stderr.trim(), STDERR_TAIL_BYTES).to_string(),
            });
        }
        Ok(ToolOutput { stdout, stderr })
    }
}

/// Last `max` bytes of `s`, cut on a char boundary.
fn tail(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut start = s.len() - max;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}

#[cfg(test)]
pub(crate) mod fake {
    //! Scripted runner: records every command and simulates what the real
    //! tools leave behind (a venv interpreter, a packaged executable).

    use super::*;
    use std::fs;
    use std::sync::Mutex;

    #[derive(Default)]
    pub(crate) struct FakeRunner {
        pub calls: Mutex<Vec<ToolCommand>>,
        pub fail_step: Option<&'static str>,
        /// Packager "succeeds" without writing the executable.
        pub skip_artifact: bool,
    }

    impl FakeRunner {
        pub fn failing_at(step: &'static str) -> Self {
            Self {
                fail_step: Some(step),
                ..Self::default()
            }
        }

        pub fn steps(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|c| c.step.clone())
                .collect()
        }

        pub fn calls(&self) -> Vec<ToolCommand> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn value_after(args: &[String], flag: &str) -> Option<String> {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1).cloned())
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, cmd: &ToolCommand) -> Result<ToolOutput, EnvError> {
            self.calls.lock().unwrap().push(cmd.clone());
            if self.fail_step == Some(cmd.step.as_str()) {
                return Err(EnvError::CommandFailed {
                    step: cmd.step.clone(),
                    status: "exit code 1".to_string(),
                    stderr: "injected failure".to_string(),
                });
            }
            let args = cmd.args_lossy();
            if cmd.step == steps::CREATE_VENV {
                let root = PathBuf::from(args.last().unwrap());
                let layout = crate::venv::VenvLayout::new(&root);
                fs::create_dir_all(layout.bin_dir()).unwrap();
                fs::write(layout.python(), "").unwrap();
            }
            if cmd.step == steps::PACKAGE && !self.skip_artifact {
                let dist = PathBuf::from(value_after(&args, "--distpath").unwrap());
                let name = value_after(&args, "--name").unwrap();
                fs::create_dir_all(&dist).unwrap();
                fs::write(
                    dist.join(format!("{}{}", name, std::env::consts::EXE_SUFFIX)),
                    "#!fake",
                )
                .unwrap();
            }
            Ok(ToolOutput::default())
        }
    }
}
