//! Package-manager sideload: install the tool into a private target dir and
//! expose it through PYTHONPATH instead of installing it into the venv.

use std::path::Path;

use crate::activation::Activation;
use crate::error::EnvError;
use crate::runner::{steps, CommandRunner, ToolCommand};

/// `pip` needs no sideload: the venv already ships it.
pub fn needs_sideload(tool: &str) -> bool {
    tool != "pip"
}

/// `<venv python> -m pip install --target <target_dir> <tool>`
pub fn sideload_tool(
    runner: &dyn CommandRunner,
    venv_python: &Path,
    tool: &str,
    target_dir: &Path,
    activation: &Activation,
) -> Result<(), EnvError> {
    runner.run(
        &ToolCommand::new(steps::SIDELOAD, venv_python)
            .args(["-m", "pip", "install", "--disable-pip-version-check", "--target"])
            .arg(target_dir)
            .arg(tool)
            .activation(activation),
    )?;
    Ok(())
}

/// Install `requirements` into the venv through `tool`.
pub fn install_requirements(
    runner: &dyn CommandRunner,
    venv_python: &Path,
    tool: &str,
    requirements: &Path,
    activation: &Activation,
) -> Result<(), EnvError> {
    let cmd = ToolCommand::new(steps::INSTALL_REQUIREMENTS, venv_python);
    let cmd = if needs_sideload(tool) {
        let cmd = cmd.args(["-m", tool, "pip", "install"]);
        // uv otherwise targets whatever interpreter it discovers first.
        if tool == "uv" {
            cmd.arg("--python").arg(venv_python)
        } else {
            cmd
        }
    } else {
        cmd.args(["-m", "pip", "install", "--disable-pip-version-check"])
    };
    runner.run(&cmd.arg("-r").arg(requirements).activation(activation))?;
    Ok(())
}
