//! `mo bootstrap` and `mo package`: hand the Mo.yaml build section and the
//! toolchain config to the environment builder.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use moforge_core::config::ToolchainConfig;
use moforge_core::project::{BuildSection, MoManifest};
use moforge_env::{
    bootstrap, find_python, package, BootstrapReport, CommandRunner, PackageOutcome,
    PackageRequest, VenvStatus,
};

/// Flags of `mo package`; each one overrides the Mo.yaml `build:` section.
#[derive(Debug, Clone, Default)]
pub struct PackageOptions {
    pub entry: Option<PathBuf>,
    pub requirements: Option<PathBuf>,
    pub dist: Option<PathBuf>,
}

/// `build:` section of the project manifest, if there is one.
fn build_section(project_dir: &Path) -> Result<BuildSection> {
    if !MoManifest::exists(project_dir) {
        return Ok(BuildSection::default());
    }
    let manifest = MoManifest::load(project_dir)?;
    Ok(manifest.build.unwrap_or_default())
}

/// `mo bootstrap <VENV_PATH>`
pub fn cmd_bootstrap(
    runner: &dyn CommandRunner,
    toolchain: &ToolchainConfig,
    project_dir: &Path,
    venv: &Path,
) -> Result<BootstrapReport> {
    let build = build_section(project_dir)?;
    let python = find_python(toolchain)?;
    let venv = if venv.is_absolute() {
        venv.to_path_buf()
    } else {
        project_dir.join(venv)
    };

    let report = bootstrap(runner, &python, &venv, &build.steps)
        .with_context(|| format!("Bootstrap of {} failed", venv.display()))?;
    match report.status {
        VenvStatus::Created => eprintln!("Created virtual environment at {}.", venv.display()),
        VenvStatus::Existing => eprintln!("Reused virtual environment at {}.", venv.display()),
    }
    Ok(report)
}

/// Merge flags, the `build:` section and defaults into a package request.
pub fn resolve_request(
    toolchain: &ToolchainConfig,
    project_dir: &Path,
    build: &BuildSection,
    opts: &PackageOptions,
) -> Result<PackageRequest> {
    let entry = opts
        .entry
        .clone()
        .or_else(|| build.entry.as_ref().map(PathBuf::from))
        .context("No entry point: pass --entry or set build.entry in Mo.yaml")?;
    let requirements = opts
        .requirements
        .clone()
        .or_else(|| build.requirements.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("requirements.txt"));
    let dist_dir = opts
        .dist
        .clone()
        .or_else(|| build.dist.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("dist"));

    Ok(PackageRequest {
        workdir: project_dir.to_path_buf(),
        entry,
        requirements,
        dist_dir,
        sideload_tool: toolchain.sideload_tool.clone(),
        packager: toolchain.packager.clone(),
    })
}

/// `mo package`
pub fn cmd_package(
    runner: &dyn CommandRunner,
    toolchain: &ToolchainConfig,
    project_dir: &Path,
    opts: &PackageOptions,
) -> Result<PackageOutcome> {
    let build = build_section(project_dir)?;
    let request = resolve_request(toolchain, project_dir, &build, opts)?;
    let python = find_python(toolchain)?;

    let outcome = package(runner, &python, &request).context("Packaging failed")?;
    eprintln!("Built {}.", outcome.executable.display());
    Ok(outcome)
}
