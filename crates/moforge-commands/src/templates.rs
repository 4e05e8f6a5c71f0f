//! Scaffolding templates. Each can be overridden by a file of the same name
//! in `MOFORGE_TEMPLATES_DIR`.

use std::fs;
use std::io;
use std::path::PathBuf;

use moforge_core::config::PathsConfig;

pub const REQUIREMENTS: &str = "requirements.txt";
pub const WRAPPER: &str = "wrapper_template.py";
pub const TASK: &str = "task_template.py";
pub const BUILD_SH: &str = "build.sh";
pub const TOX_INI: &str = "tox.ini";

const DEFAULT_REQUIREMENTS: &str = "pyinstaller\n";

const DEFAULT_WRAPPER: &str = r#""""
Wrapper for task: {task_name}
"""
import sys
from {task_module} import main

def wrapper():
    # (Optional: add command-line argument parsing)
    main()

if __name__ == '__main__':
    wrapper()
"#;

const DEFAULT_TASK: &str = r#""""
Skeleton for task: {task_name}
"""

def main():
    print("Running task {task_name}...")

if __name__ == '__main__':
    main()
"#;

const DEFAULT_BUILD_SH: &str = r#"#!/usr/bin/env bash
set -euo pipefail

if [ "$#" -ne 1 ]; then
    echo "Usage: $0 <path_to_venv>"
    exit 1
fi

# Creates the venv if missing, runs the build steps from Mo.yaml inside it.
exec mo bootstrap "$1"
"#;

const DEFAULT_TOX_INI: &str = "\
[tox]
envlist = py312

[testenv]
basepython = python3.12
deps =
    uv
commands =
    uv
";

/// Per-task requirements defer to the project-wide file.
pub const TASK_REQUIREMENTS: &str = "-r ../requirements.txt";

#[derive(Debug, Clone, Default)]
pub struct Templates {
    dir: Option<PathBuf>,
}

impl Templates {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    pub fn from_config(cfg: &PathsConfig) -> Self {
        Self::new(cfg.templates_dir.clone())
    }

    fn load(&self, file: &str, default: &str) -> String {
        let Some(ref dir) = self.dir else {
            return default.to_string();
        };
        let path = dir.join(file);
        match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => default.to_string(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable template; using built-in");
                default.to_string()
            }
        }
    }

    pub fn requirements(&self) -> String {
        self.load(REQUIREMENTS, DEFAULT_REQUIREMENTS)
    }

    /// The task module is assumed to share the task's name.
    pub fn wrapper(&self, task_name: &str) -> String {
        self.load(WRAPPER, DEFAULT_WRAPPER)
            .replace("{task_name}", task_name)
            .replace("{task_module}", task_name)
    }

    pub fn task(&self, task_name: &str) -> String {
        self.load(TASK, DEFAULT_TASK).replace("{task_name}", task_name)
    }

    pub fn build_sh(&self) -> String {
        self.load(BUILD_SH, DEFAULT_BUILD_SH)
    }

    pub fn tox_ini(&self) -> String {
        self.load(TOX_INI, DEFAULT_TOX_INI)
    }
}
