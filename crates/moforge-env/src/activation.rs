//! Venv activation as data.
//!
//! `source bin/activate` mutates the shell; here the same variables are
//! collected once and attached to every child command. Deactivation is
//! dropping the value.

use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::error::EnvError;
use crate::venv::VenvLayout;

#[derive(Debug, Clone, Default)]
pub struct Activation {
    vars: Vec<(String, OsString)>,
    removed: Vec<String>,
}

impl Activation {
    /// `VIRTUAL_ENV=<root>`, venv bin dir first on `PATH`, `PYTHONHOME` unset.
    pub fn for_venv(layout: &VenvLayout) -> Result<Self, EnvError> {
        let path = prepend_path("PATH", &layout.bin_dir(), env::var_os("PATH"))?;
        Ok(Self {
            vars: vec![
                (
                    "VIRTUAL_ENV".to_string(),
                    layout.root().as_os_str().to_os_string(),
                ),
                ("PATH".to_string(), path),
            ],
            removed: vec!["PYTHONHOME".to_string()],
        })
    }

    /// Prepend `dir` to `PYTHONPATH` (this activation's value, else the
    /// inherited one).
    pub fn with_python_path_prefix(mut self, dir: &Path) -> Result<Self, EnvError> {
        let current = self
            .var("PYTHONPATH")
            .map(OsStr::to_os_string)
            .or_else(|| env::var_os("PYTHONPATH"));
        let value = prepend_path("PYTHONPATH", dir, current)?;
        self.vars.retain(|(k, _)| k != "PYTHONPATH");
        self.vars.push(("PYTHONPATH".to_string(), value));
        Ok(self)
    }

    pub fn var(&self, key: &str) -> Option<&OsStr> {
        self.vars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_os_str())
    }

    pub fn vars(&self) -> &[(String, OsString)] {
        &self.vars
    }

    pub fn removed(&self) -> &[String] {
        &self.removed
    }
}

fn prepend_path(
    var: &'static str,
    dir: &Path,
    current: Option<OsString>,
) -> Result<OsString, EnvError> {
    let mut parts: Vec<PathBuf> = vec![dir.to_path_buf()];
    if let Some(cur) = current.filter(|c| !c.is_empty()) {
        parts.extend(env::split_paths(&cur));
    }
    env::join_paths(parts).map_err(|source| EnvError::JoinPaths {
        var,
        path: dir.to_path_buf(),
        source,
    })
}
