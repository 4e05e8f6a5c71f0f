use std::path::PathBuf;

use thiserror::Error;

/// Failures of the external Python toolchain.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("python3 or python not found in PATH (set MOFORGE_PYTHON to choose an interpreter)")]
    PythonNotFound,

    #[error("Interpreter '{0}' from MOFORGE_PYTHON not found")]
    PythonOverrideNotFound(PathBuf),

    #[error("{step} failed ({status}): {stderr}")]
    CommandFailed {
        step: String,
        status: String,
        stderr: String,
    },

    #[error("Failed to start {program} for {step}: {source}")]
    Spawn {
        step: String,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{what} not found: {path}")]
    MissingInput { what: &'static str, path: PathBuf },

    #[error("{step} reported success but {path} does not exist")]
    MissingArtifact { step: String, path: PathBuf },

    #[error("Cannot put {path} on {var}: {source}")]
    JoinPaths {
        var: &'static str,
        path: PathBuf,
        #[source]
        source: std::env::JoinPathsError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
