use std::path::PathBuf;

use thiserror::Error;

/// Domain errors for the task plan, the `Mo.yaml` manifest and folder layout.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Mo.yaml not found in {0} (run `mo init` first)")]
    ManifestNotFound(PathBuf),

    #[error("Failed to parse {path}: {message}")]
    ManifestParse { path: PathBuf, message: String },

    #[error("Invalid position '{0}': expected a group number optionally followed by letters, e.g. '3' or '3a'")]
    InvalidPosition(String),

    #[error("Position cannot be more than {max} (got {got})")]
    PositionOutOfRange { got: u32, max: u32 },

    #[error("No task group found at position {0}")]
    GroupNotFound(u32),

    #[error("No task found at position {0}")]
    TaskNotFound(String),

    #[error("Task {0} already exists")]
    DuplicateTask(String),

    #[error("Group at position {0} is serial; no parallel task to address")]
    NotParallel(u32),

    #[error("Group at position {0} is parallel; specify a letter (e.g. {0}a)")]
    LetterRequired(u32),

    #[error("Folder for task {position} ({name}) not found")]
    MissingFolder { position: String, name: String },

    #[error("Position {position} matches more than one folder: {first}, {second}")]
    AmbiguousFolder {
        position: String,
        first: String,
        second: String,
    },

    #[error("Invalid task name '{0}': must be non-empty, without path separators or whitespace, and not start with '.'")]
    InvalidTaskName(String),

    #[error("{0}")]
    Declined(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
