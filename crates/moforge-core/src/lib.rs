//! moforge core: configuration, tracing setup and the `Mo.yaml` task model.
//!
//! Everything here is free of external tool invocations; `moforge-env` owns
//! venv and packaging, `moforge-fs` owns confirm/backup/rename on disk.

pub mod config;
pub mod error;
pub mod observability;
pub mod project;

pub use error::{Error, Result};
