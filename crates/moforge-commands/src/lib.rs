//! CLI commands for moforge.
//!
//! Commands depend on the core model, the safe fs layer and the env layer;
//! the binary only parses arguments and dispatches here.
//!
//!   init: scaffold a model project
//!   task: add / delete / move tasks, keeping Mo.yaml and folders in sync
//!   validate: check Mo.yaml against the task folders
//!   build: venv bootstrap and single-file packaging

pub mod build;
pub mod init;
pub mod task;
pub mod templates;
pub mod validate;
