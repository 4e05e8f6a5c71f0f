//! Python build environments: venv bootstrap and disposable packaging.
//!
//! External tools are reached only through [`runner::CommandRunner`];
//! activation is an explicit set of variables handed to child processes, so
//! the calling process environment never changes.
//!
//! - `venv`: interpreter lookup, venv layout, idempotent creation
//! - `activation`: VIRTUAL_ENV / PATH / PYTHONPATH for child processes
//! - `bootstrap`: ensure venv → activate → build steps → deactivate
//! - `sideload`: private package-manager install + requirements install
//! - `package`: scratch dirs → venv → sideload → install → packager

pub mod activation;
pub mod bootstrap;
pub mod error;
pub mod package;
pub mod runner;
pub mod sideload;
pub mod venv;

pub use activation::Activation;
pub use bootstrap::{bootstrap, BootstrapReport};
pub use error::EnvError;
pub use package::{package, PackageOutcome, PackageRequest, Scratch};
pub use runner::{CommandRunner, SystemRunner, ToolCommand, ToolOutput};
pub use venv::{ensure_venv, find_python, VenvLayout, VenvStatus};
