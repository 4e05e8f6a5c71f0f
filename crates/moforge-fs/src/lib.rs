//! Safe file operations for project scaffolding and task reshuffling.
//!
//! Nothing here overwrites or deletes user data without first copying it to a
//! backup directory under the system temp dir.

pub mod backup;
pub mod confirm;
pub mod rename;
pub mod safe_write;

pub use backup::{backup_path, remove_dir_with_backup};
pub use confirm::StdinConfirm;
pub use rename::rename_path;
pub use safe_write::{safe_create_dir, safe_write_file, DirOutcome, WriteOutcome};
