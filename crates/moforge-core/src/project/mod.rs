//! Model task project: `Mo.yaml` manifest, the ordered task plan and the
//! numbered task folders that mirror it on disk.
//!
//! Flow for every mutating command:
//!   1. `manifest::load` → `TaskPlan` (each task remembers its `origin`)
//!   2. `layout::resolve` validates folders against the plan
//!   3. `TaskPlan::{insert, remove, move_task}` edits the plan in memory
//!   4. `layout::plan_changes` diffs old folders against the new plan
//!   5. the caller applies the changes and saves the manifest

pub mod confirm;
pub mod layout;
pub mod manifest;
pub mod plan;
pub mod position;

pub use confirm::{AssumeYes, Confirm, FixedAnswer};
pub use layout::{Creation, LayoutChanges, Rename, ResolvedGroup, ResolvedTask};
pub use manifest::{BuildSection, MoManifest, MANIFEST_FILE};
pub use plan::{validate_task_name, Group, Task, TaskPlan};
pub use position::Position;
