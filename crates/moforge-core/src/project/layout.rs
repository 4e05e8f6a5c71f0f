//! Task folders on disk: `3_name` (serial) and `3a_name` (parallel member).
//!
//! Folders that do not match the naming scheme are ignored, so `wrappers/`,
//! `config/`, `tests/` and friends never interfere.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::plan::TaskPlan;
use super::position::Position;
use crate::error::{Error, Result};

fn folder_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)([a-z]*)_(.+)$").expect("static regex"))
}

/// Split a folder name into its position and task suffix.
pub fn parse_folder_name(name: &str) -> Option<(Position, &str)> {
    let caps = folder_pattern().captures(name)?;
    let group: u32 = caps.get(1)?.as_str().parse().ok()?;
    if group == 0 {
        return None;
    }
    let letters = caps.get(2)?.as_str();
    let suffix = caps.get(3)?.as_str();
    let pos = if letters.is_empty() {
        Position::serial(group)
    } else {
        Position::parallel(group, letters)
    };
    Some((pos, suffix))
}

/// Map every task-shaped folder under `base_dir` to its position.
pub fn scan(base_dir: &Path) -> Result<BTreeMap<Position, String>> {
    let mut found: BTreeMap<Position, String> = BTreeMap::new();
    let mut names: Vec<String> = fs::read_dir(base_dir)?
        .flatten()
        .filter(|e| e.path().is_dir())
        .filter_map(|e| e.file_name().to_str().map(String::from))
        .collect();
    names.sort();
    for name in names {
        let Some((pos, _)) = parse_folder_name(&name) else {
            continue;
        };
        if let Some(first) = found.get(&pos) {
            return Err(Error::AmbiguousFolder {
                position: pos.to_string(),
                first: first.clone(),
                second: name,
            });
        }
        found.insert(pos, name);
    }
    Ok(found)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTask {
    pub position: String,
    pub name: String,
    pub folder: String,
}

/// One group of the validated plan, linked to its neighbours by group number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedGroup {
    pub group: u32,
    pub prev: Option<u32>,
    pub next: Option<u32>,
    pub parallel: bool,
    pub tasks: Vec<ResolvedTask>,
}

/// Validate `plan` against the folders under `base_dir`.
///
/// Every task needs a folder at its position; a folder whose suffix differs
/// from the task name is accepted with a warning.
pub fn resolve(base_dir: &Path, plan: &TaskPlan) -> Result<Vec<ResolvedGroup>> {
    let folders = scan(base_dir)?;
    let group_numbers: Vec<u32> = plan.groups().map(|(g, _)| g).collect();
    let placements = plan.placements();
    let mut groups: Vec<ResolvedGroup> = Vec::with_capacity(group_numbers.len());

    for (i, (g, group)) in plan.groups().enumerate() {
        let mut tasks = Vec::new();
        for (pos, task) in placements.iter().filter(|(p, _)| p.group == g) {
            let folder = folders.get(pos).ok_or_else(|| Error::MissingFolder {
                position: pos.to_string(),
                name: task.name.clone(),
            })?;
            if parse_folder_name(folder).map(|(_, s)| s) != Some(task.name.as_str()) {
                tracing::warn!(
                    position = %pos,
                    task = %task.name,
                    folder = %folder,
                    "task folder name does not match Mo.yaml"
                );
            }
            tasks.push(ResolvedTask {
                position: pos.to_string(),
                name: task.name.clone(),
                folder: folder.clone(),
            });
        }
        groups.push(ResolvedGroup {
            group: g,
            prev: i.checked_sub(1).map(|j| group_numbers[j]),
            next: group_numbers.get(i + 1).copied(),
            parallel: group.is_parallel(),
            tasks,
        });
    }

    let gaps = plan.gaps();
    if !gaps.is_empty() {
        tracing::warn!(?gaps, "task groups are not numbered contiguously");
    }
    Ok(groups)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub from: String,
    pub to: String,
}

/// A task that entered the plan and needs a scaffolded folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Creation {
    pub position: Position,
    pub name: String,
    pub folder: String,
}

/// Folder operations that bring the disk in line with an edited plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutChanges {
    /// Folders of tasks that left the plan.
    pub removals: Vec<String>,
    /// Folders of tasks whose position changed.
    pub renames: Vec<Rename>,
    pub creations: Vec<Creation>,
}

impl LayoutChanges {
    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.renames.is_empty() && self.creations.is_empty()
    }
}

/// Diff the folders of the loaded plan (`known`: origin → folder) against the
/// edited plan. Renames keep the folder's own suffix and only swap the prefix.
pub fn plan_changes(known: &BTreeMap<Position, String>, after: &TaskPlan) -> Result<LayoutChanges> {
    let mut changes = LayoutChanges::default();
    let mut kept: BTreeSet<&Position> = BTreeSet::new();

    for (pos, task) in after.placements() {
        match &task.origin {
            Some(origin) => {
                let old = known.get(origin).ok_or_else(|| Error::MissingFolder {
                    position: origin.to_string(),
                    name: task.name.clone(),
                })?;
                kept.insert(origin);
                let suffix = parse_folder_name(old)
                    .map(|(_, s)| s)
                    .unwrap_or(task.name.as_str());
                let new = pos.folder_name(suffix);
                if &new != old {
                    changes.renames.push(Rename {
                        from: old.clone(),
                        to: new,
                    });
                }
            }
            None => {
                changes.creations.push(Creation {
                    folder: pos.folder_name(&task.name),
                    name: task.name.clone(),
                    position: pos,
                });
            }
        }
    }

    for (origin, folder) in known {
        if !kept.contains(origin) {
            changes.removals.push(folder.clone());
        }
    }
    Ok(changes)
}

/// Origin → folder map for every task of a freshly loaded plan.
pub fn known_folders(groups: &[ResolvedGroup]) -> Result<BTreeMap<Position, String>> {
    let mut out = BTreeMap::new();
    for task in groups.iter().flat_map(|g| &g.tasks) {
        out.insert(task.position.parse::<Position>()?, task.folder.clone());
    }
    Ok(out)
}
