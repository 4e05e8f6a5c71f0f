//! Ordered task plan: group number → serial task or lettered parallel members.
//!
//! All edits are pure; disk changes are derived afterwards by
//! `layout::plan_changes` from each task's `origin`.

use std::collections::BTreeMap;

use super::confirm::Confirm;
use super::position::Position;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub name: String,
    /// Position the task occupied when the plan was loaded; `None` for new tasks.
    pub origin: Option<Position>,
}

impl Task {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin: None,
        }
    }

    pub fn loaded(name: impl Into<String>, origin: Position) -> Self {
        Self {
            name: name.into(),
            origin: Some(origin),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Group {
    Serial(Task),
    /// Lettered members. A single-member group stays parallel until flattened.
    Parallel(BTreeMap<String, Task>),
}

impl Group {
    pub fn is_parallel(&self) -> bool {
        matches!(self, Group::Parallel(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPlan {
    groups: BTreeMap<u32, Group>,
}

impl TaskPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, group: u32) -> Option<&Group> {
        self.groups.get(&group)
    }

    pub fn groups(&self) -> impl Iterator<Item = (u32, &Group)> {
        self.groups.iter().map(|(k, g)| (*k, g))
    }

    /// Insert a group as loaded from the manifest, without any shifting.
    pub(crate) fn put_group(&mut self, group: u32, value: Group) {
        self.groups.insert(group, value);
    }

    /// Every task with its current position, in plan order.
    pub fn placements(&self) -> Vec<(Position, &Task)> {
        let mut out = Vec::new();
        for (g, group) in &self.groups {
            match group {
                Group::Serial(task) => out.push((Position::serial(*g), task)),
                Group::Parallel(members) => {
                    for (letter, task) in members {
                        out.push((Position::parallel(*g, letter.clone()), task));
                    }
                }
            }
        }
        out
    }

    /// Group numbers missing from the contiguous range `1..=max`.
    pub fn gaps(&self) -> Vec<u32> {
        let max = self.groups.keys().next_back().copied().unwrap_or(0);
        (1..=max).filter(|g| !self.groups.contains_key(g)).collect()
    }

    /// Add a task at `pos`.
    ///
    /// Serial insertion into an occupied group shifts that group and all later
    /// ones up by one. Parallel insertion into a serial group converts it after
    /// confirmation; the existing task takes the first letter from `a` that is
    /// not the requested one.
    pub fn insert(&mut self, pos: &Position, task: Task, confirm: &mut dyn Confirm) -> Result<()> {
        validate_task_name(&task.name)?;
        let max = self.groups.len() as u32 + 1;
        if pos.group > max {
            return Err(Error::PositionOutOfRange {
                got: pos.group,
                max,
            });
        }
        let g = pos.group;

        let Some(letter) = pos.letter.clone() else {
            if self.groups.contains_key(&g) {
                self.open_gap(g);
            }
            self.groups.insert(g, Group::Serial(task));
            return Ok(());
        };

        match self.groups.remove(&g) {
            None => {
                self.groups
                    .insert(g, Group::Parallel(BTreeMap::from([(letter, task)])));
            }
            Some(Group::Parallel(mut members)) => {
                if members.contains_key(&letter) {
                    self.groups.insert(g, Group::Parallel(members));
                    return Err(Error::DuplicateTask(pos.to_string()));
                }
                members.insert(letter, task);
                self.groups.insert(g, Group::Parallel(members));
            }
            Some(Group::Serial(existing)) => {
                let existing_letter = first_free_letter(&letter);
                let question = format!(
                    "Convert serial task at {g} ({}) to parallel as {g}{existing_letter}?",
                    existing.name
                );
                if !confirm.confirm(&question) {
                    self.groups.insert(g, Group::Serial(existing));
                    return Err(Error::Declined(
                        "Cannot add a parallel task without converting the existing serial task"
                            .to_string(),
                    ));
                }
                let members = BTreeMap::from([(existing_letter, existing), (letter, task)]);
                self.groups.insert(g, Group::Parallel(members));
            }
        }
        Ok(())
    }

    /// Remove the task at `pos` and return it.
    ///
    /// Removing a serial group (or the last member of a parallel one) closes
    /// the gap: later groups shift down by one. When a parallel group is left
    /// with a single member, it is flattened back to serial if confirmed.
    pub fn remove(&mut self, pos: &Position, confirm: &mut dyn Confirm) -> Result<Task> {
        let g = pos.group;
        let group = self.groups.remove(&g).ok_or(Error::GroupNotFound(g))?;
        match (group, pos.letter.as_deref()) {
            (Group::Serial(task), None) => {
                self.close_gap(g);
                Ok(task)
            }
            (group @ Group::Serial(_), Some(_)) => {
                self.groups.insert(g, group);
                Err(Error::NotParallel(g))
            }
            (group @ Group::Parallel(_), None) => {
                self.groups.insert(g, group);
                Err(Error::LetterRequired(g))
            }
            (Group::Parallel(mut members), Some(letter)) => {
                let Some(task) = members.remove(letter) else {
                    self.groups.insert(g, Group::Parallel(members));
                    return Err(Error::TaskNotFound(pos.to_string()));
                };
                if members.is_empty() {
                    self.close_gap(g);
                    return Ok(task);
                }
                let remaining = members
                    .iter()
                    .next()
                    .map(|(l, t)| format!("{g}{l} ({})", t.name))
                    .unwrap_or_default();
                if members.len() == 1
                    && confirm.confirm(&format!("Flatten group {g}: make {remaining} serial?"))
                {
                    if let Some((_, only)) = members.into_iter().next() {
                        self.groups.insert(g, Group::Serial(only));
                    }
                } else {
                    self.groups.insert(g, Group::Parallel(members));
                }
                Ok(task)
            }
        }
    }

    /// Move a task: remove at `from`, then insert at `to` (range-checked
    /// against the plan after removal). The task keeps its `origin`, so its
    /// folder is moved rather than recreated. On error the plan is unchanged.
    pub fn move_task(
        &mut self,
        from: &Position,
        to: &Position,
        confirm: &mut dyn Confirm,
    ) -> Result<String> {
        let snapshot = self.clone();
        let task = self.remove(from, confirm)?;
        let name = task.name.clone();
        if let Err(e) = self.insert(to, task, confirm) {
            *self = snapshot;
            return Err(e);
        }
        Ok(name)
    }

    /// Shift every group `>= at` up by one (descending, so keys never collide).
    fn open_gap(&mut self, at: u32) {
        let keys: Vec<u32> = self.groups.range(at..).map(|(k, _)| *k).rev().collect();
        for k in keys {
            if let Some(group) = self.groups.remove(&k) {
                self.groups.insert(k + 1, group);
            }
        }
    }

    /// Shift every group `> at` down by one (ascending).
    fn close_gap(&mut self, at: u32) {
        let keys: Vec<u32> = self.groups.range(at + 1..).map(|(k, _)| *k).collect();
        for k in keys {
            if let Some(group) = self.groups.remove(&k) {
                self.groups.insert(k - 1, group);
            }
        }
    }
}

fn first_free_letter(taken: &str) -> String {
    ('a'..='z')
        .map(String::from)
        .find(|l| l != taken)
        .unwrap_or_else(|| "a".to_string())
}

/// Task names become folder and module names.
pub fn validate_task_name(name: &str) -> Result<()> {
    let bad = name.is_empty()
        || name.starts_with('.')
        || name
            .chars()
            .any(|c| c == '/' || c == '\\' || c.is_whitespace() || c.is_control());
    if bad {
        return Err(Error::InvalidTaskName(name.to_string()));
    }
    Ok(())
}
