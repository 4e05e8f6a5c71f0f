//! `Mo.yaml`: model name, ordered task groups and an optional build section.
//!
//! ```yaml
//! model: My Model
//! tasks:
//!   '1': ingest
//!   '2':
//!     a: features_a
//!     b: features_b
//! build:
//!   entry: main.py
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use super::plan::{Group, Task, TaskPlan};
use super::position::{is_valid_letter, Position};
use crate::error::{Error, Result};

pub const MANIFEST_FILE: &str = "Mo.yaml";

/// Optional `build:` section consumed by `mo bootstrap` / `mo package`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dist: Option<String>,
    /// Command lines run inside the activated venv by `mo bootstrap`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RawManifest {
    #[serde(default)]
    model: String,
    #[serde(default)]
    tasks: Mapping,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    build: Option<BuildSection>,
    /// Keys this tool does not know about survive a load/save cycle.
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoManifest {
    pub model: String,
    pub plan: TaskPlan,
    pub build: Option<BuildSection>,
    pub extra: BTreeMap<String, Value>,
}

impl MoManifest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            plan: TaskPlan::new(),
            build: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn path(base_dir: &Path) -> PathBuf {
        base_dir.join(MANIFEST_FILE)
    }

    pub fn exists(base_dir: &Path) -> bool {
        Self::path(base_dir).is_file()
    }

    pub fn load(base_dir: &Path) -> Result<Self> {
        let path = Self::path(base_dir);
        if !path.is_file() {
            return Err(Error::ManifestNotFound(base_dir.to_path_buf()));
        }
        let content = fs::read_to_string(&path)?;
        Self::parse(&content).map_err(|e| match e {
            Error::ManifestParse { message, .. } => Error::ManifestParse { path, message },
            other => other,
        })
    }

    /// Parse manifest text. Group keys may be YAML strings (`'3'`) or integers.
    pub fn parse(content: &str) -> Result<Self> {
        let parse_err = |message: String| Error::ManifestParse {
            path: PathBuf::from(MANIFEST_FILE),
            message,
        };
        let raw: RawManifest = if content.trim().is_empty() {
            RawManifest {
                model: String::new(),
                tasks: Mapping::new(),
                build: None,
                extra: BTreeMap::new(),
            }
        } else {
            serde_yaml::from_str(content).map_err(|e| parse_err(e.to_string()))?
        };

        let mut plan = TaskPlan::new();
        for (key, value) in &raw.tasks {
            let group = group_key(key)
                .ok_or_else(|| parse_err(format!("invalid task group key {}", show(key))))?;
            if plan.get(group).is_some() {
                return Err(parse_err(format!("task group {group} listed twice")));
            }
            match value {
                Value::Mapping(members) => {
                    if members.is_empty() {
                        tracing::warn!(group, "empty parallel group in Mo.yaml ignored");
                        continue;
                    }
                    let mut tasks = BTreeMap::new();
                    for (letter, name) in members {
                        let letter = scalar(letter)
                            .filter(|l| is_valid_letter(l))
                            .ok_or_else(|| {
                                parse_err(format!("invalid letter {} in group {group}", show(letter)))
                            })?;
                        let name = scalar(name).ok_or_else(|| {
                            parse_err(format!("task {group}{letter} has no name"))
                        })?;
                        let origin = Position::parallel(group, letter.clone());
                        tasks.insert(letter, Task::loaded(name, origin));
                    }
                    plan.put_group(group, Group::Parallel(tasks));
                }
                other => {
                    let name = scalar(other)
                        .ok_or_else(|| parse_err(format!("task {group} has no name")))?;
                    plan.put_group(group, Group::Serial(Task::loaded(name, Position::serial(group))));
                }
            }
        }

        Ok(Self {
            model: raw.model,
            plan,
            build: raw.build,
            extra: raw.extra,
        })
    }

    pub fn to_yaml(&self) -> Result<String> {
        let mut tasks = Mapping::new();
        for (g, group) in self.plan.groups() {
            let value = match group {
                Group::Serial(task) => Value::String(task.name.clone()),
                Group::Parallel(members) => {
                    let mut m = Mapping::new();
                    for (letter, task) in members {
                        m.insert(Value::String(letter.clone()), Value::String(task.name.clone()));
                    }
                    Value::Mapping(m)
                }
            };
            tasks.insert(Value::String(g.to_string()), value);
        }
        let raw = RawManifest {
            model: self.model.clone(),
            tasks,
            build: self.build.clone(),
            extra: self.extra.clone(),
        };
        Ok(serde_yaml::to_string(&raw)?)
    }

    /// Write `Mo.yaml` unconditionally (task edits are the point of the command).
    pub fn save(&self, base_dir: &Path) -> Result<()> {
        let path = Self::path(base_dir);
        fs::write(&path, self.to_yaml()?)?;
        tracing::debug!(path = %path.display(), "saved manifest");
        Ok(())
    }
}

fn group_key(key: &Value) -> Option<u32> {
    let n = match key {
        Value::String(s) => s.trim().parse::<u32>().ok()?,
        Value::Number(n) => u32::try_from(n.as_u64()?).ok()?,
        _ => return None,
    };
    (n > 0).then_some(n)
}

fn scalar(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn show(v: &Value) -> String {
    serde_yaml::to_string(v)
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|_| "?".to_string())
}
