//! `mo add`, `mo delete`, `mo move`: edit the task plan and reshape folders.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use moforge_core::project::layout::{known_folders, plan_changes, resolve};
use moforge_core::project::{Confirm, LayoutChanges, MoManifest, Position, Task, TaskPlan};
use moforge_fs::{remove_dir_with_backup, rename_path, safe_create_dir, safe_write_file};

use crate::templates::{Templates, REQUIREMENTS, TASK_REQUIREMENTS};

/// Prefix for the intermediate names of two-phase renames.
const STAGING_PREFIX: &str = ".moforge-tmp";

/// `mo add --pos <POS> --name <NAME>`
pub fn cmd_add(
    base: &Path,
    pos: &str,
    name: &str,
    templates: &Templates,
    confirm: &mut dyn Confirm,
) -> Result<()> {
    let pos: Position = pos.parse()?;
    edit_plan(base, templates, confirm, |plan, confirm| {
        plan.insert(&pos, Task::new(name), confirm)?;
        Ok(())
    })?;
    eprintln!("Added task '{}' at position {}.", name, pos);
    Ok(())
}

/// `mo delete --pos <POS>`
///
/// The folder deletion is confirmed before anything is touched; declining
/// leaves both the manifest and the folders as they were.
pub fn cmd_delete(
    base: &Path,
    pos: &str,
    templates: &Templates,
    confirm: &mut dyn Confirm,
) -> Result<()> {
    let pos: Position = pos.parse()?;
    let manifest = MoManifest::load(base)?;
    let groups = resolve(base, &manifest.plan)?;
    let position = pos.to_string();
    if let Some(task) = groups
        .iter()
        .flat_map(|g| &g.tasks)
        .find(|t| t.position == position)
    {
        let folder = base.join(&task.folder);
        if !confirm.confirm(&format!("Delete folder '{}'?", folder.display())) {
            anyhow::bail!("Deletion of task at {} declined; nothing changed", pos);
        }
    }

    let mut removed = String::new();
    edit_plan(base, templates, confirm, |plan, confirm| {
        removed = plan.remove(&pos, confirm)?.name;
        Ok(())
    })?;
    eprintln!("Deleted task '{}' at position {}.", removed, pos);
    Ok(())
}

/// `mo move --from <POS> --to <POS>`
pub fn cmd_move(
    base: &Path,
    from: &str,
    to: &str,
    templates: &Templates,
    confirm: &mut dyn Confirm,
) -> Result<()> {
    let from: Position = from.parse()?;
    let to: Position = to.parse()?;
    let mut moved = String::new();
    edit_plan(base, templates, confirm, |plan, confirm| {
        moved = plan.move_task(&from, &to, confirm)?;
        Ok(())
    })?;
    eprintln!("Moved task '{}' from {} to {}.", moved, from, to);
    Ok(())
}

/// Load, validate, edit in memory, apply the folder diff, save.
fn edit_plan<F>(
    base: &Path,
    templates: &Templates,
    confirm: &mut dyn Confirm,
    edit: F,
) -> Result<()>
where
    F: FnOnce(&mut TaskPlan, &mut dyn Confirm) -> Result<()>,
{
    let mut manifest = MoManifest::load(base)?;
    let groups = resolve(base, &manifest.plan)?;
    let known = known_folders(&groups)?;

    let mut plan = manifest.plan.clone();
    edit(&mut plan, &mut *confirm)?;
    let changes = plan_changes(&known, &plan)?;
    tracing::debug!(?changes, "folder changes");

    apply_changes(base, &changes, templates, confirm)?;
    manifest.plan = plan;
    manifest.save(base)?;
    Ok(())
}

/// Bring the folders under `base` in line with an edited plan.
///
/// Renamed folders are moved to staging names before any removal, then to
/// their final names, so shifted folders never collide mid-way.
pub fn apply_changes(
    base: &Path,
    changes: &LayoutChanges,
    templates: &Templates,
    confirm: &mut dyn Confirm,
) -> Result<()> {
    if changes.is_empty() {
        return Ok(());
    }

    // Targets that are rename sources or removals are vacated before use.
    let vacated: BTreeSet<&str> = changes
        .renames
        .iter()
        .map(|r| r.from.as_str())
        .chain(changes.removals.iter().map(String::as_str))
        .collect();
    for r in &changes.renames {
        if base.join(&r.to).exists() && !vacated.contains(r.to.as_str()) {
            anyhow::bail!(
                "Cannot rename '{}' to '{}': target already exists",
                r.from,
                r.to
            );
        }
    }
    for c in &changes.creations {
        if base.join(&c.folder).exists() && !vacated.contains(c.folder.as_str()) {
            tracing::warn!(folder = %c.folder, "task folder already exists");
        }
    }

    let staged: Vec<String> = changes
        .renames
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{STAGING_PREFIX}-{i}-{}", r.to))
        .collect();
    for (r, tmp) in changes.renames.iter().zip(&staged) {
        rename_path(base, &r.from, tmp)?;
    }

    for folder in &changes.removals {
        let path = base.join(folder);
        if !path.exists() {
            continue;
        }
        let backup = remove_dir_with_backup(&path)?;
        eprintln!("Backed up folder '{}' to '{}'.", path.display(), backup.display());
        eprintln!("Deleted folder '{}'.", path.display());
    }

    for (r, tmp) in changes.renames.iter().zip(&staged) {
        rename_path(base, tmp, &r.to)?;
        eprintln!("Renamed '{}' to '{}'.", r.from, r.to);
    }

    for c in &changes.creations {
        let folder = base.join(&c.folder);
        safe_create_dir(&folder, confirm)?;
        safe_write_file(
            &folder.join(format!("{}.py", c.name)),
            &templates.task(&c.name),
            confirm,
        )?;
        safe_write_file(&folder.join(REQUIREMENTS), TASK_REQUIREMENTS, confirm)?;

        let wrappers = base.join("wrappers");
        if wrappers.is_dir() {
            safe_write_file(
                &wrappers.join(format!("{}_wrapper.py", c.name)),
                &templates.wrapper(&c.name),
                confirm,
            )?;
        }
    }
    Ok(())
}

/// Staging folders left behind by an interrupted rename.
pub fn staged_leftovers(base: &Path) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(base).with_context(|| format!("Failed to read {}", base.display()))? {
        let entry = entry?;
        if let Some(name) = entry.file_name().to_str() {
            if name.starts_with(STAGING_PREFIX) {
                out.push(name.to_string());
            }
        }
    }
    out.sort();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use moforge_core::project::FixedAnswer;
    use moforge_core::project::{Group, Rename};

    fn project(folders: &[&str], yaml: &str) -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("wrappers")).unwrap();
        for f in folders {
            fs::create_dir_all(tmp.path().join(f)).unwrap();
            fs::write(tmp.path().join(f).join("marker"), f).unwrap();
        }
        fs::write(tmp.path().join("Mo.yaml"), yaml).unwrap();
        tmp
    }

    fn dirs(base: &Path) -> Vec<String> {
        let mut out: Vec<String> = fs::read_dir(base)
            .unwrap()
            .flatten()
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().to_str().map(String::from))
            .filter(|n| n != "wrappers")
            .collect();
        out.sort();
        out
    }

    fn marker(base: &Path, folder: &str) -> String {
        fs::read_to_string(base.join(folder).join("marker")).unwrap()
    }

    const TWO_SERIAL: &str = "model: m\ntasks:\n  1: load\n  2: fit\n";

    #[test]
    fn test_add_serial_shifts_later_groups() {
        let tmp = project(&["1_load", "2_fit"], TWO_SERIAL);
        let base = tmp.path();
        cmd_add(base, "2", "clean", &Templates::default(), &mut FixedAnswer::new(true)).unwrap();

        assert_eq!(dirs(base), vec!["1_load", "2_clean", "3_fit"]);
        assert_eq!(marker(base, "3_fit"), "2_fit");
        assert!(base.join("2_clean").join("clean.py").is_file());
        assert_eq!(
            fs::read_to_string(base.join("2_clean").join("requirements.txt")).unwrap(),
            TASK_REQUIREMENTS
        );
        assert!(base.join("wrappers").join("clean_wrapper.py").is_file());

        let mo = MoManifest::load(base).unwrap();
        let names: Vec<String> = mo
            .plan
            .placements()
            .iter()
            .map(|(p, t)| format!("{p}:{}", t.name))
            .collect();
        assert_eq!(names, vec!["1:load", "2:clean", "3:fit"]);
        assert!(staged_leftovers(base).unwrap().is_empty());
    }

    #[test]
    fn test_add_parallel_converts_serial_group() {
        let tmp = project(&["1_load", "2_fit"], TWO_SERIAL);
        let base = tmp.path();
        cmd_add(base, "2b", "fit_alt", &Templates::default(), &mut FixedAnswer::new(true)).unwrap();

        assert_eq!(dirs(base), vec!["1_load", "2a_fit", "2b_fit_alt"]);
        let mo = MoManifest::load(base).unwrap();
        assert!(matches!(mo.plan.get(2), Some(Group::Parallel(_))));
    }

    #[test]
    fn test_add_declined_conversion_changes_nothing() {
        let tmp = project(&["1_load", "2_fit"], TWO_SERIAL);
        let base = tmp.path();
        let before = fs::read_to_string(base.join("Mo.yaml")).unwrap();
        let err = cmd_add(base, "2a", "x", &Templates::default(), &mut FixedAnswer::new(false));
        assert!(err.is_err());
        assert_eq!(dirs(base), vec!["1_load", "2_fit"]);
        assert_eq!(fs::read_to_string(base.join("Mo.yaml")).unwrap(), before);
    }

    #[test]
    fn test_add_rejects_out_of_range() {
        let tmp = project(&["1_load", "2_fit"], TWO_SERIAL);
        let err = cmd_add(tmp.path(), "5", "x", &Templates::default(), &mut FixedAnswer::new(true))
            .unwrap_err();
        assert!(err.to_string().contains('5'));
    }

    #[test]
    fn test_delete_serial_closes_gap() {
        let tmp = project(
            &["1_load", "2_clean", "3_fit"],
            "model: m\ntasks:\n  1: load\n  2: clean\n  3: fit\n",
        );
        let base = tmp.path();
        cmd_delete(base, "2", &Templates::default(), &mut FixedAnswer::new(true)).unwrap();
        assert_eq!(dirs(base), vec!["1_load", "2_fit"]);
        assert_eq!(marker(base, "2_fit"), "3_fit");
    }

    #[test]
    fn test_delete_first_of_two_same_named_tasks() {
        let tmp = project(&["1_train", "2_train"], "model: m\ntasks:\n  1: train\n  2: train\n");
        let base = tmp.path();
        cmd_delete(base, "1", &Templates::default(), &mut FixedAnswer::new(true)).unwrap();
        assert_eq!(dirs(base), vec!["1_train"]);
        assert_eq!(marker(base, "1_train"), "2_train");
        assert!(staged_leftovers(base).unwrap().is_empty());

        let mo = MoManifest::load(base).unwrap();
        assert_eq!(mo.plan.len(), 1);
    }

    #[test]
    fn test_failed_rename_keeps_removed_folder() {
        let tmp = project(
            &["1_load", "2_clean", "3_fit"],
            "model: m\ntasks:\n  1: load\n  2: clean\n  3: fit\n",
        );
        let base = tmp.path();
        let changes = LayoutChanges {
            removals: vec!["1_load".to_string()],
            renames: vec![
                Rename { from: "2_clean".to_string(), to: "1_clean".to_string() },
                Rename { from: "9_missing".to_string(), to: "2_missing".to_string() },
            ],
            creations: Vec::new(),
        };
        let res = apply_changes(base, &changes, &Templates::default(), &mut FixedAnswer::new(true));
        assert!(res.is_err());
        assert!(base.join("1_load").is_dir());
    }

    #[test]
    fn test_delete_declined_aborts() {
        let tmp = project(&["1_load", "2_fit"], TWO_SERIAL);
        let base = tmp.path();
        let mut no = FixedAnswer::new(false);
        assert!(cmd_delete(base, "1", &Templates::default(), &mut no).is_err());
        assert_eq!(dirs(base), vec!["1_load", "2_fit"]);
        assert_eq!(no.asked.len(), 1);
        assert!(no.asked[0].starts_with("Delete folder"));
    }

    #[test]
    fn test_delete_parallel_member_flattens() {
        let tmp = project(
            &["1_load", "2a_fit", "2b_fit_alt"],
            "model: m\ntasks:\n  1: load\n  2:\n    a: fit\n    b: fit_alt\n",
        );
        let base = tmp.path();
        cmd_delete(base, "2b", &Templates::default(), &mut FixedAnswer::new(true)).unwrap();
        assert_eq!(dirs(base), vec!["1_load", "2_fit"]);
        assert_eq!(marker(base, "2_fit"), "2a_fit");
    }

    #[test]
    fn test_move_swaps_through_staging() {
        let tmp = project(
            &["1_load", "2_clean", "3_fit"],
            "model: m\ntasks:\n  1: load\n  2: clean\n  3: fit\n",
        );
        let base = tmp.path();
        cmd_move(base, "3", "1", &Templates::default(), &mut FixedAnswer::new(true)).unwrap();
        assert_eq!(dirs(base), vec!["1_fit", "2_load", "3_clean"]);
        assert_eq!(marker(base, "1_fit"), "3_fit");
        assert_eq!(marker(base, "2_load"), "1_load");
        assert!(staged_leftovers(base).unwrap().is_empty());
    }

    #[test]
    fn test_missing_folder_fails_before_edit() {
        let tmp = project(&["1_load"], TWO_SERIAL);
        let base = tmp.path();
        assert!(cmd_add(base, "3", "x", &Templates::default(), &mut FixedAnswer::new(true)).is_err());
        assert_eq!(dirs(base), vec!["1_load"]);
    }
}
