//! `mo validate`: check Mo.yaml against the task folders and print the chain.

use std::path::Path;

use anyhow::{Context, Result};
use moforge_core::project::layout::resolve;
use moforge_core::project::{MoManifest, ResolvedGroup};

use crate::task::staged_leftovers;

/// Validate the project under `base`; prints text or, with `json`, a JSON
/// document on stdout.
pub fn cmd_validate(base: &Path, json: bool) -> Result<Vec<ResolvedGroup>> {
    let manifest = MoManifest::load(base)?;
    let groups = resolve(base, &manifest.plan)?;

    let leftovers = staged_leftovers(base)?;
    if !leftovers.is_empty() {
        tracing::warn!(?leftovers, "staging folders from an interrupted rename");
    }

    if json {
        let doc = serde_json::json!({
            "model": manifest.model,
            "groups": groups,
            "gaps": manifest.plan.gaps(),
        });
        let text = serde_json::to_string_pretty(&doc).context("Failed to serialize groups")?;
        println!("{}", text);
    } else {
        print!("{}", render_groups(&groups));
    }
    Ok(groups)
}

fn render_groups(groups: &[ResolvedGroup]) -> String {
    let fmt_link = |g: Option<u32>| g.map_or_else(|| "None".to_string(), |g| g.to_string());
    let mut out = String::from("Validation successful. Current tasks:\n");
    for g in groups {
        let kind = if g.parallel { "parallel" } else { "serial" };
        out.push_str(&format!(
            "Group {} [{}] (prev: {}, next: {}):\n",
            g.group,
            kind,
            fmt_link(g.prev),
            fmt_link(g.next)
        ));
        for t in &g.tasks {
            out.push_str(&format!("  - {}: {}\n", t.position, t.name));
        }
    }
    out
}
