//! `ktree edit`: open the snapshot in an editor and replace it only if the
//! edited copy validates.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result, bail};
use crossterm::style::Stylize;
use tracing::info;

use crate::parser::snapshot;
use crate::tree::model::TreeModel;
use crate::workspace;

pub fn run() -> Result<()> {
    let root = workspace::find_root()?;
    let draft = draft_path(&root);
    if prepare_draft(&root)? == DraftStart::Resumed {
        println!(
            "  {} unfinished edit in {}",
            "Resuming".yellow().bold(),
            draft.display()
        );
    }

    let editor = resolve_editor();
    let mut parts = editor.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| anyhow::anyhow!("no editor configured for `ktree edit`"))?;
    let args: Vec<String> = parts.map(ToString::to_string).collect();

    let status = Command::new(program)
        .args(&args)
        .arg(&draft)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| format!("failed to launch editor {:?} for {}", editor, draft.display()))?;

    if !status.success() {
        bail!("editor exited with status {}", status);
    }

    let model = apply_draft(&root)?;
    println!(
        "  {} ktree/snapshot.json ({} nodes, {} connections)",
        "Updated".green().bold(),
        model.nodes().len(),
        model.connections().len()
    );
    Ok(())
}

fn draft_path(root: &Path) -> PathBuf {
    workspace::ktree_dir(root).join("snapshot.edit.json")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DraftStart {
    Fresh,
    /// A draft left by an earlier rejected edit; it is never overwritten.
    Resumed,
}

fn prepare_draft(root: &Path) -> Result<DraftStart> {
    let draft = draft_path(root);
    if draft.exists() {
        return Ok(DraftStart::Resumed);
    }
    let snapshot_path = workspace::snapshot_path(root);
    fs::copy(&snapshot_path, &draft)
        .with_context(|| format!("failed to copy {}", snapshot_path.display()))?;
    Ok(DraftStart::Fresh)
}

/// Validate the draft and move it over the snapshot. An invalid draft is left
/// in place so the edits are not lost.
fn apply_draft(root: &Path) -> Result<TreeModel> {
    let draft = draft_path(root);
    let content = fs::read_to_string(&draft)
        .with_context(|| format!("failed to read {}", draft.display()))?;
    let model = snapshot::load_str(&content).with_context(|| {
        format!(
            "edited snapshot is invalid; your changes are kept in {}",
            draft.display()
        )
    })?;
    fs::rename(&draft, workspace::snapshot_path(root))
        .with_context(|| format!("failed to replace snapshot with {}", draft.display()))?;
    info!(nodes = model.nodes().len(), "snapshot replaced by edit");
    Ok(model)
}

fn resolve_editor() -> String {
    for var in ["KTREE_EDITOR", "VISUAL", "EDITOR"] {
        if let Some(e) = std::env::var(var).ok().filter(|v| !v.trim().is_empty()) {
            return e;
        }
    }
    if cfg!(windows) {
        "notepad".to_string()
    } else {
        "vi".to_string()
    }
}
