//! Paths and common operations for the `ktree/` directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::classifier::{self, Paper};
use crate::parser::config::{self, Preferences};
use crate::parser::snapshot;
use crate::tree::model::TreeModel;

/// Walk upward from `start` to find the directory containing `ktree/snapshot.json`.
pub fn find_root_from(start: &Path) -> Result<PathBuf> {
    let mut dir = start;
    loop {
        if snapshot_path(dir).exists() {
            return Ok(dir.to_path_buf());
        }
        match dir.parent() {
            Some(parent) => dir = parent,
            None => bail!("no knowledge tree found; run `ktree init` to create one here"),
        }
    }
}

pub fn find_root() -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    find_root_from(&cwd)
}

pub fn ktree_dir(root: &Path) -> PathBuf {
    root.join("ktree")
}

pub fn snapshot_path(root: &Path) -> PathBuf {
    root.join("ktree").join("snapshot.json")
}

pub fn settings_path(root: &Path) -> PathBuf {
    root.join("ktree").join("settings.ktree")
}

pub fn papers_path(root: &Path) -> PathBuf {
    root.join("ktree").join("papers.json")
}

pub fn log_path(root: &Path) -> PathBuf {
    root.join("ktree").join("ktree.log")
}

pub fn load_model(root: &Path) -> Result<TreeModel> {
    let path = snapshot_path(root);
    let content = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    snapshot::load_str(&content).with_context(|| format!("invalid snapshot {}", path.display()))
}

/// Missing settings file means defaults.
pub fn load_preferences(root: &Path) -> Result<Preferences> {
    let path = settings_path(root);
    if !path.exists() {
        return Ok(Preferences::default());
    }
    let content = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    config::parse(&content).with_context(|| format!("invalid settings {}", path.display()))
}

pub fn save_preferences(root: &Path, prefs: &Preferences) -> Result<()> {
    let path = settings_path(root);
    fs::write(&path, config::serialize(prefs))
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Missing paper list means an empty project.
pub fn load_papers(root: &Path) -> Result<Vec<Paper>> {
    let path = papers_path(root);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    classifier::parse_papers(&content)
        .with_context(|| format!("invalid paper list {}", path.display()))
}
