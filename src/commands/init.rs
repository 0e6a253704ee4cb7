//! `ktree init`: create the `ktree/` workspace in the current directory.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use crossterm::style::Stylize;

use crate::parser::config::{self, Preferences};
use crate::parser::snapshot::{self, Snapshot};
use crate::workspace;

pub fn run() -> Result<()> {
    let root = std::env::current_dir()?;
    run_in(&root)
}

pub fn run_in(root: &Path) -> Result<()> {
    let dir = workspace::ktree_dir(root);
    let snapshot_path = workspace::snapshot_path(root);

    if snapshot_path.exists() {
        bail!("ktree is already initialised (ktree/snapshot.json exists). Run `ktree build` instead.");
    }

    fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    fs::write(&snapshot_path, snapshot::serialize(&Snapshot::default())?)?;
    println!("  {} ktree/snapshot.json", "Created".green().bold());

    let settings_path = workspace::settings_path(root);
    if !settings_path.exists() {
        fs::write(&settings_path, config::serialize(&Preferences::default()))?;
        println!("  {} ktree/settings.ktree", "Created".green().bold());
    }

    let papers_path = workspace::papers_path(root);
    if !papers_path.exists() {
        fs::write(&papers_path, "[]\n")?;
        println!("  {} ktree/papers.json", "Created".green().bold());
    }

    println!(
        "  {} add papers to ktree/papers.json, then run `ktree build`",
        "Next:".cyan().bold()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_workspace_files() {
        let dir = TempDir::new().unwrap();
        run_in(dir.path()).unwrap();
        assert!(workspace::ktree_dir(dir.path()).is_dir());
        assert!(workspace::load_model(dir.path()).unwrap().is_empty());
        assert_eq!(
            workspace::load_preferences(dir.path()).unwrap(),
            Preferences::default()
        );
        assert!(workspace::load_papers(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn keeps_existing_settings_and_papers() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("ktree")).unwrap();
        fs::write(workspace::settings_path(dir.path()), "onboarding_seen: true\n").unwrap();
        fs::write(
            workspace::papers_path(dir.path()),
            r#"[{"id":"p1","title":"One"}]"#,
        )
        .unwrap();
        run_in(dir.path()).unwrap();
        assert!(workspace::load_preferences(dir.path()).unwrap().onboarding_seen);
        assert_eq!(workspace::load_papers(dir.path()).unwrap().len(), 1);
    }

    #[test]
    fn error_if_already_initialised() {
        let dir = TempDir::new().unwrap();
        run_in(dir.path()).unwrap();
        assert!(run_in(dir.path()).is_err());
    }
}
