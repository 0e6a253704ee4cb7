//! `ktree build`: classify the project's papers into a fresh tree.

use std::fs;
use std::future::Future;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::style::Stylize;

use crate::classifier::{self, BuildError, Classifier, DemoClassifier};
use crate::parser::config::TreeSettings;
use crate::parser::snapshot;
use crate::workspace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// No papers yet; nothing was submitted.
    EmptyProject,
    Built { nodes: usize },
}

pub fn run(timeout_secs: Option<u64>) -> Result<()> {
    let root = workspace::find_root()?;
    let limit = timeout_secs
        .map(Duration::from_secs)
        .unwrap_or(classifier::DEFAULT_TIMEOUT);
    let settings = workspace::load_preferences(&root)?.settings;
    println!(
        "  {} {}",
        "Sources".cyan().bold(),
        sources(&settings).join(", ").dark_grey()
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("failed to start async runtime")?;
    let outcome = runtime.block_on(build_in(&root, &DemoClassifier::default(), limit, ctrl_c()))?;

    match outcome {
        BuildOutcome::EmptyProject => {
            println!("  Your knowledge tree is empty.");
            println!(
                "  Add papers to {} and run `ktree build` again.",
                "ktree/papers.json".bold()
            );
        }
        BuildOutcome::Built { nodes } => {
            println!(
                "  {} ktree/snapshot.json with {} nodes",
                "Built".green().bold(),
                nodes.to_string().green()
            );
        }
    }
    Ok(())
}

pub async fn build_in<C, F>(
    root: &Path,
    classifier: &C,
    limit: Duration,
    cancel: F,
) -> Result<BuildOutcome>
where
    C: Classifier + ?Sized,
    F: Future<Output = ()>,
{
    let papers = workspace::load_papers(root)?;
    let snap = match classifier::run_build(classifier, &papers, limit, cancel).await {
        Ok(snap) => snap,
        Err(BuildError::NoPapers) => return Ok(BuildOutcome::EmptyProject),
        Err(err) => return Err(err).context("tree build failed; the previous snapshot is unchanged"),
    };
    let path = workspace::snapshot_path(root);
    fs::write(&path, snapshot::serialize(&snap)?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(BuildOutcome::Built {
        nodes: snap.nodes.len(),
    })
}

fn sources(settings: &TreeSettings) -> Vec<&'static str> {
    [
        (settings.build_from_abstracts, "abstracts"),
        (settings.build_from_citations, "citations"),
        (settings.build_from_highlights, "highlights"),
        (settings.build_from_full_text, "full text"),
    ]
    .into_iter()
    .filter_map(|(on, name)| on.then_some(name))
    .collect()
}

/// Resolves on ctrl-c; never resolves if the handler cannot be installed.
async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future;
    use tempfile::TempDir;

    fn workspace(papers: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("ktree")).unwrap();
        fs::write(workspace::snapshot_path(dir.path()), "{}").unwrap();
        fs::write(workspace::papers_path(dir.path()), papers).unwrap();
        dir
    }

    fn instant() -> DemoClassifier {
        DemoClassifier {
            delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn empty_project_leaves_snapshot_alone() {
        let dir = workspace("[]");
        let outcome = build_in(dir.path(), &instant(), Duration::from_secs(5), future::pending())
            .await
            .unwrap();
        assert_eq!(outcome, BuildOutcome::EmptyProject);
        assert!(workspace::load_model(dir.path()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn build_writes_valid_snapshot() {
        let dir = workspace(r#"[{"id":"p1","title":"One"},{"id":"p2","title":"Two"}]"#);
        let outcome = build_in(dir.path(), &instant(), Duration::from_secs(5), future::pending())
            .await
            .unwrap();
        assert!(matches!(outcome, BuildOutcome::Built { nodes } if nodes > 0));
        let model = workspace::load_model(dir.path()).unwrap();
        assert!(model.nodes().iter().any(|n| n.papers.contains(&"p2".to_string())));
    }

    #[tokio::test]
    async fn cancelled_build_keeps_previous_snapshot() {
        let dir = workspace(r#"[{"id":"p1","title":"One"}]"#);
        let slow = DemoClassifier {
            delay: Duration::from_secs(30),
        };
        let err = build_in(dir.path(), &slow, Duration::from_secs(60), future::ready(()))
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("cancelled"));
        assert!(workspace::load_model(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn sources_follow_settings() {
        let mut s = TreeSettings::default();
        assert_eq!(sources(&s), vec!["abstracts", "citations", "highlights"]);
        s.build_from_full_text = true;
        s.build_from_citations = false;
        assert_eq!(sources(&s), vec!["abstracts", "highlights", "full text"]);
    }
}
