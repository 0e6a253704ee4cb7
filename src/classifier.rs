//! Client side of the paper classifier.
//!
//! The classifier turns a project's papers into a tree snapshot. It is the
//! only asynchronous collaborator; callers bound it with a timeout and a
//! cancellation signal through [`run_build`].

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::parser::snapshot::{self, Snapshot, SnapshotError};
use crate::tree::demo;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// A paper in the current project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paper {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

pub fn parse_papers(input: &str) -> Result<Vec<Paper>, serde_json::Error> {
    serde_json::from_str(input)
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("the project has no papers to classify")]
    NoPapers,
    #[error("classifier did not answer within {}s", .0.as_secs())]
    TimedOut(Duration),
    #[error("build cancelled")]
    Cancelled,
    #[error("classifier failed: {0}")]
    Classifier(String),
    #[error("classifier returned an invalid tree")]
    InvalidSnapshot(#[from] SnapshotError),
}

#[async_trait::async_trait]
pub trait Classifier: Send + Sync {
    async fn submit_build_request(&self, papers: &[Paper]) -> Result<Snapshot, BuildError>;
}

/// Submit `papers` and validate the returned snapshot.
///
/// Resolves to `TimedOut` once `limit` elapses and to `Cancelled` as soon as
/// `cancel` completes, whichever comes first.
pub async fn run_build<C, F>(
    classifier: &C,
    papers: &[Paper],
    limit: Duration,
    cancel: F,
) -> Result<Snapshot, BuildError>
where
    C: Classifier + ?Sized,
    F: Future<Output = ()>,
{
    if papers.is_empty() {
        return Err(BuildError::NoPapers);
    }
    info!(papers = papers.len(), timeout_secs = limit.as_secs(), "submitting build request");

    let snapshot = tokio::select! {
        result = tokio::time::timeout(limit, classifier.submit_build_request(papers)) => {
            match result {
                Ok(result) => result?,
                Err(_) => {
                    warn!("classifier timed out");
                    return Err(BuildError::TimedOut(limit));
                }
            }
        }
        _ = cancel => return Err(BuildError::Cancelled),
    };

    let model = snapshot::to_model(&snapshot)?;
    info!(nodes = model.nodes().len(), "classifier returned tree");
    Ok(snapshot)
}

/// Offline stand-in: answers with the sample tree after `delay`, spreading the
/// submitted papers over its nodes.
#[derive(Debug, Clone)]
pub struct DemoClassifier {
    pub delay: Duration,
}

impl Default for DemoClassifier {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(400),
        }
    }
}

#[async_trait::async_trait]
impl Classifier for DemoClassifier {
    async fn submit_build_request(&self, papers: &[Paper]) -> Result<Snapshot, BuildError> {
        tokio::time::sleep(self.delay).await;
        let mut snapshot = demo::demo_snapshot()?;
        let slots = snapshot.nodes.len();
        if slots == 0 {
            return Err(BuildError::Classifier("sample tree is empty".into()));
        }
        for (i, paper) in papers.iter().enumerate() {
            let node = &mut snapshot.nodes[i % slots];
            node.papers.push(paper.id.clone());
            node.paper_count = node.paper_count.saturating_add(1);
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future;

    fn papers(n: usize) -> Vec<Paper> {
        (0..n)
            .map(|i| Paper {
                id: format!("p{i}"),
                title: format!("Paper {i}"),
                year: None,
            })
            .collect()
    }

    struct Broken;

    #[async_trait::async_trait]
    impl Classifier for Broken {
        async fn submit_build_request(&self, _: &[Paper]) -> Result<Snapshot, BuildError> {
            Ok(snapshot::parse(
                r#"{"nodes":[{"id":"a","type":"theory","position":{"x":0,"y":0},"createdAt":2020}]}"#,
            )?)
        }
    }

    #[tokio::test]
    async fn demo_build_assigns_papers() {
        let classifier = DemoClassifier {
            delay: Duration::ZERO,
        };
        let snap = run_build(&classifier, &papers(8), DEFAULT_TIMEOUT, future::pending())
            .await
            .unwrap();
        let assigned: usize = snap.nodes.iter().map(|n| n.papers.len()).sum();
        assert_eq!(assigned, 8);
        assert!(snap.nodes[0].papers.contains(&"p0".to_string()));
    }

    #[tokio::test]
    async fn empty_project_is_rejected_up_front() {
        let classifier = DemoClassifier::default();
        let err = run_build(&classifier, &[], DEFAULT_TIMEOUT, future::pending())
            .await
            .unwrap_err();
        assert!(matches!(err, BuildError::NoPapers));
    }

    #[tokio::test]
    async fn slow_classifier_times_out() {
        let classifier = DemoClassifier {
            delay: Duration::from_secs(30),
        };
        let err = run_build(
            &classifier,
            &papers(1),
            Duration::from_millis(20),
            future::pending(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, BuildError::TimedOut(_)));
    }

    #[tokio::test]
    async fn cancellation_wins_over_slow_classifier() {
        let classifier = DemoClassifier {
            delay: Duration::from_secs(30),
        };
        let err = run_build(&classifier, &papers(1), DEFAULT_TIMEOUT, future::ready(()))
            .await
            .unwrap_err();
        assert!(matches!(err, BuildError::Cancelled));
    }

    #[tokio::test]
    async fn invalid_tree_is_reported() {
        let err = run_build(&Broken, &papers(1), DEFAULT_TIMEOUT, future::pending())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::InvalidSnapshot(SnapshotError::UnknownNodeType { .. })
        ));
    }

    #[test]
    fn paper_list_parses_optional_year() {
        let list = parse_papers(r#"[{"id":"a","title":"A","year":2020},{"id":"b","title":"B"}]"#)
            .unwrap();
        assert_eq!(list[0].year, Some(2020));
        assert_eq!(list[1].year, None);
    }
}
