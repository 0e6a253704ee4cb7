//! Boundary to the export collaborator.
//!
//! The tree only describes what to export; producing the document is the
//! exporter's job.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::parser::snapshot::Snapshot;
use crate::tree::model::Point;
use crate::tree::viewport::Viewport;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Visual,
    Outline,
    Html,
    Research,
}

impl ExportFormat {
    pub fn describe(self) -> &'static str {
        match self {
            ExportFormat::Visual => "tree diagram as an image",
            ExportFormat::Outline => "nested outline document",
            ExportFormat::Html => "interactive web page",
            ExportFormat::Research => "literature review draft",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ReviewStyle {
    #[default]
    ProblemSolution,
    Chronological,
    Thematic,
    Methodological,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    pub include_nodes: bool,
    pub include_descriptions: bool,
    pub include_papers: bool,
    pub include_gaps: bool,
    pub include_annotations: bool,
    pub generate_review: bool,
    pub review_style: ReviewStyle,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_nodes: true,
            include_descriptions: true,
            include_papers: true,
            include_gaps: true,
            include_annotations: false,
            generate_review: true,
            review_style: ReviewStyle::ProblemSolution,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub scale: f32,
    pub pan_x: f32,
    pub pan_y: f32,
}

impl From<&Viewport> for ViewportState {
    fn from(vp: &Viewport) -> Self {
        let Point { x, y } = vp.pan();
        Self {
            scale: vp.scale(),
            pan_x: x,
            pan_y: y,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub format: ExportFormat,
    pub options: ExportOptions,
    pub snapshot: Snapshot,
    pub viewport: ViewportState,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write export request to {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode export request")]
    Encode(#[from] serde_json::Error),
}

pub trait Exporter {
    /// Hand the request over; returns where the collaborator can pick it up.
    fn export(&self, request: &ExportRequest) -> Result<PathBuf, ExportError>;
}

/// Drops requests as `export-<format>.json` into a directory.
#[derive(Debug, Clone)]
pub struct RequestFileExporter {
    dir: PathBuf,
}

impl RequestFileExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, format: ExportFormat) -> PathBuf {
        self.dir.join(format!("export-{format}.json"))
    }
}

impl Exporter for RequestFileExporter {
    fn export(&self, request: &ExportRequest) -> Result<PathBuf, ExportError> {
        let path = self.path_for(request.format);
        let mut body = serde_json::to_string_pretty(request)?;
        body.push('\n');
        write(&path, &body)?;
        Ok(path)
    }
}

fn write(path: &Path, body: &str) -> Result<(), ExportError> {
    fs::write(path, body).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}
