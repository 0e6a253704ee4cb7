//! Node sizing and canvas geometry.
//!
//! Layout never places nodes: positions are precomputed by the classifier and
//! read verbatim from the model. This module only derives sizes from model
//! attributes and answers geometric queries in canvas space.

use crate::tree::model::{Point, TreeModel, TreeNode};

pub const MIN_NODE_SIZE: f32 = 80.0;
pub const MAX_NODE_SIZE: f32 = 140.0;
const SIZE_PER_PAPER: f32 = 5.0;

const TIMELINE_MARKER_BASE: u32 = 30;
const TIMELINE_MARKER_PER_PAPER: u32 = 3;
const TIMELINE_MARKER_MAX: u32 = 60;

/// Diameter of a node disc in canvas units: `clamp(80 + papers * 5, 80, 140)`.
pub fn node_size(paper_count: u32) -> f32 {
    // Saturates long before f32 precision matters.
    let grown = MIN_NODE_SIZE + paper_count.min(1_000) as f32 * SIZE_PER_PAPER;
    grown.clamp(MIN_NODE_SIZE, MAX_NODE_SIZE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSize {
    Small,
    Large,
}

pub fn label_size(size: f32) -> LabelSize {
    if size > 100.0 {
        LabelSize::Large
    } else {
        LabelSize::Small
    }
}

/// Indicator diameter for a node on the timeline view.
pub fn timeline_marker_size(paper_count: u32) -> u32 {
    TIMELINE_MARKER_BASE
        .saturating_add(paper_count.saturating_mul(TIMELINE_MARKER_PER_PAPER))
        .min(TIMELINE_MARKER_MAX)
}

/// Axis-aligned box in canvas space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }
}

/// Bounding box of every node disc, or `None` for an empty tree.
pub fn bounds(model: &TreeModel) -> Option<Bounds> {
    let mut iter = model.nodes().iter().map(disc_bounds);
    let first = iter.next()?;
    Some(iter.fold(first, |acc, b| Bounds {
        min: Point::new(acc.min.x.min(b.min.x), acc.min.y.min(b.min.y)),
        max: Point::new(acc.max.x.max(b.max.x), acc.max.y.max(b.max.y)),
    }))
}

fn disc_bounds(node: &TreeNode) -> Bounds {
    let r = node_size(node.paper_count) / 2.0;
    Bounds {
        min: Point::new(node.position.x - r, node.position.y - r),
        max: Point::new(node.position.x + r, node.position.y + r),
    }
}

/// The node whose disc contains `point`.
///
/// Later nodes are drawn on top, so when discs overlap the last one in
/// snapshot order wins.
pub fn hit_test(model: &TreeModel, point: Point) -> Option<&TreeNode> {
    model
        .nodes()
        .iter()
        .rev()
        .find(|n| n.position.distance(point) <= node_size(n.paper_count) / 2.0)
}
