//! The interactive tree: current model plus viewport and selection.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use crate::parser::snapshot::{self, Snapshot, SnapshotError};
use crate::tree::edges::{self, EdgeSet};
use crate::tree::export::{ExportError, ExportFormat, ExportOptions, ExportRequest, Exporter};
use crate::tree::layout;
use crate::tree::model::{Point, TreeModel, TreeNode};
use crate::tree::selection::Selection;
use crate::tree::timeline::{self, YearGroup};
use crate::tree::viewport::{PointerTarget, Viewport};

/// Result of pressing the pointer on the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerOutcome {
    Selected(String),
    Dragging,
}

#[derive(Debug, Clone, Default)]
pub struct TreeView {
    model: Arc<TreeModel>,
    viewport: Viewport,
    selection: Selection,
}

impl TreeView {
    pub fn new(model: TreeModel) -> Self {
        Self {
            model: Arc::new(model),
            ..Self::default()
        }
    }

    pub fn model(&self) -> &Arc<TreeModel> {
        &self.model
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Replace the model wholesale.
    ///
    /// A snapshot that fails validation leaves the current model, selection
    /// and viewport exactly as they were.
    pub fn load(&mut self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        let model = snapshot::to_model(snapshot).inspect_err(|err| {
            warn!(error = %err, "rejected snapshot; keeping previous tree");
        })?;
        self.replace(model);
        Ok(())
    }

    pub fn load_str(&mut self, input: &str) -> Result<(), SnapshotError> {
        let snapshot = snapshot::parse(input).inspect_err(|err| {
            warn!(error = %err, "unreadable snapshot; keeping previous tree");
        })?;
        self.load(&snapshot)
    }

    fn replace(&mut self, model: TreeModel) {
        info!(
            nodes = model.nodes().len(),
            connections = model.connections().len(),
            "loaded tree"
        );
        self.selection.retain_in(&model);
        self.model = Arc::new(model);
    }

    pub fn select_node(&mut self, id: &str) -> bool {
        self.selection.select(&self.model, id)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selected_node(&self) -> Option<&TreeNode> {
        self.selection.selected().and_then(|id| self.model.get(id))
    }

    pub fn set_viewport(&mut self, scale: f32, pan: Point) {
        self.viewport.set(scale, pan);
    }

    pub fn reset_viewport(&mut self) {
        self.viewport.reset();
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn wheel(&mut self, delta: f32) {
        self.viewport.zoom_by_wheel(delta);
    }

    /// Fit every node into a `screen`-sized area. No-op on an empty tree.
    pub fn fit_to(&mut self, screen: Point) {
        if let Some(bounds) = layout::bounds(&self.model) {
            self.viewport.fit(bounds, screen);
        }
    }

    /// Press at a screen position: a node under the pointer is selected,
    /// otherwise the canvas starts panning.
    pub fn pointer_down(&mut self, screen: Point) -> PointerOutcome {
        let canvas = self.viewport.to_canvas(screen);
        if let Some(id) = layout::hit_test(&self.model, canvas).map(|n| n.id.clone()) {
            self.viewport.pointer_down(screen, PointerTarget::Node);
            self.selection.select(&self.model, &id);
            return PointerOutcome::Selected(id);
        }
        self.viewport.pointer_down(screen, PointerTarget::EmptyCanvas);
        PointerOutcome::Dragging
    }

    pub fn pointer_move(&mut self, screen: Point) {
        self.viewport.pointer_move(screen);
    }

    pub fn pointer_up(&mut self) {
        self.viewport.pointer_up();
    }

    pub fn pointer_leave(&mut self) {
        self.viewport.pointer_leave();
    }

    pub fn edges(&self) -> EdgeSet {
        edges::resolve(&self.model)
    }

    pub fn timeline(&self) -> Vec<YearGroup<'_>> {
        timeline::group_by_year(&self.model)
    }

    /// Describe the current view and hand it to `exporter`.
    pub fn export_view(
        &self,
        format: ExportFormat,
        options: ExportOptions,
        exporter: &dyn Exporter,
    ) -> Result<PathBuf, ExportError> {
        let request = ExportRequest {
            format,
            options,
            snapshot: snapshot::from_model(&self.model),
            viewport: (&self.viewport).into(),
        };
        let path = exporter.export(&request)?;
        info!(format = %format, path = %path.display(), "export request written");
        Ok(path)
    }
}
