use tracing::debug;

use crate::tree::model::TreeModel;

/// Holds at most one selected node id; drives the detail panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
    }

    /// Replace the selection. Ids missing from `model` leave it untouched.
    ///
    /// Returns whether the selection changed to `id`.
    pub fn select(&mut self, model: &TreeModel, id: &str) -> bool {
        if !model.contains(id) {
            debug!(node = %id, "ignoring selection of unknown node");
            return false;
        }
        self.selected = Some(id.to_string());
        true
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// Drop the selection if it no longer resolves in `model`.
    pub fn retain_in(&mut self, model: &TreeModel) {
        if let Some(id) = &self.selected
            && !model.contains(id)
        {
            self.selected = None;
        }
    }
}
