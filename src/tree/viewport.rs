//! Pan/zoom state for the tree canvas.
//!
//! The transform is `screen = scale * canvas + pan`. Dragging records the
//! pointer offset from `pan` once on pointer-down and recomputes `pan` from
//! that fixed origin on every move, so the canvas tracks the pointer exactly
//! and zoom events in the middle of a drag cannot skew it.

use crate::tree::layout::Bounds;
use crate::tree::model::Point;

pub const ZOOM_STEP: f32 = 0.1;
pub const MIN_SCALE: f32 = 0.3;
pub const MAX_SCALE: f32 = 2.0;
pub const DEFAULT_SCALE: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    Dragging { origin: Point },
}

/// What sits under the pointer when a button goes down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    EmptyCanvas,
    Node,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    scale: f32,
    pan: Point,
    drag: DragState,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            pan: Point::ORIGIN,
            drag: DragState::Idle,
        }
    }
}

impl Viewport {
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn pan(&self) -> Point {
        self.pan
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    pub fn to_screen(&self, canvas: Point) -> Point {
        self.scale * canvas + self.pan
    }

    pub fn to_canvas(&self, screen: Point) -> Point {
        (1.0 / self.scale) * (screen - self.pan)
    }

    /// Wheel zoom. Positive `delta` zooms in, negative zooms out, zero is ignored.
    pub fn zoom_by_wheel(&mut self, delta: f32) {
        if delta > 0.0 {
            self.zoom_in();
        } else if delta < 0.0 {
            self.zoom_out();
        }
    }

    pub fn zoom_in(&mut self) {
        self.scale = clamp_scale(self.scale + ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.scale = clamp_scale(self.scale - ZOOM_STEP);
    }

    /// Start a drag when the pointer goes down on empty canvas.
    ///
    /// Returns whether a drag started. Presses on a node never pan.
    pub fn pointer_down(&mut self, pointer: Point, target: PointerTarget) -> bool {
        match target {
            PointerTarget::EmptyCanvas => {
                self.drag = DragState::Dragging {
                    origin: pointer - self.pan,
                };
                true
            }
            PointerTarget::Node => false,
        }
    }

    pub fn pointer_move(&mut self, pointer: Point) {
        if let DragState::Dragging { origin } = self.drag {
            self.pan = pointer - origin;
        }
    }

    pub fn pointer_up(&mut self) {
        self.drag = DragState::Idle;
    }

    pub fn pointer_leave(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Restore the default view. Drag state is left alone.
    pub fn reset(&mut self) {
        self.scale = DEFAULT_SCALE;
        self.pan = Point::ORIGIN;
    }

    /// Programmatic view control; the scale is clamped like any zoom.
    pub fn set(&mut self, scale: f32, pan: Point) {
        self.scale = clamp_scale(scale);
        self.pan = pan;
    }

    /// Scale and pan so that `bounds` is centered in a `screen`-sized area.
    pub fn fit(&mut self, bounds: Bounds, screen: Point) {
        let sx = if bounds.width() > 0.0 {
            screen.x / bounds.width()
        } else {
            MAX_SCALE
        };
        let sy = if bounds.height() > 0.0 {
            screen.y / bounds.height()
        } else {
            MAX_SCALE
        };
        let scale = clamp_scale(sx.min(sy));
        let center = bounds.center();
        let screen_center = Point::new(screen.x / 2.0, screen.y / 2.0);
        self.scale = scale;
        self.pan = screen_center - scale * center;
    }
}

fn clamp_scale(scale: f32) -> f32 {
    if scale.is_nan() {
        return DEFAULT_SCALE;
    }
    scale.clamp(MIN_SCALE, MAX_SCALE)
}
