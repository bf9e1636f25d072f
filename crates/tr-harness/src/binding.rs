//! Records drag-capture calls so tests can assert the temporary move/up
//! listeners really are detached when a drag session ends.

use tr_core::surface::{DragBinding, PointerKind};

#[derive(Debug, Default)]
pub struct RecordingBinding {
    /// Every `bind_drag` call, in order.
    pub bound: Vec<PointerKind>,
    /// Number of `unbind_drag` calls.
    pub unbinds: usize,
    active: Option<PointerKind>,
}

impl RecordingBinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// The capture currently in effect, if any.
    pub fn active(&self) -> Option<PointerKind> {
        self.active
    }
}

impl DragBinding for RecordingBinding {
    fn bind_drag(&mut self, kind: PointerKind) {
        self.bound.push(kind);
        self.active = Some(kind);
    }

    fn unbind_drag(&mut self) {
        self.unbinds += 1;
        self.active = None;
    }
}
