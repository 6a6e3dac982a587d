//! Drag-reorder coordination.
//!
//! Reordering is done by an external sort engine. While it drags, the pointer
//! sweeps across many detected nodes; hover writes during that window would
//! only flicker the highlight, so the wrapper asks [`DragCoordinator`] first.

use std::cell::Cell;

/// Read side of the sort engine's "drag in progress" flag.
pub trait DragCoordinator {
    fn is_dragging(&self) -> bool;
}

/// Flag toggled from the sort engine's start/end callbacks.
#[derive(Debug, Default)]
pub struct DragFlag {
    active: Cell<bool>,
}

impl DragFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self) {
        self.active.set(true);
    }

    pub fn end(&self) {
        self.active.set(false);
    }

    pub fn set(&self, active: bool) {
        self.active.set(active);
    }
}

impl DragCoordinator for DragFlag {
    fn is_dragging(&self) -> bool {
        self.active.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_tracks_gesture() {
        let flag = DragFlag::new();
        assert!(!flag.is_dragging());
        flag.start();
        assert!(flag.is_dragging());
        flag.end();
        assert!(!flag.is_dragging());
    }
}
