//! Edit/preview mode gate.
//!
//! Preview mode renders exactly what an exported screenshot shows: detected
//! nodes keep their identity attributes but carry no interaction handlers.

use serde::{Deserialize, Serialize};
use std::cell::Cell;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditorMode {
    /// Detection active.
    #[default]
    Edit,
    /// Detection bypassed.
    Preview,
}

/// Read side of the mode toggle. The core never owns the toggle itself.
pub trait ModeGate {
    fn is_preview(&self) -> bool;
}

/// Host-owned mode toggle.
#[derive(Debug, Default)]
pub struct ModeSwitch {
    mode: Cell<EditorMode>,
}

impl ModeSwitch {
    pub fn new(mode: EditorMode) -> Self {
        Self {
            mode: Cell::new(mode),
        }
    }

    pub fn set(&self, mode: EditorMode) {
        self.mode.set(mode);
    }

    pub fn get(&self) -> EditorMode {
        self.mode.get()
    }
}

impl ModeGate for ModeSwitch {
    fn is_preview(&self) -> bool {
        self.mode.get() == EditorMode::Preview
    }
}
