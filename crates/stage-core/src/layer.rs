//! Layer definition

use serde::{Deserialize, Serialize};

/// A named group of instances sharing visibility and lock state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    pub visible: bool,
    pub locked: bool,
}

impl Layer {
    /// Create a visible, unlocked layer.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            locked: false,
        }
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }
}

impl Default for Layer {
    /// The unnamed base layer.
    fn default() -> Self {
        Self::new("")
    }
}
