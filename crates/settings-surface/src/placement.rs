use serde::{Deserialize, Serialize};

/// Fixed screen anchor of the embedded surface.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayPlacement {
    pub top: u32,
    pub right: u32,
    pub width: u32,
    pub z_index: u32,
}

impl Default for OverlayPlacement {
    fn default() -> Self {
        Self {
            top: 100,
            right: 20,
            width: 300,
            z_index: 9999,
        }
    }
}

impl OverlayPlacement {
    pub fn style(&self) -> String {
        format!(
            "position: fixed; top: {}px; right: {}px; z-index: {}; width: {}px; height: auto; border: none",
            self.top, self.right, self.z_index, self.width
        )
    }
}
