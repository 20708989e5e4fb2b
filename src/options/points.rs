use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Points", inline)]
#[serde(default)]
/// Rendered point sprite sizes, in physical pixels.
pub struct PointOptions {
    /// Diameter of a point whose picking flag is clear.
    #[schemars(title = "Point Size", range(min = 1.0, max = 128.0))]
    pub size: f32,
    /// Diameter of a point whose picking flag is set (the hover highlight).
    #[schemars(title = "Highlight Size", range(min = 1.0, max = 256.0))]
    pub highlight_size: f32,
}

impl Default for PointOptions {
    fn default() -> Self {
        Self {
            size: 20.0,
            highlight_size: 40.0,
        }
    }
}

impl PointOptions {
    /// Sprite diameter for a vertex with the given picking flag.
    #[must_use]
    pub fn size_for_flag(&self, flag: f32) -> f32 {
        if flag != 0.0 {
            self.highlight_size
        } else {
            self.size
        }
    }
}
