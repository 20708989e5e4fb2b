use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Picking", inline)]
#[serde(default)]
/// Clear colours for the two render passes.
pub struct PickingOptions {
    /// RGBA clear colour of the offscreen id target. Its RGB must be black
    /// so the background decodes to the no-hit id; the renderer refuses
    /// anything else.
    #[schemars(skip)]
    pub clear_color: [f32; 4],
    /// RGBA clear colour of the visible target.
    #[schemars(skip)]
    pub background: [f32; 4],
}

impl Default for PickingOptions {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            background: [0.0, 0.0, 0.0, 1.0],
        }
    }
}
