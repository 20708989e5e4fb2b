use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Tooltip", inline)]
#[serde(default)]
/// Hover tooltip placement.
pub struct TooltipOptions {
    /// Offset from the cursor, in canvas pixels.
    #[schemars(title = "Offset")]
    pub offset: [f32; 2],
}

impl Default for TooltipOptions {
    fn default() -> Self {
        Self {
            offset: [10.0, 0.0],
        }
    }
}
