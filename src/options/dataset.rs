use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How the demo point dataset is laid out.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum DatasetLayout {
    /// Uniformly random positions, colours drawn from the palette.
    #[default]
    Scatter,
    /// A regular `rows x cols` grid with a positional colour gradient.
    Grid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Dataset", inline)]
#[serde(default)]
/// Parameters for building the point dataset at startup.
pub struct DatasetOptions {
    /// Point layout strategy.
    #[schemars(title = "Layout")]
    pub layout: DatasetLayout,
    /// Number of scattered points.
    #[schemars(title = "Point Count", range(min = 1, max = 16_777_215))]
    pub count: u32,
    /// Fixed RNG seed. A random seed is drawn (and logged) when unset.
    #[schemars(skip)]
    pub seed: Option<u64>,
    /// Grid rows.
    #[schemars(title = "Rows", range(min = 1, max = 4096))]
    pub rows: u32,
    /// Grid columns.
    #[schemars(title = "Columns", range(min = 1, max = 4096))]
    pub cols: u32,
    /// Grid offset in normalized device coordinates.
    #[schemars(skip)]
    pub offset: [f32; 2],
    /// Scatter palette as `#rrggbb` strings. Each point's label is the hex
    /// string of the colour it drew.
    #[schemars(skip)]
    pub palette: Vec<String>,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self {
            layout: DatasetLayout::Scatter,
            count: 100,
            seed: None,
            rows: 10,
            cols: 20,
            offset: [0.0, 0.0],
            palette: ["#160f29", "#246a73", "#368f8b", "#f3dfc1", "#ddbea8"]
                .map(str::to_owned)
                .to_vec(),
        }
    }
}
