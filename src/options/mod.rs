//! Centralized runtime options with TOML preset support.
//!
//! Dataset generation, point sizes, clear colours and tooltip placement are
//! consolidated here. Options serialize to/from TOML so a sketch can be
//! reproduced from a preset file.

mod dataset;
mod picking;
mod points;
mod tooltip;

use std::path::Path;

pub use dataset::{DatasetLayout, DatasetOptions};
pub use picking::PickingOptions;
pub use points::PointOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use tooltip::TooltipOptions;

use crate::error::PickError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[points]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Point dataset construction.
    pub dataset: DatasetOptions,
    /// Point sprite sizes.
    pub points: PointOptions,
    /// Pass clear colours.
    #[schemars(skip)]
    pub picking: PickingOptions,
    /// Tooltip placement.
    pub tooltip: TooltipOptions,
}

impl Options {
    /// Generate JSON Schema describing the exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, PickError> {
        let content = std::fs::read_to_string(path).map_err(PickError::Io)?;
        toml::from_str(&content)
            .map_err(|e| PickError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), PickError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| PickError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(PickError::Io)?;
        }
        std::fs::write(path, content).map_err(PickError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
[dataset]
layout = "grid"
seed = 7

[points]
highlight_size = 64.0
"#;
        let opts: Options = toml::from_str(toml_str).unwrap();
        assert_eq!(opts.dataset.layout, DatasetLayout::Grid);
        assert_eq!(opts.dataset.seed, Some(7));
        assert_eq!(opts.dataset.count, 100);
        assert_eq!(opts.points.highlight_size, 64.0);
        assert_eq!(opts.points.size, 20.0);
        assert_eq!(opts.tooltip.offset, [10.0, 0.0]);
    }

    #[test]
    fn picking_flag_selects_sprite_size() {
        let points = PointOptions::default();
        assert_eq!(points.size_for_flag(0.0), 20.0);
        assert_eq!(points.size_for_flag(1.0), 40.0);
    }

    #[test]
    fn save_then_load_and_list_presets() {
        let dir = std::env::temp_dir()
            .join(format!("pointpick-presets-{}", std::process::id()));
        let mut opts = Options::default();
        opts.dataset.seed = Some(42);
        opts.points.size = 12.0;
        opts.save(&dir.join("small.toml")).unwrap();

        let loaded = Options::load(&dir.join("small.toml")).unwrap();
        assert_eq!(loaded, opts);
        assert_eq!(Options::list_presets(&dir), vec!["small".to_owned()]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_reports_parse_errors() {
        let dir = std::env::temp_dir()
            .join(format!("pointpick-bad-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.toml");
        std::fs::write(&path, "[points]\nsize = \"big\"\n").unwrap();

        let err = Options::load(&path).unwrap_err();
        assert!(matches!(err, PickError::OptionsParse(_)));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(Options::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();

        assert!(props.contains_key("dataset"));
        assert!(props.contains_key("points"));
        assert!(props.contains_key("tooltip"));
        assert!(!props.contains_key("picking"));

        let dataset = &props["dataset"]["properties"];
        assert!(dataset.get("count").is_some());
        assert!(dataset.get("palette").is_none());
    }
}
