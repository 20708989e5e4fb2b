//! The point dataset: records, validation, and demo generators.
//!
//! A [`Dataset`] is built explicitly (from a seed or injected records) and
//! handed to the renderer and the pointer controller; nothing is captured
//! globally.

mod color;
mod dataset;

pub use color::{format_hex_color, parse_hex_color};
pub use dataset::{Dataset, PointRecord};
