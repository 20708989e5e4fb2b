//! GPU-based point picking.
//!
//! Renders point ids as colours into an offscreen target and reads back the
//! pixel under the cursor to determine which point is hovered.

pub mod codec;
mod renderer;
mod vertex;

pub use renderer::PickingRenderer;
pub use vertex::{
    display_vertices, fill_highlight_vertices, id_vertices,
    point_vertex_buffer_layout, PointVertex, POINT_DEPTH,
};
