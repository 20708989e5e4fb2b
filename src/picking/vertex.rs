//! Per-point vertex layout shared by the picking and display passes.

use super::codec::{color_to_unit, encode_id_to_color};
use crate::scene::Dataset;

/// Depth every point is drawn at, in normalized device coordinates.
pub const POINT_DEPTH: f32 = -1.0;

/// One point as seen by the vertex shader.
///
/// The picking and display passes share this layout and differ only in what
/// `color` carries: the id-encoded colour or the true display colour.
/// `picking` is the per-point flag that switches the sprite to its
/// highlight size; it has no other meaning.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointVertex {
    /// `(x, y, z)` in normalized device coordinates.
    pub position: [f32; 3],
    /// RGB in `[0, 1]`.
    pub color: [f32; 3],
    /// `1.0` draws the point at highlight size, `0.0` at normal size.
    pub picking: f32,
}

impl PointVertex {
    /// Number of `f32` components per vertex.
    pub const FLOATS: usize = 7;

    /// Build a vertex at `(x, y, POINT_DEPTH)` with a byte colour.
    #[must_use]
    pub fn new(x: f32, y: f32, color: [u8; 3], picking: f32) -> Self {
        Self {
            position: [x, y, POINT_DEPTH],
            color: color_to_unit(color),
            picking,
        }
    }
}

/// Instance-rate layout for [`PointVertex`]; each point is expanded into a
/// sprite quad by the vertex shader.
pub fn point_vertex_buffer_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: size_of::<PointVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &[
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: 0,
                shader_location: 0,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: 12,
                shader_location: 1,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32,
                offset: 24,
                shader_location: 2,
            },
        ],
    }
}

/// Vertices for the offscreen pass: every point coloured by its encoded id.
#[must_use]
pub fn id_vertices(dataset: &Dataset) -> Vec<PointVertex> {
    dataset
        .records()
        .iter()
        .map(|p| PointVertex::new(p.x, p.y, encode_id_to_color(p.id), 0.0))
        .collect()
}

/// Vertices for the visible pass: every point in its display colour.
#[must_use]
pub fn display_vertices(dataset: &Dataset) -> Vec<PointVertex> {
    dataset
        .records()
        .iter()
        .map(|p| PointVertex::new(p.x, p.y, p.color, 0.0))
        .collect()
}

/// Rebuild `out` as a copy of `display` whose picking flag is `1.0` exactly
/// for the points whose id equals `highlight`.
///
/// `out` is cleared first, so repeated calls with the same inputs leave it
/// in the same state.
pub fn fill_highlight_vertices(
    out: &mut Vec<PointVertex>,
    display: &[PointVertex],
    ids: &[u32],
    highlight: u32,
) {
    out.clear();
    out.extend(display.iter().zip(ids).map(|(vertex, &id)| PointVertex {
        picking: if id == highlight { 1.0 } else { 0.0 },
        ..*vertex
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::PointRecord;

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            PointRecord {
                id: 5,
                x: 0.2,
                y: 0.3,
                color: [255, 0, 0],
                label: "red".to_owned(),
            },
            PointRecord {
                id: 70_000,
                x: -0.5,
                y: 0.5,
                color: [0, 0, 255],
                label: "blue".to_owned(),
            },
        ])
        .unwrap()
    }

    #[test]
    fn layout_is_seven_floats() {
        assert_eq!(size_of::<PointVertex>(), PointVertex::FLOATS * 4);
        let layout = point_vertex_buffer_layout();
        assert_eq!(layout.array_stride, 28);
        assert_eq!(layout.attributes.len(), 3);
    }

    #[test]
    fn id_vertices_carry_encoded_ids() {
        let vertices = id_vertices(&dataset());
        assert_eq!(vertices[0].position, [0.2, 0.3, POINT_DEPTH]);
        assert_eq!(vertices[0].color, [0.0, 0.0, 5.0 / 255.0]);
        assert_eq!(vertices[0].picking, 0.0);
        // 70_000 = 0x01_11_70
        assert_eq!(
            vertices[1].color,
            [1.0 / 255.0, 17.0 / 255.0, 112.0 / 255.0]
        );
    }

    #[test]
    fn display_vertices_carry_true_colors() {
        let vertices = display_vertices(&dataset());
        assert_eq!(vertices[0].color, [1.0, 0.0, 0.0]);
        assert_eq!(vertices[1].color, [0.0, 0.0, 1.0]);
        assert!(vertices.iter().all(|v| v.picking == 0.0));
    }

    #[test]
    fn highlight_flags_only_matching_ids() {
        let data = dataset();
        let display = display_vertices(&data);
        let ids: Vec<u32> = data.records().iter().map(|p| p.id).collect();
        let mut out = Vec::new();

        fill_highlight_vertices(&mut out, &display, &ids, 70_000);
        assert_eq!(out[0].picking, 0.0);
        assert_eq!(out[1].picking, 1.0);
        assert_eq!(out[1].color, display[1].color);

        let first = out.clone();
        fill_highlight_vertices(&mut out, &display, &ids, 70_000);
        assert_eq!(out, first);
    }
}
