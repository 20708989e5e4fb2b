//! The render-surface capability interface.
//!
//! The picking renderer never talks to a graphics API directly. Everything
//! it needs (offscreen targets, vertex buffers, programs, point draws and a
//! single-pixel readback) goes through [`RenderSurface`], so the same
//! picking logic runs on the wgpu backend and on the CPU
//! [`SoftwareSurface`](super::software::SoftwareSurface).
//!
//! Pixel coordinates are bottom-left origin: `(0, 0)` is the lower-left
//! pixel of the bound target.

use crate::error::PickError;
use crate::picking::PointVertex;

/// Handle to an offscreen colour + depth target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetId(pub(crate) usize);

/// Handle to a vertex buffer of [`PointVertex`] instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub(crate) usize);

/// Handle to a compiled shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramId(pub(crate) usize);

/// What a program's fragment output means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramKind {
    /// Writes exact id-encoded colours; must not blend or interpolate.
    Picking,
    /// Writes display colours.
    Display,
}

/// WGSL source for one program (vertex + fragment entry points in a single
/// module).
#[derive(Debug, Clone, Copy)]
pub struct ProgramSource {
    /// Debug label.
    pub label: &'static str,
    /// Output semantics.
    pub kind: ProgramKind,
    /// WGSL source with `vs_main` and `fs_main` entry points.
    pub wgsl: &'static str,
}

impl ProgramSource {
    /// The id-colour program used by the offscreen pass.
    pub const PICKING: Self = Self {
        label: "Picking Points Shader",
        kind: ProgramKind::Picking,
        wgsl: include_str!("../../assets/shaders/picking.wgsl"),
    };

    /// The display-colour program used by the visible pass.
    pub const DISPLAY: Self = Self {
        label: "Display Points Shader",
        kind: ProgramKind::Display,
        wgsl: include_str!("../../assets/shaders/points.wgsl"),
    };
}

/// Minimal drawing capabilities needed by the picking pipeline.
///
/// Implementations keep a "currently bound" target: `None` is the default
/// (visible) target, `Some` an offscreen one. `clear`, `draw_points` and
/// `read_pixel` act on whatever is bound.
pub trait RenderSurface {
    /// Size of the default target in physical pixels.
    fn size(&self) -> (u32, u32);

    /// Resize the default target. Zero-sized dimensions are ignored.
    fn resize(&mut self, width: u32, height: u32);

    /// Allocate an offscreen colour + depth target.
    ///
    /// # Errors
    ///
    /// Returns [`PickError::ResourceCreation`] when the target cannot be
    /// allocated (zero-sized or larger than the backend allows).
    fn create_target(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<TargetId, PickError>;

    /// Release an offscreen target. Unbinds it first if it is bound.
    fn destroy_target(&mut self, target: TargetId);

    /// Bind an offscreen target, or the default target with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`PickError::UnknownHandle`] for a destroyed target.
    fn bind_target(&mut self, target: Option<TargetId>)
        -> Result<(), PickError>;

    /// The currently bound target.
    fn bound_target(&self) -> Option<TargetId>;

    /// Upload vertices into a new buffer.
    ///
    /// # Errors
    ///
    /// Returns [`PickError::ResourceCreation`] if the buffer cannot be
    /// allocated.
    fn create_vertex_buffer(
        &mut self,
        label: &str,
        vertices: &[PointVertex],
    ) -> Result<BufferId, PickError>;

    /// Replace a buffer's contents, growing it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`PickError::UnknownHandle`] for an unknown buffer.
    fn write_vertex_buffer(
        &mut self,
        buffer: BufferId,
        vertices: &[PointVertex],
    ) -> Result<(), PickError>;

    /// Release a vertex buffer. Unknown handles are ignored.
    fn destroy_vertex_buffer(&mut self, buffer: BufferId);

    /// Compile and link a program.
    ///
    /// # Errors
    ///
    /// Returns [`PickError::ResourceCreation`] if compilation fails.
    fn compile_program(
        &mut self,
        source: &ProgramSource,
    ) -> Result<ProgramId, PickError>;

    /// Release a program and its pipelines. Unknown handles are ignored.
    fn destroy_program(&mut self, program: ProgramId);

    /// Clear the bound target's colour (and depth) to `color`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bound target is no longer available.
    fn clear(&mut self, color: [f32; 4]) -> Result<(), PickError>;

    /// Draw the first `count` points of `buffer` as sprites with `program`.
    ///
    /// # Errors
    ///
    /// Returns [`PickError::UnknownHandle`] for unknown handles.
    fn draw_points(
        &mut self,
        program: ProgramId,
        buffer: BufferId,
        count: u32,
    ) -> Result<(), PickError>;

    /// Read one RGBA pixel from the bound target, blocking until the
    /// transfer completes. Pixels outside the target read as `[0; 4]`.
    ///
    /// # Errors
    ///
    /// Returns [`PickError::Readback`] if the transfer fails.
    fn read_pixel(&mut self, x: u32, y: u32) -> Result<[u8; 4], PickError>;

    /// Present whatever was drawn to the default target. A no-op for
    /// surfaces without presentation.
    fn finish_frame(&mut self) {}
}

impl<S: RenderSurface + ?Sized> RenderSurface for &mut S {
    fn size(&self) -> (u32, u32) {
        (**self).size()
    }

    fn resize(&mut self, width: u32, height: u32) {
        (**self).resize(width, height);
    }

    fn create_target(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<TargetId, PickError> {
        (**self).create_target(width, height)
    }

    fn destroy_target(&mut self, target: TargetId) {
        (**self).destroy_target(target);
    }

    fn bind_target(
        &mut self,
        target: Option<TargetId>,
    ) -> Result<(), PickError> {
        (**self).bind_target(target)
    }

    fn bound_target(&self) -> Option<TargetId> {
        (**self).bound_target()
    }

    fn create_vertex_buffer(
        &mut self,
        label: &str,
        vertices: &[PointVertex],
    ) -> Result<BufferId, PickError> {
        (**self).create_vertex_buffer(label, vertices)
    }

    fn write_vertex_buffer(
        &mut self,
        buffer: BufferId,
        vertices: &[PointVertex],
    ) -> Result<(), PickError> {
        (**self).write_vertex_buffer(buffer, vertices)
    }

    fn destroy_vertex_buffer(&mut self, buffer: BufferId) {
        (**self).destroy_vertex_buffer(buffer);
    }

    fn compile_program(
        &mut self,
        source: &ProgramSource,
    ) -> Result<ProgramId, PickError> {
        (**self).compile_program(source)
    }

    fn destroy_program(&mut self, program: ProgramId) {
        (**self).destroy_program(program);
    }

    fn clear(&mut self, color: [f32; 4]) -> Result<(), PickError> {
        (**self).clear(color)
    }

    fn draw_points(
        &mut self,
        program: ProgramId,
        buffer: BufferId,
        count: u32,
    ) -> Result<(), PickError> {
        (**self).draw_points(program, buffer, count)
    }

    fn read_pixel(&mut self, x: u32, y: u32) -> Result<[u8; 4], PickError> {
        (**self).read_pixel(x, y)
    }

    fn finish_frame(&mut self) {
        (**self).finish_frame();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(source: &ProgramSource) -> naga::Module {
        let module = naga::front::wgsl::parse_str(source.wgsl)
            .unwrap_or_else(|e| {
                panic!("{}: {}", source.label, e.emit_to_string(source.wgsl))
            });
        let _ = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .unwrap();
        module
    }

    #[test]
    fn shaders_validate_with_both_entry_points() {
        for source in [ProgramSource::PICKING, ProgramSource::DISPLAY] {
            let module = validate(&source);
            let mut names: Vec<_> =
                module.entry_points.iter().map(|e| e.name.as_str()).collect();
            names.sort_unstable();
            assert_eq!(names, ["fs_main", "vs_main"], "{}", source.label);
        }
    }

    #[test]
    fn shaders_read_the_point_vertex_layout() {
        for source in [ProgramSource::PICKING, ProgramSource::DISPLAY] {
            let module = validate(&source);
            let vs = module
                .entry_points
                .iter()
                .find(|e| e.name == "vs_main")
                .unwrap();
            // vertex_index plus the PointInput struct.
            assert_eq!(vs.function.arguments.len(), 2, "{}", source.label);
        }
    }
}
