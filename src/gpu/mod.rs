//! Render surfaces: the capability interface the picking renderer draws
//! through, a CPU rasterizer and the wgpu backend.

/// Growable GPU vertex buffers.
pub mod dynamic_buffer;
/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// CPU rasterizer implementing [`RenderSurface`].
pub mod software;
/// The render-surface capability trait and its handles.
pub mod surface;
/// Colour + depth render-target textures.
pub mod texture;
/// wgpu implementation of [`RenderSurface`].
pub mod wgpu_surface;

pub use software::{SoftwareSurface, SurfaceStats};
pub use surface::{
    BufferId, ProgramId, ProgramKind, ProgramSource, RenderSurface, TargetId,
};
pub use wgpu_surface::GpuSurface;
