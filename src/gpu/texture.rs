//! Render-target textures.

/// Format of every offscreen colour target. 8 bits per channel, unorm, so
/// id-encoded colours round-trip exactly.
pub const OFFSCREEN_FORMAT: wgpu::TextureFormat =
    wgpu::TextureFormat::Rgba8Unorm;

/// Depth format shared by all point passes.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// A depth texture view sized to a colour target.
pub struct DepthTarget {
    /// The underlying GPU texture.
    pub texture: wgpu::Texture,
    /// A default full-texture view.
    pub view: wgpu::TextureView,
}

impl DepthTarget {
    /// Create a depth texture of the given size.
    #[must_use]
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Point Depth Texture"),
            size: extent(width, height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// A colour + depth render target that can be copied out of.
///
/// The colour texture is created with `RENDER_ATTACHMENT | COPY_SRC` so a
/// single pixel can be read back after drawing.
pub struct RenderTarget {
    /// The colour texture.
    pub texture: wgpu::Texture,
    /// A default full-texture view of `texture`.
    pub view: wgpu::TextureView,
    /// Matching depth attachment.
    pub depth: DepthTarget,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl RenderTarget {
    /// Create a new render target with the given dimensions and format.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent(width, height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            depth: DepthTarget::new(device, width, height),
            width,
            height,
        }
    }

    /// Colour format of the target.
    pub fn format(&self) -> wgpu::TextureFormat {
        self.texture.format()
    }
}

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}
