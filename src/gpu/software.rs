//! CPU implementation of [`RenderSurface`].
//!
//! Rasterizes point sprites exactly the way the WGSL programs do: a pixel is
//! covered when its centre lies strictly inside the sprite's circle, depth is
//! tested with less-or-equal so later points win ties, and colours are
//! quantized to bytes as an `Rgba8Unorm` target would. Deterministic and
//! GPU-free, which is what the picking tests run against.

use glam::Vec2;

use super::surface::{
    BufferId, ProgramId, ProgramKind, ProgramSource, RenderSurface, TargetId,
};
use crate::error::PickError;
use crate::options::PointOptions;
use crate::picking::codec::unit_to_byte;
use crate::picking::PointVertex;

/// Default cap on target dimensions, matching wgpu's default
/// `max_texture_dimension_2d`.
const DEFAULT_MAX_DIMENSION: u32 = 8192;

/// Counters for the operations a surface has performed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceStats {
    /// `clear` calls.
    pub clears: u32,
    /// `draw_points` calls.
    pub draws: u32,
    /// `read_pixel` calls.
    pub readbacks: u32,
    /// `finish_frame` calls.
    pub frames: u32,
}

/// A colour + depth framebuffer, row 0 at the bottom.
#[derive(Debug, Clone)]
struct Framebuffer {
    width: u32,
    height: u32,
    color: Vec<[u8; 4]>,
    depth: Vec<f32>,
}

impl Framebuffer {
    fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            color: vec![[0; 4]; len],
            depth: vec![1.0; len],
        }
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.color.fill(color.map(unit_to_byte));
        self.depth.fill(1.0);
    }

    fn draw_sprite(&mut self, vertex: &PointVertex, size: f32) {
        let [x, y, z] = vertex.position;
        let extent = Vec2::new(self.width as f32, self.height as f32);
        let center = (Vec2::new(x, y) + Vec2::ONE) * 0.5 * extent;
        let radius = size * 0.5;
        let depth = z * 0.5 + 0.5;
        let [r, g, b] = vertex.color.map(unit_to_byte);

        let min = (center - radius).floor().max(Vec2::ZERO);
        let max = (center + radius).ceil().max(Vec2::ZERO).min(extent);

        for py in min.y as u32..max.y as u32 {
            for px in min.x as u32..max.x as u32 {
                let pixel = Vec2::new(px as f32 + 0.5, py as f32 + 0.5);
                if pixel.distance(center) >= radius {
                    continue;
                }
                let Some(i) = self.index(px, py) else {
                    continue;
                };
                if depth <= self.depth[i] {
                    self.depth[i] = depth;
                    self.color[i] = [r, g, b, 255];
                }
            }
        }
    }
}

/// Software render surface.
#[derive(Debug, Clone)]
pub struct SoftwareSurface {
    screen: Framebuffer,
    targets: Vec<Option<Framebuffer>>,
    buffers: Vec<Option<Vec<PointVertex>>>,
    programs: Vec<Option<ProgramKind>>,
    bound: Option<TargetId>,
    points: PointOptions,
    max_dimension: u32,
    max_buffer_points: usize,
    stats: SurfaceStats,
}

impl SoftwareSurface {
    /// Create a surface whose default target is `width x height`.
    #[must_use]
    pub fn new(width: u32, height: u32, points: PointOptions) -> Self {
        Self {
            screen: Framebuffer::new(width, height),
            targets: Vec::new(),
            buffers: Vec::new(),
            programs: Vec::new(),
            bound: None,
            points,
            max_dimension: DEFAULT_MAX_DIMENSION,
            max_buffer_points: usize::MAX,
            stats: SurfaceStats::default(),
        }
    }

    /// Refuse offscreen targets larger than `max` on either axis.
    #[must_use]
    pub fn with_max_dimension(mut self, max: u32) -> Self {
        self.max_dimension = max;
        self
    }

    /// Refuse vertex buffers holding more than `max` points.
    #[must_use]
    pub fn with_max_buffer_points(mut self, max: usize) -> Self {
        self.max_buffer_points = max;
        self
    }

    /// Operation counters.
    #[must_use]
    pub fn stats(&self) -> SurfaceStats {
        self.stats
    }

    /// Inspect a pixel without binding or counting a readback.
    #[must_use]
    pub fn pixel(
        &self,
        target: Option<TargetId>,
        x: u32,
        y: u32,
    ) -> Option<[u8; 4]> {
        let fb = match target {
            None => Some(&self.screen),
            Some(TargetId(i)) => self.targets.get(i).and_then(Option::as_ref),
        }?;
        fb.index(x, y).map(|i| fb.color[i])
    }

    /// Current contents of a vertex buffer.
    #[must_use]
    pub fn buffer_contents(&self, buffer: BufferId) -> Option<&[PointVertex]> {
        self.buffers.get(buffer.0).and_then(Option::as_deref)
    }

    /// Number of live offscreen targets.
    #[must_use]
    pub fn live_targets(&self) -> usize {
        self.targets.iter().flatten().count()
    }

    /// Number of live vertex buffers.
    #[must_use]
    pub fn live_buffers(&self) -> usize {
        self.buffers.iter().flatten().count()
    }

    /// Number of live programs.
    #[must_use]
    pub fn live_programs(&self) -> usize {
        self.programs.iter().flatten().count()
    }

    fn bound_framebuffer(&mut self) -> Result<&mut Framebuffer, PickError> {
        match self.bound {
            None => Ok(&mut self.screen),
            Some(TargetId(i)) => self
                .targets
                .get_mut(i)
                .and_then(Option::as_mut)
                .ok_or(PickError::UnknownHandle("target")),
        }
    }
}

impl RenderSurface for SoftwareSurface {
    fn size(&self) -> (u32, u32) {
        (self.screen.width, self.screen.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.screen = Framebuffer::new(width, height);
        }
    }

    fn create_target(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<TargetId, PickError> {
        if width == 0 || height == 0 {
            return Err(PickError::resource(
                "offscreen target",
                format!("zero-sized target {width}x{height}"),
            ));
        }
        if width > self.max_dimension || height > self.max_dimension {
            return Err(PickError::resource(
                "offscreen target",
                format!(
                    "{width}x{height} exceeds the {} pixel limit",
                    self.max_dimension
                ),
            ));
        }
        self.targets.push(Some(Framebuffer::new(width, height)));
        Ok(TargetId(self.targets.len() - 1))
    }

    fn destroy_target(&mut self, target: TargetId) {
        if self.bound == Some(target) {
            self.bound = None;
        }
        if let Some(slot) = self.targets.get_mut(target.0) {
            *slot = None;
        }
    }

    fn bind_target(
        &mut self,
        target: Option<TargetId>,
    ) -> Result<(), PickError> {
        if let Some(TargetId(i)) = target {
            if !matches!(self.targets.get(i), Some(Some(_))) {
                return Err(PickError::UnknownHandle("target"));
            }
        }
        self.bound = target;
        Ok(())
    }

    fn bound_target(&self) -> Option<TargetId> {
        self.bound
    }

    fn create_vertex_buffer(
        &mut self,
        label: &str,
        vertices: &[PointVertex],
    ) -> Result<BufferId, PickError> {
        if vertices.len() > self.max_buffer_points {
            return Err(PickError::resource(
                "vertex buffer",
                format!(
                    "{label}: {} points exceed the {} point limit",
                    vertices.len(),
                    self.max_buffer_points
                ),
            ));
        }
        self.buffers.push(Some(vertices.to_vec()));
        Ok(BufferId(self.buffers.len() - 1))
    }

    fn write_vertex_buffer(
        &mut self,
        buffer: BufferId,
        vertices: &[PointVertex],
    ) -> Result<(), PickError> {
        if vertices.len() > self.max_buffer_points {
            return Err(PickError::resource(
                "vertex buffer",
                "write exceeds the point limit",
            ));
        }
        let contents = self
            .buffers
            .get_mut(buffer.0)
            .and_then(Option::as_mut)
            .ok_or(PickError::UnknownHandle("buffer"))?;
        contents.clear();
        contents.extend_from_slice(vertices);
        Ok(())
    }

    fn destroy_vertex_buffer(&mut self, buffer: BufferId) {
        if let Some(slot) = self.buffers.get_mut(buffer.0) {
            *slot = None;
        }
    }

    fn compile_program(
        &mut self,
        source: &ProgramSource,
    ) -> Result<ProgramId, PickError> {
        let has_entry = |name: &str| source.wgsl.contains(name);
        if !has_entry("fn vs_main") || !has_entry("fn fs_main") {
            return Err(PickError::resource(
                "shader program",
                format!("{} is missing vs_main/fs_main", source.label),
            ));
        }
        self.programs.push(Some(source.kind));
        Ok(ProgramId(self.programs.len() - 1))
    }

    fn destroy_program(&mut self, program: ProgramId) {
        if let Some(slot) = self.programs.get_mut(program.0) {
            *slot = None;
        }
    }

    fn clear(&mut self, color: [f32; 4]) -> Result<(), PickError> {
        self.bound_framebuffer()?.clear(color);
        self.stats.clears += 1;
        Ok(())
    }

    fn draw_points(
        &mut self,
        program: ProgramId,
        buffer: BufferId,
        count: u32,
    ) -> Result<(), PickError> {
        if !matches!(self.programs.get(program.0), Some(Some(_))) {
            return Err(PickError::UnknownHandle("program"));
        }
        let vertices = self
            .buffers
            .get(buffer.0)
            .and_then(Option::as_ref)
            .ok_or(PickError::UnknownHandle("buffer"))?
            .clone();
        let points = self.points;
        let fb = self.bound_framebuffer()?;
        for vertex in vertices.iter().take(count as usize) {
            fb.draw_sprite(vertex, points.size_for_flag(vertex.picking));
        }
        self.stats.draws += 1;
        Ok(())
    }

    fn read_pixel(&mut self, x: u32, y: u32) -> Result<[u8; 4], PickError> {
        self.stats.readbacks += 1;
        let fb = self.bound_framebuffer()?;
        Ok(fb.index(x, y).map_or([0; 4], |i| fb.color[i]))
    }

    fn finish_frame(&mut self) {
        self.stats.frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> SoftwareSurface {
        SoftwareSurface::new(100, 100, PointOptions::default())
    }

    #[test]
    fn sprite_covers_a_disc_around_its_centre() {
        let mut s = surface();
        let program = s.compile_program(&ProgramSource::DISPLAY).unwrap();
        let vertex = PointVertex::new(0.0, 0.0, [255, 0, 0], 0.0);
        let buffer = s.create_vertex_buffer("one", &[vertex]).unwrap();
        s.clear([0.0, 0.0, 0.0, 1.0]).unwrap();
        s.draw_points(program, buffer, 1).unwrap();

        // Centre at (50, 50), radius 10.
        assert_eq!(s.pixel(None, 50, 50), Some([255, 0, 0, 255]));
        assert_eq!(s.pixel(None, 59, 50), Some([255, 0, 0, 255]));
        assert_eq!(s.pixel(None, 60, 50), Some([0, 0, 0, 255]));
        assert_eq!(s.pixel(None, 58, 58), Some([0, 0, 0, 255]));
    }

    #[test]
    fn picking_flag_enlarges_sprite() {
        let mut s = surface();
        let program = s.compile_program(&ProgramSource::DISPLAY).unwrap();
        let vertex = PointVertex::new(0.0, 0.0, [0, 255, 0], 1.0);
        let buffer = s.create_vertex_buffer("one", &[vertex]).unwrap();
        s.draw_points(program, buffer, 1).unwrap();
        assert_eq!(s.pixel(None, 69, 50), Some([0, 255, 0, 255]));
        assert_eq!(s.pixel(None, 70, 50), Some([0, 0, 0, 0]));
    }

    #[test]
    fn later_points_win_depth_ties() {
        let mut s = surface();
        let program = s.compile_program(&ProgramSource::PICKING).unwrap();
        let buffer = s
            .create_vertex_buffer(
                "two",
                &[
                    PointVertex::new(0.0, 0.0, [0, 0, 1], 0.0),
                    PointVertex::new(0.0, 0.0, [0, 0, 2], 0.0),
                ],
            )
            .unwrap();
        s.draw_points(program, buffer, 2).unwrap();
        assert_eq!(s.pixel(None, 50, 50), Some([0, 0, 2, 255]));
    }

    #[test]
    fn offscreen_targets_are_isolated_from_the_screen() {
        let mut s = surface();
        let target = s.create_target(100, 100).unwrap();
        s.bind_target(Some(target)).unwrap();
        s.clear([1.0, 1.0, 1.0, 1.0]).unwrap();
        assert_eq!(s.read_pixel(3, 3).unwrap(), [255; 4]);
        s.bind_target(None).unwrap();
        assert_eq!(s.read_pixel(3, 3).unwrap(), [0; 4]);
    }

    #[test]
    fn out_of_range_reads_are_transparent_black() {
        let mut s = surface();
        s.clear([1.0, 1.0, 1.0, 1.0]).unwrap();
        assert_eq!(s.read_pixel(100, 0).unwrap(), [0; 4]);
        assert_eq!(s.read_pixel(0, 100).unwrap(), [0; 4]);
    }

    #[test]
    fn target_limits_are_enforced() {
        let mut s = surface().with_max_dimension(64);
        assert!(matches!(
            s.create_target(100, 10),
            Err(PickError::ResourceCreation { .. })
        ));
        assert!(s.create_target(0, 10).is_err());
        assert!(s.create_target(64, 64).is_ok());
    }

    #[test]
    fn destroying_a_bound_target_rebinds_default() {
        let mut s = surface();
        let target = s.create_target(10, 10).unwrap();
        s.bind_target(Some(target)).unwrap();
        s.destroy_target(target);
        assert_eq!(s.bound_target(), None);
        assert_eq!(s.live_targets(), 0);
        assert!(s.bind_target(Some(target)).is_err());
    }

    #[test]
    fn destroyed_buffers_and_programs_are_released() {
        let mut s = surface();
        let program = s.compile_program(&ProgramSource::DISPLAY).unwrap();
        let vertex = PointVertex::new(0.0, 0.0, [255, 0, 0], 0.0);
        let buffer = s.create_vertex_buffer("one", &[vertex]).unwrap();
        assert_eq!((s.live_buffers(), s.live_programs()), (1, 1));

        s.destroy_vertex_buffer(buffer);
        assert!(s.draw_points(program, buffer, 1).is_err());
        assert!(s.write_vertex_buffer(buffer, &[vertex]).is_err());
        assert_eq!(s.buffer_contents(buffer), None);

        s.destroy_program(program);
        assert_eq!((s.live_buffers(), s.live_programs()), (0, 0));
    }

    #[test]
    fn rejects_sources_without_entry_points() {
        let mut s = surface();
        let broken = ProgramSource {
            wgsl: "@vertex fn main() {}",
            ..ProgramSource::DISPLAY
        };
        assert!(s.compile_program(&broken).is_err());
    }
}
