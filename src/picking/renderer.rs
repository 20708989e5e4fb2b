//! Two-pass point picking.
//!
//! The same dataset is drawn twice: once into an offscreen target with every
//! point coloured by its encoded id, and once into the visible target in its
//! display colours. A query reads the single offscreen pixel under the
//! cursor and decodes it back into a point id.

use super::codec::{decode_pixel, unit_to_byte, NO_HIT};
use super::vertex::{
    display_vertices, fill_highlight_vertices, id_vertices, PointVertex,
};
use crate::error::PickError;
use crate::gpu::surface::{
    BufferId, ProgramId, ProgramSource, RenderSurface, TargetId,
};
use crate::options::PickingOptions;
use crate::scene::Dataset;

/// GPU-side buffers and programs built at initialization.
struct PassResources {
    picking_program: ProgramId,
    display_program: ProgramId,
    id_buffer: BufferId,
    display_buffer: BufferId,
    highlight_buffer: BufferId,
}

/// Owns the offscreen id target and both vertex buffers, and answers
/// "which point is under this pixel?".
pub struct PickingRenderer<S: RenderSurface> {
    surface: S,
    resources: PassResources,
    offscreen: TargetId,
    /// Point ids in draw order, parallel to `display`.
    ids: Vec<u32>,
    display: Vec<PointVertex>,
    /// Scratch for the highlight buffer contents.
    highlight: Vec<PointVertex>,
    clear_color: [f32; 4],
    background: [f32; 4],
    /// Set whenever the offscreen pass no longer reflects the dataset or
    /// the viewport.
    offscreen_stale: bool,
}

impl<S: RenderSurface> PickingRenderer<S> {
    /// Allocate the offscreen target (sized to the surface), compile both
    /// programs and upload the id, display and highlight buffers.
    ///
    /// # Errors
    ///
    /// Returns [`PickError::InvalidOptions`] if the offscreen clear colour
    /// would decode to a point id, and [`PickError::ResourceCreation`] if any
    /// allocation fails. Everything created before a failed allocation is
    /// released and the default target rebound before the error is
    /// returned.
    pub fn initialize(
        mut surface: S,
        dataset: &Dataset,
        options: &PickingOptions,
    ) -> Result<Self, PickError> {
        let clear_id = decode_pixel(options.clear_color.map(unit_to_byte));
        if clear_id != NO_HIT {
            return Err(PickError::InvalidOptions(format!(
                "offscreen clear colour decodes to id {clear_id}, the \
                 background must decode to {NO_HIT}"
            )));
        }

        let (width, height) = surface.size();
        let offscreen = surface.create_target(width, height)?;

        let display = display_vertices(dataset);
        let resources = match build_resources(&mut surface, dataset, &display)
        {
            Ok(resources) => resources,
            Err(e) => {
                log::error!("picking renderer initialization failed: {e}");
                surface.destroy_target(offscreen);
                if surface.bind_target(None).is_err() {
                    log::warn!("could not rebind the default target");
                }
                return Err(e);
            }
        };

        log::debug!(
            "picking renderer ready: {} points, {width}x{height} offscreen \
             target",
            dataset.len()
        );

        Ok(Self {
            surface,
            resources,
            offscreen,
            ids: dataset.records().iter().map(|p| p.id).collect(),
            highlight: Vec::with_capacity(display.len()),
            display,
            clear_color: options.clear_color,
            background: options.background,
            offscreen_stale: true,
        })
    }

    /// The underlying surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the underlying surface.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Viewport size in physical pixels.
    pub fn viewport(&self) -> (u32, u32) {
        self.surface.size()
    }

    /// Number of points drawn per pass.
    pub fn point_count(&self) -> u32 {
        self.ids.len() as u32
    }

    /// Whether the next query will re-render the offscreen pass first.
    pub fn is_offscreen_stale(&self) -> bool {
        self.offscreen_stale
    }

    /// Draw every point into the offscreen target with its id colour.
    ///
    /// The default target is rebound afterwards even if a draw fails.
    pub fn render_offscreen_pass(&mut self) -> Result<(), PickError> {
        self.surface.bind_target(Some(self.offscreen))?;
        let drawn = self.draw_offscreen();
        let unbound = self.surface.bind_target(None);
        drawn.and(unbound)?;
        self.offscreen_stale = false;
        Ok(())
    }

    fn draw_offscreen(&mut self) -> Result<(), PickError> {
        self.surface.clear(self.clear_color)?;
        if self.ids.is_empty() {
            return Ok(());
        }
        self.surface.draw_points(
            self.resources.picking_program,
            self.resources.id_buffer,
            self.point_count(),
        )
    }

    /// Draw every point into the visible target in its display colour.
    ///
    /// With `highlight`, the highlight buffer is rebuilt (picking flag set
    /// only on points with that id) and drawn on top, enlarging the
    /// matching point. The buffer is rebuilt from scratch on every call.
    pub fn render_screen_pass(
        &mut self,
        highlight: Option<u32>,
    ) -> Result<(), PickError> {
        self.surface.bind_target(None)?;
        self.surface.clear(self.background)?;
        if !self.ids.is_empty() {
            self.surface.draw_points(
                self.resources.display_program,
                self.resources.display_buffer,
                self.point_count(),
            )?;
            if let Some(id) = highlight {
                fill_highlight_vertices(
                    &mut self.highlight,
                    &self.display,
                    &self.ids,
                    id,
                );
                self.surface.write_vertex_buffer(
                    self.resources.highlight_buffer,
                    &self.highlight,
                )?;
                self.surface.draw_points(
                    self.resources.display_program,
                    self.resources.highlight_buffer,
                    self.point_count(),
                )?;
            }
        }
        self.surface.finish_frame();
        Ok(())
    }

    /// Id of the point covering pixel `(x, y)`, or `0` for none.
    ///
    /// `(x, y)` is in bottom-left-origin render pixel space. The offscreen
    /// pass is re-rendered first if it is stale; the pixel itself is always
    /// read fresh. Blocks until the transfer completes.
    pub fn query_at(&mut self, x: u32, y: u32) -> Result<u32, PickError> {
        if self.offscreen_stale {
            self.render_offscreen_pass()?;
        }
        self.surface.bind_target(Some(self.offscreen))?;
        let pixel = self.surface.read_pixel(x, y);
        let unbound = self.surface.bind_target(None);
        let pixel = pixel?;
        unbound?;

        let id = decode_pixel(pixel);
        log::trace!("query ({x}, {y}) -> pixel {pixel:?} -> id {id}");
        Ok(id)
    }

    /// Resize the surface and reallocate the offscreen target to match.
    ///
    /// The offscreen pass is marked stale, so the next query re-renders it
    /// at the new size.
    ///
    /// # Errors
    ///
    /// Returns [`PickError::ResourceCreation`] if the new target cannot be
    /// allocated. The surface, the old target and the stale flag are left
    /// untouched.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), PickError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        let target = self.surface.create_target(width, height)?;
        self.surface.resize(width, height);
        self.surface.destroy_target(self.offscreen);
        self.offscreen = target;
        self.offscreen_stale = true;
        log::debug!("offscreen target resized to {width}x{height}");
        Ok(())
    }
}

/// Compile both programs and upload the three buffers, releasing whatever
/// was already created if a later step fails.
fn build_resources<S: RenderSurface>(
    surface: &mut S,
    dataset: &Dataset,
    display: &[PointVertex],
) -> Result<PassResources, PickError> {
    let mut programs = Vec::with_capacity(2);
    let mut buffers = Vec::with_capacity(3);
    let built = try_build_resources(
        surface,
        dataset,
        display,
        &mut programs,
        &mut buffers,
    );
    if built.is_err() {
        for buffer in buffers {
            surface.destroy_vertex_buffer(buffer);
        }
        for program in programs {
            surface.destroy_program(program);
        }
    }
    built
}

fn try_build_resources<S: RenderSurface>(
    surface: &mut S,
    dataset: &Dataset,
    display: &[PointVertex],
    programs: &mut Vec<ProgramId>,
    buffers: &mut Vec<BufferId>,
) -> Result<PassResources, PickError> {
    let picking_program = surface.compile_program(&ProgramSource::PICKING)?;
    programs.push(picking_program);
    let display_program = surface.compile_program(&ProgramSource::DISPLAY)?;
    programs.push(display_program);

    let id_buffer = surface
        .create_vertex_buffer("Point Id Buffer", &id_vertices(dataset))?;
    buffers.push(id_buffer);
    let display_buffer =
        surface.create_vertex_buffer("Point Display Buffer", display)?;
    buffers.push(display_buffer);
    let highlight_buffer =
        surface.create_vertex_buffer("Point Highlight Buffer", display)?;
    buffers.push(highlight_buffer);

    Ok(PassResources {
        picking_program,
        display_program,
        id_buffer,
        display_buffer,
        highlight_buffer,
    })
}
