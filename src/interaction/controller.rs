//! Pointer-move handling: picking query, record lookup, tooltip and
//! highlight redraw.

use super::tooltip::TooltipPresenter;
use crate::error::PickError;
use crate::gpu::RenderSurface;
use crate::input::{CanvasRect, InputEvent};
use crate::options::TooltipOptions;
use crate::picking::PickingRenderer;
use crate::scene::Dataset;

/// What a pointer event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverOutcome {
    /// The pointer was outside the canvas; nothing was queried or drawn.
    OutsideCanvas,
    /// Background, or an id with no record. The screen was redrawn without
    /// a highlight.
    Miss,
    /// A point was hit, labelled and highlighted.
    Hit {
        /// Id of the hovered point.
        id: u32,
    },
    /// The canvas was resized and redrawn.
    Resized,
}

/// Reacts to pointer movement over the canvas.
///
/// Holds the dataset used to resolve picked ids to labels; every other piece
/// of state lives in the renderer and the tooltip.
pub struct PointerController {
    dataset: Dataset,
    tooltip: TooltipOptions,
}

impl PointerController {
    /// Controller resolving hits against `dataset`.
    #[must_use]
    pub fn new(dataset: Dataset, tooltip: TooltipOptions) -> Self {
        Self { dataset, tooltip }
    }

    /// The dataset hits are resolved against.
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Handle a cursor move to client position `(x, y)` over `canvas`.
    ///
    /// # Errors
    ///
    /// Propagates readback and draw failures from the renderer.
    pub fn handle_pointer_move<S, T>(
        &self,
        renderer: &mut PickingRenderer<S>,
        tooltip: &mut T,
        x: f32,
        y: f32,
        canvas: CanvasRect,
    ) -> Result<HoverOutcome, PickError>
    where
        S: RenderSurface,
        T: TooltipPresenter + ?Sized,
    {
        let Some(local) = canvas.to_local(x, y) else {
            tooltip.hide();
            return Ok(HoverOutcome::OutsideCanvas);
        };

        let (render_x, render_y) = local.to_render(canvas.height);
        let raw_id = renderer.query_at(render_x, render_y)?;

        let Some(record) = self.dataset.resolve(raw_id) else {
            tooltip.hide();
            renderer.render_screen_pass(None)?;
            return Ok(HoverOutcome::Miss);
        };

        log::trace!("hovering point {} ({})", record.id, record.label);
        tooltip.show(local, self.tooltip.offset, &record.label);
        renderer.render_screen_pass(Some(record.id))?;
        Ok(HoverOutcome::Hit { id: record.id })
    }

    /// Dispatch an [`InputEvent`].
    ///
    /// Leaving the window hides the tooltip. A resize reallocates the
    /// renderer's targets and redraws without a highlight.
    ///
    /// # Errors
    ///
    /// Propagates renderer failures.
    pub fn handle_event<S, T>(
        &self,
        renderer: &mut PickingRenderer<S>,
        tooltip: &mut T,
        event: InputEvent,
        canvas: CanvasRect,
    ) -> Result<HoverOutcome, PickError>
    where
        S: RenderSurface,
        T: TooltipPresenter + ?Sized,
    {
        match event {
            InputEvent::CursorMoved { x, y } => {
                self.handle_pointer_move(renderer, tooltip, x, y, canvas)
            }
            InputEvent::CursorLeft => {
                tooltip.hide();
                Ok(HoverOutcome::OutsideCanvas)
            }
            InputEvent::Resized { width, height } => {
                tooltip.hide();
                renderer.resize(width, height)?;
                renderer.render_screen_pass(None)?;
                Ok(HoverOutcome::Resized)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::SoftwareSurface;
    use crate::input::CanvasPoint;
    use crate::options::{PickingOptions, PointOptions};
    use crate::scene::PointRecord;

    #[derive(Default)]
    struct RecordingTooltip {
        shown: Option<(CanvasPoint, [f32; 2], String)>,
        hides: u32,
    }

    impl TooltipPresenter for RecordingTooltip {
        fn show(&mut self, anchor: CanvasPoint, offset: [f32; 2], text: &str) {
            self.shown = Some((anchor, offset, text.to_owned()));
        }

        fn hide(&mut self) {
            self.shown = None;
            self.hides += 1;
        }
    }

    fn record(id: u32, x: f32, y: f32, color: [u8; 3], label: &str) -> PointRecord {
        PointRecord {
            id,
            x,
            y,
            color,
            label: label.to_owned(),
        }
    }

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            record(5, 0.2, 0.3, [255, 0, 0], "red"),
            record(6, -0.5, -0.5, [0, 255, 0], "green"),
        ])
        .unwrap()
    }

    fn renderer(dataset: &Dataset) -> PickingRenderer<SoftwareSurface> {
        PickingRenderer::initialize(
            SoftwareSurface::new(200, 100, PointOptions::default()),
            dataset,
            &PickingOptions::default(),
        )
        .unwrap()
    }

    fn canvas() -> CanvasRect {
        CanvasRect::from_size(200, 100)
    }

    #[test]
    fn hit_shows_label_and_highlights() {
        let data = dataset();
        let mut renderer = renderer(&data);
        let controller = PointerController::new(data, TooltipOptions::default());
        let mut tooltip = RecordingTooltip::default();

        // Render pixel (120, 65) is the centre of point 5.
        let outcome = controller
            .handle_pointer_move(&mut renderer, &mut tooltip, 120.0, 35.0, canvas())
            .unwrap();

        assert_eq!(outcome, HoverOutcome::Hit { id: 5 });
        let (anchor, offset, text) = tooltip.shown.unwrap();
        assert_eq!(anchor, CanvasPoint { x: 120.0, y: 35.0 });
        assert_eq!(offset, [10.0, 0.0]);
        assert_eq!(text, "red");
        // Highlight size reaches 15px right of centre.
        assert_eq!(
            renderer.surface().pixel(None, 135, 65),
            Some([255, 0, 0, 255])
        );
    }

    #[test]
    fn miss_hides_tooltip_and_redraws_plain() {
        let data = dataset();
        let mut renderer = renderer(&data);
        let controller = PointerController::new(data, TooltipOptions::default());
        let mut tooltip = RecordingTooltip::default();

        let _ = controller
            .handle_pointer_move(&mut renderer, &mut tooltip, 120.0, 35.0, canvas())
            .unwrap();
        let outcome = controller
            .handle_pointer_move(&mut renderer, &mut tooltip, 190.0, 5.0, canvas())
            .unwrap();

        assert_eq!(outcome, HoverOutcome::Miss);
        assert!(tooltip.shown.is_none());
        assert_eq!(tooltip.hides, 1);
        assert_eq!(
            renderer.surface().pixel(None, 135, 65),
            Some([0, 0, 0, 255])
        );
    }

    #[test]
    fn edge_is_queried_and_beyond_is_skipped() {
        let data = dataset();
        let mut renderer = renderer(&data);
        let controller = PointerController::new(data, TooltipOptions::default());
        let mut tooltip = RecordingTooltip::default();

        let outcome = controller
            .handle_pointer_move(&mut renderer, &mut tooltip, 200.0, 100.0, canvas())
            .unwrap();
        assert_eq!(outcome, HoverOutcome::Miss);
        assert_eq!(renderer.surface().stats().readbacks, 1);

        let before = renderer.surface().stats();
        let outcome = controller
            .handle_pointer_move(&mut renderer, &mut tooltip, 201.0, 50.0, canvas())
            .unwrap();
        assert_eq!(outcome, HoverOutcome::OutsideCanvas);
        assert_eq!(renderer.surface().stats(), before);
        assert_eq!(tooltip.hides, 2);
    }

    #[test]
    fn ids_without_records_are_misses() {
        let drawn =
            Dataset::from_records(vec![record(9, 0.0, 0.0, [1, 2, 3], "x")])
                .unwrap();
        let mut renderer = renderer(&drawn);
        let controller =
            PointerController::new(dataset(), TooltipOptions::default());
        let mut tooltip = RecordingTooltip::default();

        let outcome = controller
            .handle_pointer_move(&mut renderer, &mut tooltip, 100.0, 50.0, canvas())
            .unwrap();
        assert_eq!(outcome, HoverOutcome::Miss);
        assert!(tooltip.shown.is_none());
    }

    #[test]
    fn offset_canvas_translates_client_coordinates() {
        let data = dataset();
        let mut renderer = renderer(&data);
        let controller = PointerController::new(data, TooltipOptions::default());
        let mut tooltip = RecordingTooltip::default();
        let canvas = CanvasRect {
            left: 30.0,
            top: 40.0,
            width: 200.0,
            height: 100.0,
        };

        let outcome = controller
            .handle_pointer_move(&mut renderer, &mut tooltip, 150.0, 75.0, canvas)
            .unwrap();
        assert_eq!(outcome, HoverOutcome::Hit { id: 5 });
    }

    #[test]
    fn resize_event_redraws_at_new_size() {
        let data = dataset();
        let mut renderer = renderer(&data);
        let controller = PointerController::new(data, TooltipOptions::default());
        let mut tooltip = RecordingTooltip::default();

        let outcome = controller
            .handle_event(
                &mut renderer,
                &mut tooltip,
                InputEvent::Resized { width: 400, height: 200 },
                CanvasRect::from_size(400, 200),
            )
            .unwrap();
        assert_eq!(outcome, HoverOutcome::Resized);
        assert_eq!(renderer.viewport(), (400, 200));

        let outcome = controller
            .handle_event(
                &mut renderer,
                &mut tooltip,
                InputEvent::CursorMoved { x: 240.0, y: 70.0 },
                CanvasRect::from_size(400, 200),
            )
            .unwrap();
        assert_eq!(outcome, HoverOutcome::Hit { id: 5 });
    }
}
