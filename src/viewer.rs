//! Standalone picking window backed by winit.
//!
//! Renders the dataset into the window, picks the point under the cursor on
//! every move and shows its label in the window title.
//!
//! ```no_run
//! # use pointpick::Viewer;
//! Viewer::builder()
//!     .with_title("Points")
//!     .build()
//!     .run()
//!     .unwrap();
//! ```

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::{
    error::PickError,
    gpu::{render_context::RenderContext, GpuSurface},
    input::{CanvasPoint, CanvasRect, InputEvent},
    interaction::{tooltip::place, HoverOutcome, PointerController, TooltipPresenter},
    options::Options,
    picking::PickingRenderer,
    scene::Dataset,
};

/// Approximate glyph box used to fit the title tooltip.
const GLYPH_SIZE: [f32; 2] = [7.0, 16.0];

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    options: Option<Options>,
    dataset: Option<Dataset>,
    title: String,
}

impl ViewerBuilder {
    /// Create a builder with sensible defaults (title "pointpick", default
    /// options, generated dataset).
    fn new() -> Self {
        Self {
            options: None,
            dataset: None,
            title: "pointpick".into(),
        }
    }

    /// Override the default options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    /// Show `dataset` instead of generating one from the options.
    #[must_use]
    pub fn with_dataset(mut self, dataset: Dataset) -> Self {
        self.dataset = Some(dataset);
        self
    }

    /// Set the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(self) -> Viewer {
        Viewer {
            options: self.options.unwrap_or_default(),
            dataset: self.dataset,
            title: self.title,
        }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A standalone window that displays a pickable point dataset.
///
/// Construct via [`Viewer::builder`], then call [`run`](Self::run) to
/// enter the event loop.
pub struct Viewer {
    options: Options,
    dataset: Option<Dataset>,
    title: String,
}

impl Viewer {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed.
    ///
    /// # Errors
    ///
    /// Returns [`PickError::InvalidDataset`] if the dataset cannot be
    /// generated, or [`PickError::Viewer`] if the event loop fails.
    pub fn run(self) -> Result<(), PickError> {
        let dataset = match self.dataset {
            Some(dataset) => dataset,
            None => Dataset::generate(&self.options.dataset)?,
        };
        log::info!("showing {} points", dataset.len());

        let event_loop =
            EventLoop::new().map_err(|e| PickError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut app = ViewerApp {
            window: None,
            session: None,
            dataset: Some(dataset),
            options: self.options,
            title: self.title,
        };

        event_loop
            .run_app(&mut app)
            .map_err(|e| PickError::Viewer(e.to_string()))
    }
}

// ── Tooltip ──────────────────────────────────────────────────────────────

/// Presents the hovered label in the window title.
struct TitleTooltip {
    window: Arc<Window>,
    title: String,
    visible: bool,
}

impl TooltipPresenter for TitleTooltip {
    fn show(&mut self, anchor: CanvasPoint, offset: [f32; 2], text: &str) {
        let inner = self.window.inner_size();
        let size = [
            text.chars().count() as f32 * GLYPH_SIZE[0] + 10.0,
            GLYPH_SIZE[1],
        ];
        let [left, top] = place(
            anchor,
            offset,
            size,
            [inner.width as f32, inner.height as f32],
        );
        log::debug!("tooltip {text:?} at ({left}, {top})");
        self.window.set_title(&format!("{} - {text}", self.title));
        self.visible = true;
    }

    fn hide(&mut self) {
        if std::mem::take(&mut self.visible) {
            self.window.set_title(&self.title);
        }
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

/// Everything that exists once the window and GPU are up.
struct Session {
    renderer: PickingRenderer<GpuSurface>,
    controller: PointerController,
    tooltip: TitleTooltip,
    highlight: Option<u32>,
}

/// Internal winit application handler.
struct ViewerApp {
    window: Option<Arc<Window>>,
    session: Option<Session>,
    dataset: Option<Dataset>,
    options: Options,
    title: String,
}

/// The canvas covers the whole window.
fn canvas_of(window: &Window) -> CanvasRect {
    let inner = window.inner_size();
    CanvasRect::from_size(inner.width.max(1), inner.height.max(1))
}

impl ViewerApp {
    fn start_session(
        &mut self,
        window: &Arc<Window>,
    ) -> Result<Session, PickError> {
        let dataset = self
            .dataset
            .take()
            .ok_or_else(|| PickError::Viewer("dataset already consumed".into()))?;
        let inner = window.inner_size();
        let context = pollster::block_on(RenderContext::new(
            window.clone(),
            (inner.width.max(1), inner.height.max(1)),
        ))?;
        let surface = GpuSurface::new(context, self.options.points);
        let mut renderer = PickingRenderer::initialize(
            surface,
            &dataset,
            &self.options.picking,
        )?;
        renderer.render_screen_pass(None)?;

        Ok(Session {
            renderer,
            controller: PointerController::new(dataset, self.options.tooltip),
            tooltip: TitleTooltip {
                window: window.clone(),
                title: self.title.clone(),
                visible: false,
            },
            highlight: None,
        })
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(&self.title)
            .with_inner_size(winit::dpi::LogicalSize::new(800, 600));
        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        match self.start_session(&window) {
            Ok(session) => self.session = Some(session),
            Err(e) => {
                log::error!("Failed to initialize picking: {e}");
                event_loop.exit();
                return;
            }
        }

        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::CloseRequested) {
            event_loop.exit();
            return;
        }

        let (Some(window), Some(session)) = (&self.window, &mut self.session)
        else {
            return;
        };

        if matches!(event, WindowEvent::RedrawRequested) {
            if let Err(e) = session.renderer.render_screen_pass(session.highlight) {
                log::warn!("redraw failed: {e}");
            }
            return;
        }

        let Some(input) = InputEvent::from_window_event(&event) else {
            return;
        };
        let outcome = session.controller.handle_event(
            &mut session.renderer,
            &mut session.tooltip,
            input,
            canvas_of(window),
        );
        match outcome {
            Ok(HoverOutcome::Hit { id }) => session.highlight = Some(id),
            Ok(HoverOutcome::Miss | HoverOutcome::Resized) => {
                session.highlight = None;
            }
            Ok(HoverOutcome::OutsideCanvas) => {}
            Err(e) => log::warn!("pointer event failed: {e}"),
        }
    }
}
