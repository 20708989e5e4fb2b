/// Platform-agnostic input events.
///
/// These are fed into a
/// [`PointerController`](crate::interaction::PointerController) together
/// with the [`CanvasRect`](super::CanvasRect) the pointer moves over.
///
/// # Example
///
/// ```ignore
/// let outcome = controller.handle_event(
///     &mut renderer,
///     &mut tooltip,
///     InputEvent::CursorMoved { x: 100.0, y: 200.0 },
///     canvas,
/// )?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Cursor moved to an absolute client position.
    CursorMoved {
        /// Horizontal position in physical pixels.
        x: f32,
        /// Vertical position in physical pixels.
        y: f32,
    },
    /// Cursor left the window.
    CursorLeft,
    /// The canvas was resized.
    Resized {
        /// New width in physical pixels.
        width: u32,
        /// New height in physical pixels.
        height: u32,
    },
}

#[cfg(feature = "viewer")]
impl InputEvent {
    /// Translate the winit events the viewer cares about.
    pub fn from_window_event(event: &winit::event::WindowEvent) -> Option<Self> {
        use winit::event::WindowEvent;
        match event {
            WindowEvent::CursorMoved { position, .. } => Some(Self::CursorMoved {
                x: position.x as f32,
                y: position.y as f32,
            }),
            WindowEvent::CursorLeft { .. } => Some(Self::CursorLeft),
            WindowEvent::Resized(size) => Some(Self::Resized {
                width: size.width,
                height: size.height,
            }),
            _ => None,
        }
    }
}
