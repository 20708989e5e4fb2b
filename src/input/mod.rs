//! Input handling: platform-agnostic pointer events and the coordinate
//! spaces a pointer position passes through on its way to a pixel query.

/// Platform-agnostic input events.
pub mod event;
/// Canvas rectangle and client/canvas/render coordinate translation.
pub mod pointer;

pub use event::InputEvent;
pub use pointer::{CanvasPoint, CanvasRect};
