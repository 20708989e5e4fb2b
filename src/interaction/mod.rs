//! Pointer interaction: turns cursor movement into picking queries, tooltip
//! updates and highlight redraws.

mod controller;
/// Tooltip presentation trait and placement.
pub mod tooltip;

pub use controller::{HoverOutcome, PointerController};
pub use tooltip::{fit_location, LogTooltip, TooltipPresenter};
