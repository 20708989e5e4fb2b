//! Tooltip presentation and placement.

use crate::input::CanvasPoint;

/// Somewhere a hover label can be shown.
pub trait TooltipPresenter {
    /// Show `text` anchored at a canvas-local position. `offset` is added
    /// after the box has been fitted inside its container.
    fn show(&mut self, anchor: CanvasPoint, offset: [f32; 2], text: &str);

    /// Hide the tooltip.
    fn hide(&mut self);
}

/// Top-left corner for a `tooltip`-sized box anchored at `anchor` so that it
/// stays inside a `container`-sized area.
///
/// Horizontally the box is centred on the anchor when there is room on both
/// sides, left-aligned near the left edge and right-aligned near the right
/// edge. Vertically it sits above the anchor unless that would leave the
/// container.
pub fn fit_location(
    anchor: CanvasPoint,
    tooltip: [f32; 2],
    container: [f32; 2],
) -> [f32; 2] {
    let [width, height] = tooltip;
    let CanvasPoint { x, y } = anchor;

    let left = if x <= width {
        x
    } else if x + width / 2.0 < container[0] {
        x - width / 2.0
    } else {
        x - width
    };
    let top = if y > 2.0 * height && y < container[1] {
        y - height
    } else {
        y
    };
    [left, top]
}

/// [`fit_location`] followed by `offset`.
pub fn place(
    anchor: CanvasPoint,
    offset: [f32; 2],
    tooltip: [f32; 2],
    container: [f32; 2],
) -> [f32; 2] {
    let [left, top] = fit_location(anchor, tooltip, container);
    [left + offset[0], top + offset[1]]
}

/// Presenter that only logs, for headless use.
#[derive(Debug, Default)]
pub struct LogTooltip {
    visible: bool,
}

impl TooltipPresenter for LogTooltip {
    fn show(&mut self, anchor: CanvasPoint, offset: [f32; 2], text: &str) {
        self.visible = true;
        log::info!(
            "tooltip {text:?} at ({}, {})",
            anchor.x + offset[0],
            anchor.y + offset[1]
        );
    }

    fn hide(&mut self) {
        if std::mem::take(&mut self.visible) {
            log::debug!("tooltip hidden");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOX: [f32; 2] = [40.0, 10.0];
    const CONTAINER: [f32; 2] = [200.0, 100.0];

    fn at(x: f32, y: f32) -> CanvasPoint {
        CanvasPoint { x, y }
    }

    #[test]
    fn centres_with_room_on_both_sides() {
        assert_eq!(fit_location(at(100.0, 50.0), BOX, CONTAINER), [80.0, 40.0]);
    }

    #[test]
    fn left_aligns_near_left_edge() {
        assert_eq!(fit_location(at(40.0, 50.0), BOX, CONTAINER)[0], 40.0);
        assert_eq!(fit_location(at(5.0, 50.0), BOX, CONTAINER)[0], 5.0);
    }

    #[test]
    fn right_aligns_near_right_edge() {
        assert_eq!(fit_location(at(190.0, 50.0), BOX, CONTAINER)[0], 150.0);
        assert_eq!(fit_location(at(180.0, 50.0), BOX, CONTAINER)[0], 140.0);
    }

    #[test]
    fn stays_at_anchor_near_top() {
        assert_eq!(fit_location(at(100.0, 20.0), BOX, CONTAINER)[1], 20.0);
        assert_eq!(fit_location(at(100.0, 21.0), BOX, CONTAINER)[1], 11.0);
    }

    #[test]
    fn place_adds_offset_after_fitting() {
        assert_eq!(
            place(at(100.0, 50.0), [10.0, 0.0], BOX, CONTAINER),
            [90.0, 40.0]
        );
    }
}
