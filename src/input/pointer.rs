//! Client, canvas and render-space coordinates.
//!
//! Client coordinates are where the windowing system reports the cursor.
//! Canvas-local coordinates subtract the canvas origin and keep the
//! top-left origin. Render space flips the vertical axis so `(0, 0)` is the
//! bottom-left pixel, which is what pixel readback expects.

/// The canvas bounding rectangle in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasRect {
    /// Left edge.
    pub left: f32,
    /// Top edge.
    pub top: f32,
    /// Width in physical pixels.
    pub width: f32,
    /// Height in physical pixels.
    pub height: f32,
}

impl CanvasRect {
    /// A canvas covering a whole `width x height` window.
    #[must_use]
    pub fn from_size(width: u32, height: u32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: width as f32,
            height: height as f32,
        }
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Whether a client position lies on or inside the rectangle.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        (self.left..=self.right()).contains(&x)
            && (self.top..=self.bottom()).contains(&y)
    }

    /// Canvas-local position of a client position, or `None` when it falls
    /// outside the canvas.
    pub fn to_local(&self, x: f32, y: f32) -> Option<CanvasPoint> {
        self.contains(x, y).then(|| CanvasPoint {
            x: x - self.left,
            y: y - self.top,
        })
    }
}

/// A canvas-local position, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasPoint {
    /// Pixels from the left edge.
    pub x: f32,
    /// Pixels from the top edge.
    pub y: f32,
}

impl CanvasPoint {
    /// Render-space pixel (bottom-left origin) under this point.
    ///
    /// Fractional coordinates are floored. Points on the right or top edge
    /// map one past the last pixel and read back as background.
    pub fn to_render(self, canvas_height: f32) -> (u32, u32) {
        let x = self.x.max(0.0).floor() as u32;
        let y = (canvas_height - self.y).max(0.0).floor() as u32;
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> CanvasRect {
        CanvasRect {
            left: 10.0,
            top: 20.0,
            width: 200.0,
            height: 100.0,
        }
    }

    #[test]
    fn edges_are_inside() {
        let rect = canvas();
        assert!(rect.contains(10.0, 20.0));
        assert!(rect.contains(210.0, 120.0));
        assert!(!rect.contains(211.0, 50.0));
        assert!(!rect.contains(50.0, 19.0));
    }

    #[test]
    fn client_to_local_subtracts_origin() {
        let local = canvas().to_local(30.0, 25.0).unwrap();
        assert_eq!(local, CanvasPoint { x: 20.0, y: 5.0 });
        assert_eq!(canvas().to_local(0.0, 0.0), None);
    }

    #[test]
    fn render_space_flips_vertically() {
        let point = CanvasPoint { x: 120.0, y: 35.0 };
        assert_eq!(point.to_render(100.0), (120, 65));
        // Bottom edge of the canvas is render row 0.
        assert_eq!(CanvasPoint { x: 0.0, y: 100.0 }.to_render(100.0), (0, 0));
        // Top edge lands one row past the target.
        assert_eq!(CanvasPoint { x: 0.0, y: 0.0 }.to_render(100.0), (0, 100));
    }

    #[test]
    fn fractional_positions_floor() {
        let point = CanvasPoint { x: 12.7, y: 40.2 };
        assert_eq!(point.to_render(100.0), (12, 59));
    }
}
