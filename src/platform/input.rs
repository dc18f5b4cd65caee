//! Pointer and touch conversion
//!
//! Browsers report client coordinates; the scratch surface wants positions
//! relative to its own top-left corner plus a "pressed" flag.

use crate::sim::PointerSample;

/// Left mouse button in `MouseEvent.buttons`
pub const PRIMARY_BUTTON: u16 = 1;

/// Bounding rect of a surface in client (CSS) coordinates, plus the size of
/// its backing pixel buffer
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub backing_width: u32,
    pub backing_height: u32,
}

impl SurfaceRect {
    /// Rect whose backing buffer matches its CSS size
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self::with_backing(left, top, width, height, width as u32, height as u32)
    }

    pub fn with_backing(
        left: f32,
        top: f32,
        width: f32,
        height: f32,
        backing_width: u32,
        backing_height: u32,
    ) -> Self {
        Self {
            left,
            top,
            width,
            height,
            backing_width,
            backing_height,
        }
    }

    /// Client position in backing pixels relative to the surface origin.
    /// A collapsed rect maps 1:1.
    pub fn to_local(&self, client_x: f32, client_y: f32) -> (f32, f32) {
        let x = client_x - self.left;
        let y = client_y - self.top;
        let sx = if self.width > 0.0 {
            self.backing_width as f32 / self.width
        } else {
            1.0
        };
        let sy = if self.height > 0.0 {
            self.backing_height as f32 / self.height
        } else {
            1.0
        };
        (x * sx, y * sy)
    }
}

/// Mouse move/down. Only counts as scratching with exactly the primary
/// button held.
pub fn mouse_sample(rect: &SurfaceRect, client_x: f32, client_y: f32, buttons: u16) -> PointerSample {
    let (x, y) = rect.to_local(client_x, client_y);
    PointerSample {
        x,
        y,
        pressed: buttons == PRIMARY_BUTTON,
    }
}

/// Touch start/move. The first touch point is used; no touches means
/// nothing to scratch.
pub fn touch_sample(rect: &SurfaceRect, first_touch: Option<(f32, f32)>) -> Option<PointerSample> {
    let (cx, cy) = first_touch?;
    let (x, y) = rect.to_local(cx, cy);
    Some(PointerSample::pressed(x, y))
}
