use std::fmt;

use super::Rect;

/// A rectangle with fractional coordinates. Used for source regions, which
/// can pick up sub-pixel offsets when a destination is partially clipped.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RectF {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

impl RectF {
    /// Construct a rectangle from coordinates and size.
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Round outwards to the smallest integer rectangle that covers this one.
    pub fn cover(&self) -> Rect {
        let x = self.x.floor();
        let y = self.y.floor();
        let r = (self.x + self.w).ceil();
        let b = (self.y + self.h).ceil();
        Rect::new(x as i32, y as i32, (r - x) as i32, (b - y) as i32)
    }
}

impl From<Rect> for RectF {
    fn from(r: Rect) -> Self {
        Self {
            x: f64::from(r.x),
            y: f64::from(r.y),
            w: f64::from(r.w),
            h: f64::from(r.h),
        }
    }
}

impl fmt::Display for RectF {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{Rect: x={} y={} w={} h={}}}",
            self.x, self.y, self.w, self.h
        )
    }
}
