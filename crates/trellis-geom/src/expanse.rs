use super::{Error, Point, Rect, Result};

/// An `Expanse` is a rectangle that has a width and height but no location.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Expanse {
    /// Width.
    pub w: i32,
    /// Height.
    pub h: i32,
}

impl Expanse {
    /// Construct an expanse.
    pub fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }

    /// Construct an expanse that can back a drawing surface. Both dimensions
    /// must be at least one.
    pub fn surface(w: i32, h: i32) -> Result<Self> {
        if w < 1 || h < 1 {
            return Err(Error::InvalidDimensions { w, h });
        }
        Ok(Self { w, h })
    }

    /// True if either dimension is zero or negative.
    pub fn is_empty(&self) -> bool {
        self.w < 1 || self.h < 1
    }

    /// The area of this expanse, or zero if it is empty.
    pub fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            i64::from(self.w) * i64::from(self.h)
        }
    }

    /// Return a `Rect` with the same dimensions at the origin.
    pub fn rect(&self) -> Rect {
        Rect::new(0, 0, self.w, self.h)
    }

    /// Return a `Rect` with the same dimensions at `p`.
    pub fn at(&self, p: Point) -> Rect {
        Rect::new(p.x, p.y, self.w, self.h)
    }
}

impl From<Rect> for Expanse {
    fn from(r: Rect) -> Self {
        Self { w: r.w, h: r.h }
    }
}

impl From<(i32, i32)> for Expanse {
    fn from(v: (i32, i32)) -> Self {
        Self { w: v.0, h: v.1 }
    }
}
