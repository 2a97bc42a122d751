use std::fmt;

use super::{Expanse, Point};

/// An axis-aligned rectangle in logical pixels. Width and height are signed:
/// anything below one is treated as empty by callers.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub w: i32,
    /// Height.
    pub h: i32,
}

impl Rect {
    /// Construct a rectangle from coordinates and size.
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Does this rect have no area?
    pub fn is_empty(&self) -> bool {
        self.w < 1 || self.h < 1
    }

    /// Top-left corner.
    pub fn tl(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Size without location.
    pub fn expanse(&self) -> Expanse {
        Expanse::new(self.w, self.h)
    }

    /// One past the right edge, saturating at `i32::MAX`.
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.w)
    }

    /// One past the bottom edge, saturating at `i32::MAX`.
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.h)
    }

    /// Does this rectangle contain the point? The right and bottom edges are
    /// exclusive.
    pub fn contains_point(&self, p: impl Into<Point>) -> bool {
        let p = p.into();
        !(p.x < self.x || p.x >= self.right() || p.y < self.y || p.y >= self.bottom())
    }

    /// Shift the rectangle by an offset.
    pub fn shift(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            w: self.w,
            h: self.h,
        }
    }

    /// Given a point in the same space as this rect, express it relative to
    /// our origin.
    pub fn rebase(&self, p: Point) -> Point {
        Point::new(p.x - self.x, p.y - self.y)
    }

    /// Return the intersection of two rectangles, if any.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        if self.is_empty() || other.is_empty() {
            return None;
        }
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            return None;
        }
        Some(Self::new(left, top, right - left, bottom - top))
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{Rect: x={} y={} w={} h={}}}",
            self.x, self.y, self.w, self.h
        )
    }
}

impl From<(i32, i32, i32, i32)> for Rect {
    fn from(v: (i32, i32, i32, i32)) -> Self {
        Self::new(v.0, v.1, v.2, v.3)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn contains_point_edges() {
        let r = Rect::new(10, 10, 5, 5);
        assert!(r.contains_point((10, 10)));
        assert!(r.contains_point((14, 14)));
        assert!(!r.contains_point((15, 14)));
        assert!(!r.contains_point((14, 15)));
        assert!(!r.contains_point((9, 12)));
        assert!(!Rect::new(0, 0, 0, 5).contains_point((0, 0)));
    }

    #[test]
    fn intersect() {
        let a = Rect::new(0, 0, 10, 10);
        assert_eq!(
            a.intersect(&Rect::new(5, 5, 10, 10)),
            Some(Rect::new(5, 5, 5, 5))
        );
        assert_eq!(a.intersect(&Rect::new(10, 0, 5, 5)), None);
        assert_eq!(
            a.intersect(&Rect::new(-3, 2, 5, 1)),
            Some(Rect::new(0, 2, 2, 1))
        );
    }

    #[test]
    fn extreme_edges_saturate() {
        let r = Rect::new(i32::MAX - 2, i32::MAX - 2, 10, 10);
        assert_eq!(r.right(), i32::MAX);
        assert!(r.contains_point((i32::MAX - 1, i32::MAX - 2)));
        assert!(!r.contains_point((i32::MAX - 3, i32::MAX - 2)));
        assert_eq!(
            Rect::new(-5, 0, i32::MAX, 1).intersect(&Rect::new(0, 0, 10, 10)),
            Some(Rect::new(0, 0, 10, 1))
        );
        assert_eq!(r.intersect(&Rect::new(0, 0, 10, 10)), None);
    }

    #[test]
    fn display() {
        assert_eq!(
            Rect::new(1, -2, 3, 4).to_string(),
            "{Rect: x=1 y=-2 w=3 h=4}"
        );
    }

    proptest! {
        #[test]
        fn rebase_composes(
            px in -500i32..500, py in -500i32..500,
            ax in -100i32..100, ay in -100i32..100,
            bx in -100i32..100, by in -100i32..100,
        ) {
            let p = Point::new(px, py);
            let a = Rect::new(ax, ay, 1, 1);
            let b = Rect::new(bx, by, 1, 1);
            let both = Rect::new(ax + bx, ay + by, 1, 1);
            prop_assert_eq!(b.rebase(a.rebase(p)), both.rebase(p));
        }
    }
}
