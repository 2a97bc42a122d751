//! Geometry primitives used across trellis.

#![warn(missing_docs)]

/// Error types for geometry operations.
mod error;
/// Width/height size type.
mod expanse;
/// Point helpers.
mod point;
/// Integer rectangle operations.
mod rect;
/// Fractional rectangle used for source regions.
mod rect_f;

pub use error::{Error, Result};
pub use expanse::Expanse;
pub use point::Point;
pub use rect::Rect;
pub use rect_f::RectF;

/// Horizontal alignment of a box inside its container.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub enum HAlign {
    /// Flush with the container's left edge.
    #[default]
    Left,
    /// Centered, rounding towards the left.
    Center,
    /// Flush with the container's right edge.
    Right,
}

/// Vertical alignment of a box inside its container.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub enum VAlign {
    /// Flush with the container's top edge.
    #[default]
    Top,
    /// Centered, rounding upwards.
    Center,
    /// Flush with the container's bottom edge.
    Bottom,
}

impl HAlign {
    /// Resolve the left edge of a box of width `inner` placed in a container
    /// of width `outer`, before any declared offset is applied.
    pub fn resolve(self, outer: i32, inner: i32) -> i32 {
        match self {
            Self::Left => 0,
            Self::Center => (outer - inner).div_euclid(2),
            Self::Right => outer - inner,
        }
    }
}

impl VAlign {
    /// Resolve the top edge of a box of height `inner` placed in a container
    /// of height `outer`, before any declared offset is applied.
    pub fn resolve(self, outer: i32, inner: i32) -> i32 {
        match self {
            Self::Top => 0,
            Self::Center => (outer - inner).div_euclid(2),
            Self::Bottom => outer - inner,
        }
    }
}
