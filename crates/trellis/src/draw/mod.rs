//! Drawing targets.
//!
//! A [`DrawTarget`] accepts two primitives: flat rectangle fills and blits
//! from a backed surface. [`ConcreteContext`] forwards both to a backend
//! [`Giftbox`] that owns real pixels; [`DrawThroughContext`] owns nothing and
//! translates and clips into its parent target.

mod concrete;
mod through;

pub use concrete::{ConcreteContext, Giftbox, SurfaceFactory};
pub use through::DrawThroughContext;

use crate::{
    color::Rgba,
    error::{Error, Result},
    geom::{Expanse, Rect, RectF},
};

/// Options for compositing one surface onto another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blit {
    /// Multiplier applied to the output alpha.
    pub alpha: f32,
    /// Tint color. RGB is blended towards this color weighted by its alpha.
    pub tint: Rgba,
    /// Region of the source surface to sample. `None` samples the whole
    /// surface.
    pub source: Option<RectF>,
}

impl Default for Blit {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            tint: Rgba::BLANK,
            source: None,
        }
    }
}

impl Blit {
    /// A default blit that samples only `region` of the source.
    pub fn region(region: impl Into<RectF>) -> Self {
        Self {
            source: Some(region.into()),
            ..Self::default()
        }
    }

    /// Set the alpha factor.
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the tint.
    pub fn with_tint(mut self, tint: Rgba) -> Self {
        self.tint = tint;
        self
    }
}

/// Something that can be drawn on.
///
/// Implementors must override both drawing primitives. The defaults exist so
/// that a target which only reports its size fails loudly when drawn on.
pub trait DrawTarget {
    /// Size of the drawable area, in the target's local coordinates.
    fn dims(&self) -> Expanse;

    /// Fill `dest` with a flat color. Blank colors are skipped.
    fn push_draw_fill_rect(&mut self, dest: Rect, color: Rgba) -> Result<()> {
        let _ = (dest, color);
        Err(Error::Unsupported("push_draw_fill_rect"))
    }

    /// Composite a region of `source` into `dest`, scaling as needed.
    fn push_draw_concrete(
        &mut self,
        dest: Rect,
        source: &ConcreteContext,
        blit: Blit,
    ) -> Result<()> {
        let _ = (dest, source, blit);
        Err(Error::Unsupported("push_draw_concrete"))
    }
}

/// Validate the dimensions of a new draw target.
pub fn dims(w: i32, h: i32) -> Result<Expanse> {
    Ok(Expanse::surface(w, h)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bare;

    impl DrawTarget for Bare {
        fn dims(&self) -> Expanse {
            Expanse::new(10, 10)
        }
    }

    #[test]
    fn bare_target_is_unsupported() {
        let mut b = Bare;
        assert_eq!(
            b.push_draw_fill_rect(Rect::new(0, 0, 1, 1), Rgba::RED),
            Err(Error::Unsupported("push_draw_fill_rect"))
        );
    }

    #[test]
    fn dims_validation() {
        assert!(dims(1, 1).is_ok());
        assert_eq!(dims(0, 5), Err(Error::InvalidDimensions { w: 0, h: 5 }));
        assert_eq!(dims(5, -1), Err(Error::InvalidDimensions { w: 5, h: -1 }));
    }

    #[test]
    fn blit_builder() {
        let b = Blit::region(Rect::new(1, 2, 3, 4)).with_alpha(0.5);
        assert_eq!(b.source, Some(RectF::new(1.0, 2.0, 3.0, 4.0)));
        assert_eq!(b.alpha, 0.5);
        assert!(b.tint.is_blank());
    }
}
