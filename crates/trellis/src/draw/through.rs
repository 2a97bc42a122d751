use tracing::trace;

use super::{Blit, ConcreteContext, DrawTarget, dims};
use crate::{
    color::Rgba,
    error::Result,
    geom::{Expanse, Point, Rect, RectF},
};

/// A storage-less draw target that lets a child draw at its own origin.
///
/// Calls are clipped to `[0, w) x [0, h)` in local space, then offset into
/// the parent. When a blit destination is clipped, the source region is
/// trimmed by the same fraction on the same edge so the dest:source scale is
/// preserved.
pub struct DrawThroughContext<'a> {
    /// The target calls are forwarded to.
    parent: &'a mut dyn DrawTarget,
    /// Position of our origin in the parent's space.
    offset: Point,
    /// Clip bounds.
    dims: Expanse,
}

impl<'a> DrawThroughContext<'a> {
    /// Construct a proxy of size `w` x `h` at `(x_offset, y_offset)` within
    /// `parent`.
    pub fn new(
        parent: &'a mut dyn DrawTarget,
        x_offset: i32,
        y_offset: i32,
        w: i32,
        h: i32,
    ) -> Result<Self> {
        Ok(Self {
            parent,
            offset: Point::new(x_offset, y_offset),
            dims: dims(w, h)?,
        })
    }

    /// Our origin in the parent's coordinate space.
    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Clip a local rectangle to our bounds. Returns `None` if nothing is
    /// left.
    fn clip(&self, dest: Rect) -> Option<Rect> {
        let Rect { mut x, mut y, mut w, mut h } = dest;
        if w < 1 || h < 1 {
            return None;
        }
        if x >= self.dims.w || y >= self.dims.h {
            return None;
        }
        if x.saturating_add(w) <= 0 || y.saturating_add(h) <= 0 {
            return None;
        }
        if x.saturating_add(w) > self.dims.w {
            w = self.dims.w - x;
        }
        if y.saturating_add(h) > self.dims.h {
            h = self.dims.h - y;
        }
        if x < 0 {
            w += x;
            x = 0;
        }
        if y < 0 {
            h += y;
            y = 0;
        }
        Some(Rect::new(x, y, w, h))
    }
}

/// Trim `source` so that it maps onto `clipped` the same way it mapped onto
/// `dest`.
pub(crate) fn clip_source(dest: Rect, clipped: Rect, source: RectF) -> RectF {
    let (dx, dy) = (f64::from(dest.w), f64::from(dest.h));
    RectF {
        x: source.x + f64::from(clipped.x - dest.x) * source.w / dx,
        y: source.y + f64::from(clipped.y - dest.y) * source.h / dy,
        w: source.w * f64::from(clipped.w) / dx,
        h: source.h * f64::from(clipped.h) / dy,
    }
}

impl DrawTarget for DrawThroughContext<'_> {
    fn dims(&self) -> Expanse {
        self.dims
    }

    fn push_draw_fill_rect(&mut self, dest: Rect, color: Rgba) -> Result<()> {
        let Some(clipped) = self.clip(dest) else {
            trace!("fill {dest} clipped away");
            return Ok(());
        };
        self.parent
            .push_draw_fill_rect(clipped.shift(self.offset.x, self.offset.y), color)
    }

    fn push_draw_concrete(
        &mut self,
        dest: Rect,
        source: &ConcreteContext,
        blit: Blit,
    ) -> Result<()> {
        let Some(clipped) = self.clip(dest) else {
            trace!("blit {dest} clipped away");
            return Ok(());
        };
        let blit = if clipped == dest {
            blit
        } else {
            let region = blit.source.unwrap_or_else(|| source.rect().into());
            Blit {
                source: Some(clip_source(dest, clipped, region)),
                ..blit
            }
        };
        self.parent.push_draw_concrete(
            clipped.shift(self.offset.x, self.offset.y),
            source,
            blit,
        )
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{
        error::Error,
        testing::{DrawCall, RecordingGiftbox},
    };

    #[test]
    fn fill_translates_and_clips() -> Result<()> {
        let (calls, mut root) = RecordingGiftbox::create(100, 100)?;
        {
            let mut dt = DrawThroughContext::new(&mut root, 10, 20, 30, 30)?;
            dt.push_draw_fill_rect(Rect::new(0, 0, 5, 5), Rgba::RED)?;
            dt.push_draw_fill_rect(Rect::new(-2, 25, 10, 10), Rgba::BLUE)?;
        }
        assert_eq!(
            calls.take(),
            vec![
                DrawCall::Fill {
                    dest: Rect::new(10, 20, 5, 5),
                    color: Rgba::RED
                },
                DrawCall::Fill {
                    dest: Rect::new(10, 45, 8, 5),
                    color: Rgba::BLUE
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn fully_clipped_is_silent() -> Result<()> {
        let (calls, mut root) = RecordingGiftbox::create(100, 100)?;
        {
            let mut dt = DrawThroughContext::new(&mut root, 0, 0, 10, 10)?;
            for r in [
                Rect::new(10, 0, 5, 5),
                Rect::new(0, 10, 5, 5),
                Rect::new(-5, 0, 5, 5),
                Rect::new(0, -5, 5, 5),
                Rect::new(2, 2, 0, 5),
                Rect::new(2, 2, 5, -1),
            ] {
                dt.push_draw_fill_rect(r, Rgba::RED)?;
            }
        }
        assert!(calls.take().is_empty());
        Ok(())
    }

    #[test]
    fn source_clipped_proportionally() -> Result<()> {
        let (calls, mut root) = RecordingGiftbox::create(100, 100)?;
        let (_, sheet) = RecordingGiftbox::create(200, 200)?;
        {
            let mut dt = DrawThroughContext::new(&mut root, 0, 0, 100, 100)?;
            dt.push_draw_concrete(
                Rect::new(-20, 0, 100, 100),
                &sheet,
                Blit::region(Rect::new(0, 0, 200, 200)),
            )?;
        }
        assert_eq!(
            calls.take(),
            vec![DrawCall::Concrete {
                dest: Rect::new(0, 0, 80, 100),
                blit: Blit::region(RectF::new(40.0, 0.0, 160.0, 200.0)),
            }]
        );
        Ok(())
    }

    #[test]
    fn missing_source_uses_whole_surface() -> Result<()> {
        let (calls, mut root) = RecordingGiftbox::create(100, 100)?;
        let (_, sheet) = RecordingGiftbox::create(40, 10)?;
        {
            let mut dt = DrawThroughContext::new(&mut root, 5, 5, 20, 20)?;
            dt.push_draw_concrete(Rect::new(0, 0, 40, 10), &sheet, Blit::default())?;
            dt.push_draw_concrete(Rect::new(0, 0, 20, 10), &sheet, Blit::default())?;
        }
        assert_eq!(
            calls.take(),
            vec![
                DrawCall::Concrete {
                    dest: Rect::new(5, 5, 20, 10),
                    blit: Blit::region(RectF::new(0.0, 0.0, 20.0, 10.0)),
                },
                DrawCall::Concrete {
                    dest: Rect::new(5, 5, 20, 10),
                    blit: Blit::default(),
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn huge_rects_clip_without_overflow() -> Result<()> {
        let (calls, mut root) = RecordingGiftbox::create(100, 100)?;
        {
            let mut dt = DrawThroughContext::new(&mut root, 0, 0, 10, 10)?;
            dt.push_draw_fill_rect(Rect::new(5, 5, i32::MAX, i32::MAX), Rgba::RED)?;
            dt.push_draw_fill_rect(Rect::new(-10, 0, i32::MAX, 1), Rgba::BLUE)?;
        }
        assert_eq!(
            calls.take(),
            vec![
                DrawCall::Fill {
                    dest: Rect::new(5, 5, 5, 5),
                    color: Rgba::RED
                },
                DrawCall::Fill {
                    dest: Rect::new(0, 0, 10, 1),
                    color: Rgba::BLUE
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn nested_contexts_compose() -> Result<()> {
        let (calls, mut root) = RecordingGiftbox::create(100, 100)?;
        {
            let mut outer = DrawThroughContext::new(&mut root, 10, 10, 50, 50)?;
            let mut inner = DrawThroughContext::new(&mut outer, 45, 5, 20, 20)?;
            inner.push_draw_fill_rect(Rect::new(0, 0, 20, 20), Rgba::GREEN)?;
        }
        // Inner clips nothing, outer trims to its 50px width.
        assert_eq!(
            calls.take(),
            vec![DrawCall::Fill {
                dest: Rect::new(55, 15, 5, 20),
                color: Rgba::GREEN
            }]
        );
        Ok(())
    }

    #[test]
    fn rejects_empty() -> Result<()> {
        let (_, mut root) = RecordingGiftbox::create(10, 10)?;
        assert_eq!(
            DrawThroughContext::new(&mut root, 0, 0, 0, 3).map(|_| ()),
            Err(Error::InvalidDimensions { w: 0, h: 3 })
        );
        Ok(())
    }

    proptest! {
        #[test]
        fn clip_preserves_scale(
            x in -100i32..100, w in 1i32..200,
            sx in 0i32..50, sw in 1i32..400,
        ) {
            let dest = Rect::new(x, 0, w, 10);
            let bounds = Rect::new(0, 0, 100, 10);
            if let Some(clipped) = dest.intersect(&bounds) {
                let src = clip_source(dest, clipped, RectF::new(f64::from(sx), 0.0, f64::from(sw), 10.0));
                let before = f64::from(sw) / f64::from(w);
                let after = src.w / f64::from(clipped.w);
                prop_assert!((before - after).abs() < 1e-9);
                // The trimmed source never leaves the original region.
                prop_assert!(src.x >= f64::from(sx) - 1e-9);
                prop_assert!(src.x + src.w <= f64::from(sx + sw) + 1e-9);
            }
        }
    }
}
