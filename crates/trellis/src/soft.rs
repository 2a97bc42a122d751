//! A software backend.
//!
//! [`SoftEngine`] owns every surface it creates in a shared arena of
//! `RgbaImage`s. Fills and blits are composited with the usual
//! `src_alpha, one_minus_src_alpha` blend for color and `one,
//! one_minus_src_alpha` for alpha. Blits scale with nearest-neighbor sampling
//! and apply the blit's tint and alpha factor to each source texel first.

use std::{any::Any, cell::RefCell, rc::Rc};

use image::{Rgba as Pixel, RgbaImage, imageops};
use slotmap::{SlotMap, new_key_type};

use crate::{
    color::Rgba,
    draw::{Blit, ConcreteContext, Giftbox, SurfaceFactory, dims},
    error::{Error, Result},
    geom::{Rect, RectF},
};

new_key_type! {
    /// Identifier of a surface owned by a [`SoftEngine`].
    pub struct SurfaceId;
}

/// Surface storage shared between the engine and its giftboxes.
type Store = Rc<RefCell<SlotMap<SurfaceId, RgbaImage>>>;

/// A software graphics engine.
#[derive(Clone, Default)]
pub struct SoftEngine {
    /// All live surfaces.
    store: Store,
}

impl SoftEngine {
    /// An engine with no surfaces.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live surfaces.
    pub fn surface_count(&self) -> usize {
        self.store.borrow().len()
    }

    /// Our surface id for a context, if the context is one of ours.
    fn surface_id(&self, ctx: &ConcreteContext) -> Option<SurfaceId> {
        ctx.giftbox()
            .as_any()
            .downcast_ref::<SoftSurface>()
            .filter(|s| Rc::ptr_eq(&s.store, &self.store))
            .map(|s| s.id)
    }

    /// A copy of a surface's pixels. `None` if the context belongs to another
    /// backend or has been released.
    pub fn snapshot(&self, ctx: &ConcreteContext) -> Option<RgbaImage> {
        let id = self.surface_id(ctx)?;
        self.store.borrow().get(id).cloned()
    }
}

impl SurfaceFactory for SoftEngine {
    fn create_concrete(&self, w: i32, h: i32) -> Result<ConcreteContext> {
        let size = dims(w, h)?;
        let id = self
            .store
            .borrow_mut()
            .insert(RgbaImage::new(size.w as u32, size.h as u32));
        let surface = SoftSurface {
            store: Rc::clone(&self.store),
            id,
        };
        ConcreteContext::new(Rc::new(surface), w, h)
    }
}

/// Giftbox for one surface in a [`SoftEngine`].
struct SoftSurface {
    /// The engine's storage.
    store: Store,
    /// Our surface.
    id: SurfaceId,
}

/// Failure for operations on a released surface.
fn released() -> Error {
    Error::Backend("surface has been released".into())
}

/// Composite one straight-alpha color over a pixel.
fn blend(dst: &mut Pixel<u8>, src: [f32; 4]) {
    let sa = src[3].clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    let inv = 1.0 - sa;
    for (d, s) in dst.0.iter_mut().zip(src).take(3) {
        *d = ((s * sa + f32::from(*d) / 255.0 * inv) * 255.0).round() as u8;
    }
    let da = f32::from(dst.0[3]) / 255.0;
    dst.0[3] = ((sa + da * inv) * 255.0).round() as u8;
}

/// Normalize a color to `[0, 1]` channels.
fn unit(c: [u8; 4]) -> [f32; 4] {
    c.map(|v| f32::from(v) / 255.0)
}

/// Clip a rectangle to an image's bounds.
fn clip_to(img: &RgbaImage, r: Rect) -> Option<Rect> {
    let (w, h) = img.dimensions();
    r.intersect(&Rect::new(0, 0, w as i32, h as i32))
}

impl SoftSurface {
    /// Run `f` against our pixels.
    fn with_pixels<R>(&self, f: impl FnOnce(&mut RgbaImage) -> R) -> Result<R> {
        let mut store = self.store.borrow_mut();
        let img = store.get_mut(self.id).ok_or_else(released)?;
        Ok(f(img))
    }

    /// Copy the part of a source surface that a region samples from, along
    /// with the copy's origin on the source.
    fn sample_region(&self, source: &ConcreteContext, region: RectF) -> Result<(RgbaImage, i32, i32)> {
        let src = source
            .giftbox()
            .as_any()
            .downcast_ref::<Self>()
            .filter(|s| Rc::ptr_eq(&s.store, &self.store))
            .ok_or_else(|| Error::Backend("source surface belongs to another backend".into()))?;
        let store = self.store.borrow();
        let img = store.get(src.id).ok_or_else(released)?;
        let Some(r) = clip_to(img, region.cover()) else {
            return Ok((RgbaImage::new(0, 0), 0, 0));
        };
        let crop = imageops::crop_imm(img, r.x as u32, r.y as u32, r.w as u32, r.h as u32).to_image();
        Ok((crop, r.x, r.y))
    }
}

impl Giftbox for SoftSurface {
    fn push_draw_fill_rect(&self, dest: Rect, color: Rgba) -> Result<()> {
        self.with_pixels(|img| {
            if color.is_blank() {
                return;
            }
            let Some(r) = clip_to(img, dest) else {
                return;
            };
            let src = unit(color.channels());
            for y in r.y..r.y + r.h {
                for x in r.x..r.x + r.w {
                    blend(img.get_pixel_mut(x as u32, y as u32), src);
                }
            }
        })
    }

    fn push_draw_concrete(&self, dest: Rect, source: &ConcreteContext, blit: Blit) -> Result<()> {
        let region = blit.source.unwrap_or_else(|| source.rect().into());
        if dest.is_empty() || region.w <= 0.0 || region.h <= 0.0 {
            return Ok(());
        }
        // Copy first: the source may be this very surface.
        let (texels, ox, oy) = self.sample_region(source, region)?;
        let tint = unit(blit.tint.channels());
        self.with_pixels(|img| {
            let Some(r) = clip_to(img, dest) else {
                return;
            };
            for y in r.y..r.y + r.h {
                let v = region.y + (f64::from(y - dest.y) + 0.5) * region.h / f64::from(dest.h);
                let sy = v.floor() as i32 - oy;
                for x in r.x..r.x + r.w {
                    let u = region.x + (f64::from(x - dest.x) + 0.5) * region.w / f64::from(dest.w);
                    let sx = u.floor() as i32 - ox;
                    if sx < 0 || sy < 0 || sx as u32 >= texels.width() || sy as u32 >= texels.height()
                    {
                        continue;
                    }
                    let mut t = unit(texels.get_pixel(sx as u32, sy as u32).0);
                    for (tc, k) in t.iter_mut().zip(tint).take(3) {
                        *tc = *tc * (1.0 - tint[3]) + k * tint[3];
                    }
                    t[3] *= blit.alpha;
                    blend(img.get_pixel_mut(x as u32, y as u32), t);
                }
            }
        })
    }

    fn load_image(&self, image: &RgbaImage) -> Result<()> {
        self.with_pixels(|img| {
            for p in img.pixels_mut() {
                *p = Pixel([0, 0, 0, 0]);
            }
            imageops::replace(img, image, 0, 0);
        })
    }

    fn clear(&self, color: Rgba) -> Result<()> {
        self.with_pixels(|img| {
            for p in img.pixels_mut() {
                *p = Pixel(color.channels());
            }
        })
    }

    fn release(&self) -> Result<()> {
        self.store
            .borrow_mut()
            .remove(self.id)
            .map(|_| ())
            .ok_or_else(released)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        draw::{DrawTarget, DrawThroughContext},
        testing::RecordingGiftbox,
    };

    fn px(img: &RgbaImage, x: u32, y: u32) -> [u8; 4] {
        img.get_pixel(x, y).0
    }

    #[test]
    fn fill_and_blend() -> Result<()> {
        let eng = SoftEngine::new();
        let mut s = eng.create_concrete(4, 4)?;
        s.clear(Rgba::BLACK)?;
        s.push_draw_fill_rect(Rect::new(1, 1, 10, 1), Rgba::RED)?;
        s.push_draw_fill_rect(Rect::new(0, 3, 1, 1), Rgba::WHITE.fade(0.5))?;
        let img = eng.snapshot(&s).ok_or_else(released)?;
        assert_eq!(px(&img, 0, 0), [0, 0, 0, 255]);
        assert_eq!(px(&img, 1, 1), [255, 0, 0, 255]);
        assert_eq!(px(&img, 3, 1), [255, 0, 0, 255]);
        assert_eq!(px(&img, 0, 3), [128, 128, 128, 255]);
        Ok(())
    }

    #[test]
    fn blit_scales_and_tints() -> Result<()> {
        let eng = SoftEngine::new();
        let mut sheet = eng.create_concrete(2, 1)?;
        sheet.push_draw_fill_rect(Rect::new(0, 0, 1, 1), Rgba::RED)?;
        sheet.push_draw_fill_rect(Rect::new(1, 0, 1, 1), Rgba::BLUE)?;

        let mut dst = eng.create_concrete(4, 2)?;
        dst.push_draw_concrete(Rect::new(0, 0, 4, 2), &sheet, Blit::default())?;
        let img = eng.snapshot(&dst).ok_or_else(released)?;
        assert_eq!(px(&img, 1, 1), [255, 0, 0, 255]);
        assert_eq!(px(&img, 2, 0), [0, 0, 255, 255]);

        dst.clear(Rgba::BLANK)?;
        dst.push_draw_concrete(
            Rect::new(0, 0, 1, 1),
            &sheet,
            Blit::region(Rect::new(1, 0, 1, 1)).with_tint(Rgba::GREEN),
        )?;
        let img = eng.snapshot(&dst).ok_or_else(released)?;
        assert_eq!(px(&img, 0, 0), [0, 255, 0, 255]);
        Ok(())
    }

    #[test]
    fn clipped_blit_samples_matching_source() -> Result<()> {
        let eng = SoftEngine::new();
        // A 4px wide strip of distinct columns, drawn at 2x into a context
        // that clips off the first column pair.
        let mut sheet = eng.create_concrete(4, 1)?;
        let cols = [Rgba::RED, Rgba::GREEN, Rgba::BLUE, Rgba::WHITE];
        for (i, c) in cols.iter().enumerate() {
            sheet.push_draw_fill_rect(Rect::new(i as i32, 0, 1, 1), *c)?;
        }
        let mut root = eng.create_concrete(8, 2)?;
        {
            let mut dt = DrawThroughContext::new(&mut root, 0, 0, 8, 2)?;
            dt.push_draw_concrete(Rect::new(-2, 0, 8, 2), &sheet, Blit::default())?;
        }
        let img = eng.snapshot(&root).ok_or_else(released)?;
        assert_eq!(px(&img, 0, 0), [0, 255, 0, 255]);
        assert_eq!(px(&img, 2, 0), [0, 0, 255, 255]);
        assert_eq!(px(&img, 5, 1), [255, 255, 255, 255]);
        assert_eq!(px(&img, 6, 0), [0, 0, 0, 0]);
        Ok(())
    }

    #[test]
    fn self_blit() -> Result<()> {
        let eng = SoftEngine::new();
        let mut s = eng.create_concrete(2, 1)?;
        s.push_draw_fill_rect(Rect::new(0, 0, 1, 1), Rgba::RED)?;
        let same = s.clone();
        s.push_draw_concrete(Rect::new(1, 0, 1, 1), &same, Blit::region(Rect::new(0, 0, 1, 1)))?;
        let img = eng.snapshot(&s).ok_or_else(released)?;
        assert_eq!(px(&img, 1, 0), [255, 0, 0, 255]);
        Ok(())
    }

    #[test]
    fn alpha_factor() -> Result<()> {
        let eng = SoftEngine::new();
        let mut src = eng.create_concrete(1, 1)?;
        src.clear(Rgba::WHITE)?;
        let mut dst = eng.create_concrete(1, 1)?;
        dst.clear(Rgba::BLACK)?;
        dst.push_draw_concrete(Rect::new(0, 0, 1, 1), &src, Blit::default().with_alpha(0.5))?;
        let img = eng.snapshot(&dst).ok_or_else(released)?;
        assert_eq!(px(&img, 0, 0), [128, 128, 128, 255]);
        Ok(())
    }

    #[test]
    fn load_and_release() -> Result<()> {
        let eng = SoftEngine::new();
        let s = eng.create_concrete(3, 3)?;
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(1, 1, Pixel([1, 2, 3, 4]));
        s.load_image(&img)?;
        let snap = eng.snapshot(&s).ok_or_else(released)?;
        assert_eq!(px(&snap, 1, 1), [1, 2, 3, 4]);
        assert_eq!(px(&snap, 2, 2), [0, 0, 0, 0]);

        assert_eq!(eng.surface_count(), 1);
        s.release()?;
        assert_eq!(eng.surface_count(), 0);
        assert!(s.clear(Rgba::RED).is_err());
        assert!(s.release().is_err());
        assert!(eng.snapshot(&s).is_none());
        Ok(())
    }

    #[test]
    fn foreign_surfaces() -> Result<()> {
        let eng = SoftEngine::new();
        let other = SoftEngine::new();
        let mut dst = eng.create_concrete(2, 2)?;
        let theirs = other.create_concrete(2, 2)?;
        let (_, recorded) = RecordingGiftbox::create(2, 2)?;
        assert!(dst.push_draw_concrete(Rect::new(0, 0, 2, 2), &theirs, Blit::default()).is_err());
        assert!(dst.push_draw_concrete(Rect::new(0, 0, 2, 2), &recorded, Blit::default()).is_err());
        assert!(eng.snapshot(&theirs).is_none());
        assert!(eng.create_concrete(0, 1).is_err());
        Ok(())
    }
}
