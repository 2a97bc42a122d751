use std::{any::Any, fmt, ptr, rc::Rc};

use image::RgbaImage;

use super::{Blit, DrawTarget, dims};
use crate::{
    color::Rgba,
    error::Result,
    geom::{Expanse, Rect},
};

/// A backend handle that owns pixel storage for one surface.
///
/// Methods take `&self` so that a surface can be blitted onto itself or onto
/// a sibling owned by the same backend; implementations use interior
/// mutability for their storage.
pub trait Giftbox {
    /// Fill `dest` with a flat color.
    fn push_draw_fill_rect(&self, dest: Rect, color: Rgba) -> Result<()>;

    /// Composite a region of `source` into `dest`.
    fn push_draw_concrete(&self, dest: Rect, source: &ConcreteContext, blit: Blit) -> Result<()>;

    /// Replace the surface's pixels with a decoded image.
    fn load_image(&self, image: &RgbaImage) -> Result<()>;

    /// Overwrite every pixel with `color`, without blending.
    fn clear(&self, color: Rgba) -> Result<()>;

    /// Free the backing storage. Further calls fail.
    fn release(&self) -> Result<()>;

    /// Downcast support for backends that need to recognize their own
    /// surfaces.
    fn as_any(&self) -> &dyn Any;
}

/// Something that can allocate backed surfaces.
pub trait SurfaceFactory {
    /// Allocate a new transparent surface of the given size.
    fn create_concrete(&self, w: i32, h: i32) -> Result<ConcreteContext>;
}

/// A draw target backed by a [`Giftbox`]. Calls are forwarded untranslated.
#[derive(Clone)]
pub struct ConcreteContext {
    /// Backend handle.
    giftbox: Rc<dyn Giftbox>,
    /// Surface size.
    dims: Expanse,
}

impl ConcreteContext {
    /// Wrap a giftbox. Fails unless both dimensions are at least one.
    pub fn new(giftbox: Rc<dyn Giftbox>, w: i32, h: i32) -> Result<Self> {
        Ok(Self {
            giftbox,
            dims: dims(w, h)?,
        })
    }

    /// The backend handle.
    pub fn giftbox(&self) -> &dyn Giftbox {
        self.giftbox.as_ref()
    }

    /// The whole surface as a rectangle at the origin.
    pub fn rect(&self) -> Rect {
        self.dims.rect()
    }

    /// True if both contexts share one backend handle.
    pub fn same_surface(&self, other: &Self) -> bool {
        ptr::addr_eq(Rc::as_ptr(&self.giftbox), Rc::as_ptr(&other.giftbox))
    }

    /// Replace the surface's pixels with a decoded image.
    pub fn load_image(&self, image: &RgbaImage) -> Result<()> {
        self.giftbox.load_image(image)
    }

    /// Overwrite every pixel with `color`.
    pub fn clear(&self, color: Rgba) -> Result<()> {
        self.giftbox.clear(color)
    }

    /// Free the backing storage.
    pub fn release(&self) -> Result<()> {
        self.giftbox.release()
    }
}

impl fmt::Debug for ConcreteContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcreteContext")
            .field("dims", &self.dims)
            .finish_non_exhaustive()
    }
}

impl DrawTarget for ConcreteContext {
    fn dims(&self) -> Expanse {
        self.dims
    }

    fn push_draw_fill_rect(&mut self, dest: Rect, color: Rgba) -> Result<()> {
        self.giftbox.push_draw_fill_rect(dest, color)
    }

    fn push_draw_concrete(
        &mut self,
        dest: Rect,
        source: &ConcreteContext,
        blit: Blit,
    ) -> Result<()> {
        self.giftbox.push_draw_concrete(dest, source, blit)
    }
}
