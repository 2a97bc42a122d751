use crate::{
    draw::{Blit, DrawTarget},
    error::Result,
    geom::{Expanse, Rect},
    sprite::{SpriteFrame, SpriteRegistry},
    widget::{NodeInfo, Widget},
};

/// A single static frame from a sprite registry, drawn at the node's origin
/// at its natural size.
#[derive(Debug, Clone)]
pub struct Bitmap {
    /// The frame to draw.
    frame: SpriteFrame,
}

impl Bitmap {
    /// Wrap a resolved frame.
    pub fn new(frame: SpriteFrame) -> Self {
        Self { frame }
    }

    /// Resolve a frame from a registry. Fails if it does not exist.
    pub fn from_registry(registry: &SpriteRegistry, namespace: &str, key: &str) -> Result<Self> {
        Ok(Self::new(registry.frame(namespace, key)?))
    }

    /// Natural size of the frame.
    pub fn size(&self) -> Expanse {
        self.frame.rect.expanse()
    }
}

impl Widget for Bitmap {
    fn draw(&mut self, node: &NodeInfo, target: &mut dyn DrawTarget) -> Result<()> {
        node.paint_background(target)?;
        let r = self.frame.rect;
        target.push_draw_concrete(
            Rect::new(0, 0, r.w, r.h),
            &self.frame.sheet,
            Blit::region(r).with_alpha(node.opacity),
        )
    }
}
