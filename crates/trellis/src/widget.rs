//! Widget trait.

use std::{any::Any, time::Duration};

use crate::{
    color::Rgba,
    draw::DrawTarget,
    error::Result,
    event::{MouseEvt, MouseKind},
    geom::{Expanse, Point, Rect},
};

/// A read-only snapshot of a node, handed to its widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeInfo {
    /// The node's unique serial.
    pub serial: u64,
    /// Declared size.
    pub size: Expanse,
    /// Position relative to the parent's origin.
    pub true_position: Point,
    /// Background fill.
    pub background: Rgba,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
    /// Did this node receive the current press?
    pub maybe_clicked: bool,
}

impl NodeInfo {
    /// The node's own area, at its local origin.
    pub fn local_rect(&self) -> Rect {
        self.size.rect()
    }

    /// Fill the node's area with its background, faded by its opacity.
    /// Blank backgrounds draw nothing.
    pub fn paint_background(&self, target: &mut dyn DrawTarget) -> Result<()> {
        if self.background.is_blank() {
            return Ok(());
        }
        target.push_draw_fill_rect(self.local_rect(), self.background.fade(self.opacity))
    }
}

/// Behavior attached to a node.
///
/// Every method has a default, so a widget only implements what it needs.
/// Widgets paint in their node's local space: `(0, 0)` is the node's top-left
/// corner and the target clips to the node's size.
pub trait Widget: Any {
    /// Paint this node. Children are drawn afterwards by the tree.
    fn draw(&mut self, node: &NodeInfo, target: &mut dyn DrawTarget) -> Result<()> {
        node.paint_background(target)
    }

    /// Advance per-frame state.
    fn update(&mut self, _dt: Duration) {}

    /// Observe a mouse event reaching this node. Runs before the node's own
    /// hooks.
    fn on_mouse(&mut self, _kind: MouseKind, _e: &MouseEvt, _node: &NodeInfo) {}

    /// The node was resized.
    fn resized(&mut self, _size: Expanse) {}
}

/// Convert widgets into boxed trait objects.
impl<W> From<W> for Box<dyn Widget>
where
    W: Widget + 'static,
{
    fn from(widget: W) -> Self {
        Box::new(widget)
    }
}
