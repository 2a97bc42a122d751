use std::sync::atomic::{AtomicU64, Ordering};

use crate::{
    color::Rgba,
    geom::{Expanse, HAlign, Point, Rect, VAlign},
    hooks::Hooks,
    id::NodeId,
    tween::Tween,
    widget::{NodeInfo, Widget},
};

/// Source of node serials.
static SERIAL: AtomicU64 = AtomicU64::new(1);

/// Hit-testing state for nodes that take part in mouse dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interaction {
    /// Inactive nodes and their subtrees are skipped by hit-testing.
    pub active: bool,
    /// The child the pointer was over on the previous move.
    pub last_move_target: Option<NodeId>,
    /// Set when this node receives a press; cleared at the end of the
    /// gesture.
    pub maybe_clicked: bool,
}

impl Default for Interaction {
    fn default() -> Self {
        Self {
            active: true,
            last_move_target: None,
            maybe_clicked: false,
        }
    }
}

/// Core node data stored in the arena.
pub struct Node {
    /// Unique, monotonically assigned serial.
    pub(crate) serial: u64,
    /// Diagnostic name.
    pub(crate) name: String,

    /// Parent in the arena tree.
    pub(crate) parent: Option<NodeId>,
    /// Children in the arena tree, in draw order.
    pub(crate) children: Vec<NodeId>,

    /// Declared size.
    pub(crate) size: Expanse,
    /// Declared offset, applied after alignment.
    pub(crate) position: Point,
    /// Resolved position relative to the parent's origin.
    pub(crate) true_position: Point,
    /// Horizontal alignment within the parent.
    pub(crate) h_align: HAlign,
    /// Vertical alignment within the parent.
    pub(crate) v_align: VAlign,

    /// Invisible nodes and their subtrees are not drawn.
    pub(crate) visible: bool,
    /// Background fill. Blank means none.
    pub(crate) background: Rgba,
    /// Opacity in `[0, 1]`.
    pub(crate) opacity: f32,

    /// Running tweens.
    pub(crate) tweens: Vec<Tween>,
    /// Widget behavior and state.
    pub(crate) widget: Option<Box<dyn Widget>>,
    /// Present if the node takes part in mouse dispatch.
    pub(crate) interaction: Option<Interaction>,
    /// Mouse hooks.
    pub(crate) hooks: Hooks,
}

impl Node {
    /// Return the node's serial.
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// Return the node's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the node's parent, if any.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Return the node's children.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Return the declared size.
    pub fn size(&self) -> Expanse {
        self.size
    }

    /// Return the declared position.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Return the position relative to the parent's origin.
    pub fn true_position(&self) -> Point {
        self.true_position
    }

    /// Return the node's rectangle in its parent's space.
    pub fn rect(&self) -> Rect {
        self.size.at(self.true_position)
    }

    /// Return the alignment pair.
    pub fn align(&self) -> (HAlign, VAlign) {
        (self.h_align, self.v_align)
    }

    /// Return true if the node is drawn.
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Return the background color.
    pub fn background(&self) -> Rgba {
        self.background
    }

    /// Return the opacity.
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Return the number of running tweens.
    pub fn tween_count(&self) -> usize {
        self.tweens.len()
    }

    /// Return the interaction state, if the node is interactive.
    pub fn interaction(&self) -> Option<&Interaction> {
        self.interaction.as_ref()
    }

    /// Return true if the node takes part in mouse dispatch.
    pub fn is_interactive(&self) -> bool {
        self.interaction.is_some()
    }

    /// Return true if the node is interactive and enabled.
    pub fn is_active(&self) -> bool {
        self.interaction.is_some_and(|i| i.active)
    }

    /// Return true if the node received the current press.
    pub fn maybe_clicked(&self) -> bool {
        self.interaction.is_some_and(|i| i.maybe_clicked)
    }

    /// Snapshot for widget calls.
    pub(crate) fn info(&self) -> NodeInfo {
        NodeInfo {
            serial: self.serial,
            size: self.size,
            true_position: self.true_position,
            background: self.background,
            opacity: self.opacity,
            maybe_clicked: self.maybe_clicked(),
        }
    }

    /// Resolve our position within a parent of size `parent`.
    pub(crate) fn resolve_position(&self, parent: Expanse) -> Point {
        Point::new(
            self.h_align.resolve(parent.w, self.size.w) + self.position.x,
            self.v_align.resolve(parent.h, self.size.h) + self.position.y,
        )
    }
}

/// Declarative description of a node, consumed by
/// [`Tree::add`](crate::tree::Tree::add).
pub struct NodeSpec {
    /// Diagnostic name.
    name: String,
    /// Declared size.
    size: Expanse,
    /// Declared offset.
    position: Point,
    /// Horizontal alignment.
    h_align: HAlign,
    /// Vertical alignment.
    v_align: VAlign,
    /// Initial visibility.
    visible: bool,
    /// Background fill.
    background: Rgba,
    /// Initial opacity.
    opacity: f32,
    /// Take part in mouse dispatch.
    interactive: bool,
    /// Widget behavior.
    widget: Option<Box<dyn Widget>>,
}

impl NodeSpec {
    /// A visible, non-interactive, zero-sized node at the origin.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: Expanse::default(),
            position: Point::zero(),
            h_align: HAlign::Left,
            v_align: VAlign::Top,
            visible: true,
            background: Rgba::BLANK,
            opacity: 1.0,
            interactive: false,
            widget: None,
        }
    }

    /// Set the declared size.
    pub fn size(mut self, w: i32, h: i32) -> Self {
        self.size = Expanse::new(w, h);
        self
    }

    /// Set the declared offset.
    pub fn position(mut self, left: i32, top: i32) -> Self {
        self.position = Point::new(left, top);
        self
    }

    /// Set alignment within the parent.
    pub fn align(mut self, h: HAlign, v: VAlign) -> Self {
        self.h_align = h;
        self.v_align = v;
        self
    }

    /// Set initial visibility.
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Set the background fill.
    pub fn background(mut self, color: Rgba) -> Self {
        self.background = color;
        self
    }

    /// Set the initial opacity.
    pub fn opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// Make the node take part in mouse dispatch.
    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }

    /// Attach a widget.
    pub fn widget(mut self, widget: impl Into<Box<dyn Widget>>) -> Self {
        self.widget = Some(widget.into());
        self
    }

    /// Build the arena entry. The widget is told its size before the node
    /// is inserted.
    pub(crate) fn build(self) -> Node {
        let mut widget = self.widget;
        if let Some(w) = widget.as_mut() {
            w.resized(self.size);
        }
        Node {
            serial: SERIAL.fetch_add(1, Ordering::Relaxed),
            name: self.name,
            parent: None,
            children: Vec::new(),
            size: self.size,
            position: self.position,
            true_position: Point::zero(),
            h_align: self.h_align,
            v_align: self.v_align,
            visible: self.visible,
            background: self.background,
            opacity: self.opacity,
            tweens: Vec::new(),
            widget,
            interaction: self.interactive.then(Interaction::default),
            hooks: Hooks::default(),
        }
    }
}
