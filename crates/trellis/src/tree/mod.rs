//! The node arena.
//!
//! A [`Tree`] owns every node in a `slotmap`, addressed by [`NodeId`]. Parent
//! links are plain ids, so there are no reference cycles and a destroyed node
//! simply stops resolving.

mod dispatch;

use std::{
    any::{Any, type_name},
    mem,
    time::Duration,
};

use slotmap::SlotMap;
use tracing::{debug, error, trace, warn};

use crate::{
    color::Rgba,
    draw::{DrawTarget, DrawThroughContext},
    error::{Error, Result},
    event::{MouseEvt, MouseKind, Phase},
    geom::{Expanse, HAlign, Point, VAlign},
    hooks::{Deferred, Hook},
    id::NodeId,
    node::{Node, NodeSpec},
    screen::ScreenRequest,
    tween::{Tween, TweenSpec, TweenValue},
    widget::Widget,
};

/// A tree of nodes with a fixed root.
pub struct Tree {
    /// Node arena.
    nodes: SlotMap<NodeId, Node>,
    /// The root node. Always present.
    root: NodeId,
    /// Nodes that received the current press.
    pressed: Vec<NodeId>,
    /// Edits queued by hooks and tween callbacks.
    deferred: Deferred,
}

impl Tree {
    /// Create a tree whose root is an interactive node of the given size.
    pub fn new(size: Expanse) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(NodeSpec::new("root").size(size.w, size.h).interactive().build());
        Self {
            nodes,
            root,
            pressed: Vec::new(),
            deferred: Deferred::default(),
        }
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root cannot be destroyed.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Does the arena hold this node?
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Look up a node, failing if it is gone.
    pub fn get(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id).ok_or(Error::NodeNotFound(id))
    }

    /// Mutable lookup, failing if the node is gone.
    fn get_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id).ok_or(Error::NodeNotFound(id))
    }

    /// Insert a detached node.
    pub fn add(&mut self, spec: NodeSpec) -> NodeId {
        self.nodes.insert(spec.build())
    }

    /// Insert a node and attach it as the last child of `parent`.
    pub fn add_to(&mut self, parent: NodeId, spec: NodeSpec) -> Result<NodeId> {
        self.get(parent)?;
        let id = self.add(spec);
        self.add_child(parent, id)?;
        Ok(id)
    }

    /// Append `child` to `parent`'s children, on top of its siblings. Fails if
    /// the child already has a parent.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.get(parent)?;
        let c = self.get(child)?;
        if c.parent.is_some() {
            error!("cannot add child {}: child already has a parent", c.name);
            return Err(Error::AlreadyParented(child));
        }
        if child == parent || self.ancestors(parent).contains(&child) {
            return Err(Error::Invalid(format!(
                "cannot add {} beneath itself",
                c.name
            )));
        }
        self.get_mut(child)?.parent = Some(parent);
        self.get_mut(parent)?.children.push(child);
        self.calculate_true_position(child)
    }

    /// Detach `child` from `parent`. A child that is not present is logged
    /// and ignored.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let p = self.get_mut(parent)?;
        let Some(idx) = p.children.iter().position(|c| *c == child) else {
            warn!("failed to remove child from {}: child not found", p.name);
            return Ok(());
        };
        p.children.remove(idx);
        self.detach(child);
        Ok(())
    }

    /// Detach every child of `parent`.
    pub fn remove_all_children(&mut self, parent: NodeId) -> Result<()> {
        let children = mem::take(&mut self.get_mut(parent)?.children);
        for child in children {
            self.detach(child);
        }
        Ok(())
    }

    /// Clear a node's parent link after it has been taken out of the parent's
    /// child list.
    fn detach(&mut self, id: NodeId) {
        if let Some(n) = self.nodes.get_mut(id) {
            n.parent = None;
            n.true_position = Point::zero();
        }
    }

    /// Remove a node and all of its descendants from the arena.
    pub fn destroy(&mut self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(Error::Invalid("cannot destroy the root".into()));
        }
        if let Some(parent) = self.get(id)?.parent {
            self.remove_child(parent, id)?;
        }
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            if let Some(node) = self.nodes.remove(n) {
                stack.extend(node.children);
            }
        }
        self.pressed.retain(|p| self.nodes.contains_key(*p));
        Ok(())
    }

    /// Ids of all ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = self.nodes.get(id).and_then(|n| n.parent);
        while let Some(p) = cur {
            out.push(p);
            cur = self.nodes.get(p).and_then(|n| n.parent);
        }
        out
    }

    /// Is the node attached, directly or indirectly, to the root?
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root || self.ancestors(id).last() == Some(&self.root)
    }

    /// Recompute a node's position relative to its parent from its alignment,
    /// declared offset and both sizes. Parentless nodes sit at the origin.
    fn calculate_true_position(&mut self, id: NodeId) -> Result<()> {
        let node = self.get(id)?;
        let pos = match node.parent {
            Some(p) => node.resolve_position(self.get(p)?.size),
            None => Point::zero(),
        };
        self.get_mut(id)?.true_position = pos;
        Ok(())
    }

    /// Set the declared offset.
    pub fn set_position(&mut self, id: NodeId, left: i32, top: i32) -> Result<()> {
        self.get_mut(id)?.position = Point::new(left, top);
        self.calculate_true_position(id)
    }

    /// Set alignment within the parent.
    pub fn set_align(&mut self, id: NodeId, h: HAlign, v: VAlign) -> Result<()> {
        let node = self.get_mut(id)?;
        node.h_align = h;
        node.v_align = v;
        self.calculate_true_position(id)
    }

    /// Set the declared width.
    pub fn set_width(&mut self, id: NodeId, w: i32) -> Result<()> {
        let h = self.get(id)?.size.h;
        self.set_size(id, w, h)
    }

    /// Set the declared height.
    pub fn set_height(&mut self, id: NodeId, h: i32) -> Result<()> {
        let w = self.get(id)?.size.w;
        self.set_size(id, w, h)
    }

    /// Set the declared size. Children are repositioned, since aligned
    /// children depend on our size, and then so are we.
    pub fn set_size(&mut self, id: NodeId, w: i32, h: i32) -> Result<()> {
        let node = self.get_mut(id)?;
        node.size = Expanse::new(w, h);
        if let Some(widget) = node.widget.as_mut() {
            widget.resized(node.size);
        }
        for child in node.children.clone() {
            self.calculate_true_position(child)?;
        }
        self.calculate_true_position(id)
    }

    /// Show or hide a node and its subtree.
    pub fn show(&mut self, id: NodeId, visible: bool) -> Result<()> {
        self.get_mut(id)?.visible = visible;
        Ok(())
    }

    /// Set the background fill.
    pub fn set_background(&mut self, id: NodeId, color: Rgba) -> Result<()> {
        self.get_mut(id)?.background = color;
        Ok(())
    }

    /// Set the opacity.
    pub fn set_opacity(&mut self, id: NodeId, opacity: f32) -> Result<()> {
        self.get_mut(id)?.opacity = opacity;
        Ok(())
    }

    /// Enable or disable hit-testing for an interactive node and its subtree.
    pub fn enable(&mut self, id: NodeId, active: bool) -> Result<()> {
        let node = self.get_mut(id)?;
        debug!("node {} ({}) enabled {active}", node.name, node.serial);
        let interaction = node
            .interaction
            .as_mut()
            .ok_or_else(|| Error::Invalid(format!("{} is not interactive", node.name)))?;
        interaction.active = active;
        Ok(())
    }

    /// Install a mouse hook on an interactive node, replacing any existing
    /// hook for the same kind and phase.
    pub fn on(
        &mut self,
        id: NodeId,
        kind: MouseKind,
        phase: Phase,
        hook: impl FnMut(&mut MouseEvt, &mut Deferred) + 'static,
    ) -> Result<()> {
        let node = self.get_mut(id)?;
        if !node.is_interactive() {
            return Err(Error::Invalid(format!("{} is not interactive", node.name)));
        }
        let slot = node
            .hooks
            .slot_mut(kind, phase)
            .ok_or_else(|| Error::Invalid(format!("no {phase:?} phase for {kind:?}")))?;
        *slot = Some(Box::new(hook) as Hook);
        Ok(())
    }

    /// Start a tween on a node. The starting value is the property's current
    /// value. Tweens on the same property are not deduplicated; each tick
    /// the last one in start order wins.
    pub fn animate(&mut self, id: NodeId, spec: TweenSpec) -> Result<()> {
        let node = self.get_mut(id)?;
        let from = match spec.target {
            TweenValue::Opacity(_) => TweenValue::Opacity(node.opacity),
            TweenValue::Position(_) => TweenValue::Position(node.position),
        };
        node.tweens.push(Tween::start(from, spec));
        Ok(())
    }

    /// Run a closure against a node's widget, downcast to `W`.
    pub fn with_widget<W, R>(&mut self, id: NodeId, f: impl FnOnce(&mut W) -> R) -> Result<R>
    where
        W: Widget,
    {
        let node = self.get_mut(id)?;
        let any = node
            .widget
            .as_deref_mut()
            .map(|w| w as &mut dyn Any)
            .ok_or_else(|| Error::Invalid(format!("{} has no widget", node.name)))?;
        let widget = any.downcast_mut::<W>().ok_or_else(|| {
            Error::Invalid(format!("expected widget type {}", type_name::<W>()))
        })?;
        Ok(f(widget))
    }

    /// Advance tweens and widgets by `dt`, across the whole attached tree.
    /// Hidden nodes still tick. Queued edits are applied afterwards.
    pub fn update(&mut self, dt: Duration) -> Result<()> {
        self.update_node(self.root, dt)?;
        self.apply_deferred();
        Ok(())
    }

    /// Update one node, then its children.
    fn update_node(&mut self, id: NodeId, dt: Duration) -> Result<()> {
        if !self.get(id)?.tweens.is_empty() {
            self.step_tweens(id, dt)?;
        }
        let node = self.get_mut(id)?;
        if let Some(w) = node.widget.as_mut() {
            w.update(dt);
        }
        for child in node.children.clone() {
            if self.contains(child) {
                self.update_node(child, dt)?;
            }
        }
        Ok(())
    }

    /// Advance a node's tweens, apply their values, drop the finished ones
    /// and fire their callbacks.
    fn step_tweens(&mut self, id: NodeId, dt: Duration) -> Result<()> {
        let mut tweens = mem::take(&mut self.get_mut(id)?.tweens);
        let mut callbacks = Vec::new();
        for tween in &mut tweens {
            let (value, callback) = tween.advance(dt);
            match value {
                TweenValue::Opacity(o) => self.get_mut(id)?.opacity = o,
                TweenValue::Position(p) => self.set_position(id, p.x, p.y)?,
            }
            callbacks.extend(callback);
        }
        tweens.retain(|t| !t.is_complete());
        self.get_mut(id)?.tweens = tweens;
        for callback in callbacks {
            callback(&mut self.deferred);
        }
        Ok(())
    }

    /// Queue a screen switch for the owner of the screens.
    pub fn request_screen(&mut self, request: ScreenRequest) {
        match request {
            ScreenRequest::Set { name, transition } => self.deferred.set_screen(name, transition),
            ScreenRequest::Back(transition) => self.deferred.go_back(transition),
        }
    }

    /// Take the screen switches queued by hooks, callbacks and deferred
    /// edits, in request order.
    pub fn take_screen_requests(&mut self) -> Vec<ScreenRequest> {
        self.deferred.drain_screens()
    }

    /// Nodes that received the current press. Empty between gestures.
    pub fn pressed(&self) -> &[NodeId] {
        &self.pressed
    }

    /// Run edits queued during a pass.
    fn apply_deferred(&mut self) {
        for op in self.deferred.drain() {
            if let Err(e) = op(self) {
                error!("deferred tree edit failed: {e}");
            }
        }
    }

    /// Draw the tree into `target`, which should be the size of the root.
    pub fn draw(&mut self, target: &mut dyn DrawTarget) -> Result<()> {
        self.draw_node(self.root, target)
    }

    /// Draw a node and, unless it is hidden, its subtree. A widget that fails
    /// to draw is logged and its children are still drawn.
    fn draw_node(&mut self, id: NodeId, target: &mut dyn DrawTarget) -> Result<()> {
        let node = self.get_mut(id)?;
        if !node.visible {
            return Ok(());
        }
        let info = node.info();
        let drawn = match node.widget.as_mut() {
            Some(w) => w.draw(&info, target),
            None => info.paint_background(target),
        };
        if let Err(e) = drawn {
            error!("draw failed for {}: {e}", node.name);
        }
        for child in node.children.clone() {
            let Some(c) = self.nodes.get(child) else {
                continue;
            };
            let r = c.rect();
            if r.is_empty() {
                trace!("skipping empty node {}", c.name);
                continue;
            }
            let mut through = DrawThroughContext::new(&mut *target, r.x, r.y, r.w, r.h)?;
            self.draw_node(child, &mut through)?;
        }
        Ok(())
    }

    /// Clear the press flag on every node that received the current press.
    pub fn clear_maybe_clicked(&mut self) {
        for id in self.pressed.drain(..) {
            if let Some(i) = self.nodes.get_mut(id).and_then(|n| n.interaction.as_mut()) {
                i.maybe_clicked = false;
            }
        }
    }

    /// Dispatch a press from the root.
    pub fn mouse_down(&mut self, e: &mut MouseEvt) -> Result<()> {
        dispatch::down(self, self.root, e);
        self.apply_deferred();
        Ok(())
    }

    /// Dispatch a release from the root. Hosts normally want
    /// [`Tree::mouse_up_gesture`].
    pub fn mouse_up(&mut self, e: &mut MouseEvt) -> Result<()> {
        dispatch::up(self, self.root, e);
        self.apply_deferred();
        Ok(())
    }

    /// Dispatch a click from the root. Only nodes that received the current
    /// press are eligible.
    pub fn click(&mut self, e: &mut MouseEvt) -> Result<()> {
        dispatch::click(self, self.root, e);
        self.apply_deferred();
        Ok(())
    }

    /// Dispatch a move from the root, synthesizing enter and leave along the
    /// way.
    pub fn mouse_move(&mut self, e: &mut MouseEvt) -> Result<()> {
        dispatch::motion(self, self.root, e);
        self.apply_deferred();
        Ok(())
    }

    /// The pointer left the surface: unwind hover state from the root down.
    pub fn mouse_leave(&mut self, e: &mut MouseEvt) -> Result<()> {
        dispatch::leave(self, self.root, e);
        self.apply_deferred();
        Ok(())
    }

    /// End a gesture: dispatch the release, then a click if the root saw the
    /// press, then clear every press flag. The flags are cleared even if
    /// dispatch fails.
    pub fn mouse_up_gesture(&mut self, e: MouseEvt) -> Result<()> {
        let mut tree = scopeguard::guard(self, |t: &mut Self| t.clear_maybe_clicked());
        let mut up = e;
        tree.mouse_up(&mut up)?;
        let root = tree.root;
        if tree.get(root)?.maybe_clicked() {
            let mut click = e;
            tree.click(&mut click)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::*;
    use crate::{geom::Rect, testing::RecordingGiftbox};

    fn tree() -> Tree {
        Tree::new(Expanse::new(100, 60))
    }

    #[test]
    fn alignment() -> Result<()> {
        let mut t = tree();
        let root = t.root();
        let cases = [
            (HAlign::Left, VAlign::Top, Point::new(2, 3)),
            (HAlign::Center, VAlign::Center, Point::new(47, 30)),
            (HAlign::Right, VAlign::Bottom, Point::new(92, 58)),
        ];
        for (h, v, want) in cases {
            let c = t.add_to(
                root,
                NodeSpec::new("c").size(10, 5).position(2, 3).align(h, v),
            )?;
            assert_eq!(t.get(c)?.true_position(), want);
        }
        Ok(())
    }

    #[test]
    fn odd_difference_floors() -> Result<()> {
        let mut t = tree();
        let root = t.root();
        let c = t.add_to(
            root,
            NodeSpec::new("c")
                .size(11, 7)
                .align(HAlign::Center, VAlign::Center),
        )?;
        // (100 - 11) / 2 = 44.5, (60 - 7) / 2 = 26.5
        assert_eq!(t.get(c)?.true_position(), Point::new(44, 26));
        Ok(())
    }

    #[test]
    fn resize_repositions_children() -> Result<()> {
        let mut t = tree();
        let root = t.root();
        let panel = t.add_to(root, NodeSpec::new("panel").size(40, 40))?;
        let c = t.add_to(
            panel,
            NodeSpec::new("c")
                .size(10, 10)
                .align(HAlign::Right, VAlign::Center),
        )?;
        assert_eq!(t.get(c)?.true_position(), Point::new(30, 15));
        t.set_width(panel, 60)?;
        assert_eq!(t.get(c)?.true_position(), Point::new(50, 15));
        t.set_height(panel, 20)?;
        assert_eq!(t.get(c)?.true_position(), Point::new(50, 5));
        Ok(())
    }

    #[test]
    fn parenting() -> Result<()> {
        let mut t = tree();
        let root = t.root();
        let a = t.add(NodeSpec::new("a").size(5, 5).position(7, 7));
        assert_eq!(t.get(a)?.true_position(), Point::zero());
        t.add_child(root, a)?;
        assert_eq!(t.get(a)?.true_position(), Point::new(7, 7));
        assert_eq!(t.add_child(root, a), Err(Error::AlreadyParented(a)));
        assert_eq!(t.get(root)?.children(), &[a]);

        let b = t.add(NodeSpec::new("b"));
        assert!(t.add_child(a, root).is_err());
        // Removing a stranger is a logged no-op.
        t.remove_child(root, b)?;
        t.remove_child(root, a)?;
        assert_eq!(t.get(a)?.parent(), None);
        assert_eq!(t.get(a)?.true_position(), Point::zero());
        assert!(t.get(root)?.children().is_empty());
        Ok(())
    }

    #[test]
    fn remove_all_and_destroy() -> Result<()> {
        let mut t = tree();
        let root = t.root();
        let a = t.add_to(root, NodeSpec::new("a"))?;
        let b = t.add_to(root, NodeSpec::new("b"))?;
        let bb = t.add_to(b, NodeSpec::new("bb"))?;
        t.remove_all_children(root)?;
        assert!(t.get(root)?.children().is_empty());
        assert_eq!(t.get(a)?.parent(), None);
        assert!(!t.is_attached(bb));

        t.add_child(root, b)?;
        assert!(t.is_attached(bb));
        t.destroy(b)?;
        assert!(!t.contains(b));
        assert!(!t.contains(bb));
        assert!(t.get(root)?.children().is_empty());
        assert!(t.destroy(root).is_err());
        assert_eq!(t.len(), 2);
        Ok(())
    }

    #[test]
    fn serials_are_unique() {
        let mut t = tree();
        let a = t.add(NodeSpec::new("a"));
        let b = t.add(NodeSpec::new("b"));
        let sa = t.node(a).map(Node::serial);
        let sb = t.node(b).map(Node::serial);
        assert!(sa < sb);
    }

    #[test]
    fn draw_translates_and_skips_hidden() -> Result<()> {
        let (calls, mut screen) = RecordingGiftbox::create(100, 60)?;
        let mut t = tree();
        let root = t.root();
        let a = t.add_to(
            root,
            NodeSpec::new("a")
                .size(20, 20)
                .position(10, 10)
                .background(Rgba::RED),
        )?;
        let aa = t.add_to(
            a,
            NodeSpec::new("aa")
                .size(4, 4)
                .position(18, 1)
                .background(Rgba::BLUE),
        )?;
        t.draw(&mut screen)?;
        assert_eq!(calls.fills(Rgba::RED), vec![Rect::new(10, 10, 20, 20)]);
        // Clipped to the parent's right edge.
        assert_eq!(calls.fills(Rgba::BLUE), vec![Rect::new(28, 11, 2, 4)]);

        calls.take();
        t.show(a, false)?;
        t.draw(&mut screen)?;
        assert!(calls.is_empty());

        calls.take();
        t.show(a, true)?;
        t.show(aa, false)?;
        t.draw(&mut screen)?;
        assert_eq!(calls.len(), 1);
        Ok(())
    }

    #[test]
    fn hidden_nodes_still_tick() -> Result<()> {
        let mut t = tree();
        let root = t.root();
        let a = t.add_to(root, NodeSpec::new("a").visible(false))?;
        let done = Rc::new(Cell::new(0));
        let d = done.clone();
        t.animate(
            a,
            TweenSpec::position(10, 0, Duration::from_millis(100))
                .on_complete(move |_| d.set(d.get() + 1)),
        )?;
        t.update(Duration::from_millis(100))?;
        assert_eq!(t.get(a)?.position(), Point::new(10, 0));
        assert_eq!(t.get(a)?.tween_count(), 0);
        t.update(Duration::from_millis(100))?;
        assert_eq!(done.get(), 1);
        Ok(())
    }

    #[test]
    fn callbacks_edit_after_pass() -> Result<()> {
        let mut t = tree();
        let root = t.root();
        let a = t.add_to(root, NodeSpec::new("a"))?;
        t.animate(
            a,
            TweenSpec::opacity(0.0, Duration::ZERO).on_complete(move |d| {
                d.defer(move |t| t.destroy(a));
            }),
        )?;
        t.update(Duration::from_millis(16))?;
        assert!(!t.contains(a));
        Ok(())
    }

    #[test]
    fn hooks_need_interaction() {
        let mut t = tree();
        let a = t.add(NodeSpec::new("a"));
        assert!(t.on(a, MouseKind::Click, Phase::Bubble, |_, _| {}).is_err());
        let root = t.root();
        assert!(t.on(root, MouseKind::Enter, Phase::Capture, |_, _| {}).is_err());
        assert!(t.enable(a, false).is_err());
    }
}
