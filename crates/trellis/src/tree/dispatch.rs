//! Capture/bubble mouse dispatch.
//!
//! Each kind of event enters at the root and descends into at most one child
//! per level. Press, release and move pick the topmost child under the
//! pointer; click picks the bottom-most one, and only if it saw the press. A
//! matching child that is disabled or not interactive still ends the search.

use super::Tree;
use crate::{
    event::{MouseEvt, MouseKind, Phase},
    geom::Point,
    id::NodeId,
};

/// Child search order.
#[derive(Clone, Copy)]
enum Order {
    /// Last child first.
    Topmost,
    /// First child first.
    Bottommost,
}

/// The first child of `id` whose rectangle contains `p`.
fn hit(tree: &Tree, id: NodeId, p: Point, order: Order) -> Option<NodeId> {
    let node = tree.nodes.get(id)?;
    let under = |c: &&NodeId| tree.nodes.get(**c).is_some_and(|n| n.rect().contains_point(p));
    match order {
        Order::Topmost => node.children.iter().rev().find(under).copied(),
        Order::Bottommost => node.children.iter().find(under).copied(),
    }
}

/// Can this node receive dispatched events?
fn eligible(tree: &Tree, id: NodeId) -> bool {
    tree.nodes.get(id).is_some_and(|n| n.is_active())
}

/// Translate an event into a child's space.
fn into_child(tree: &Tree, child: NodeId, e: &MouseEvt) -> MouseEvt {
    let p = tree
        .nodes
        .get(child)
        .map_or(Point::zero(), |n| n.true_position);
    e.translated(p.x, p.y)
}

/// Let the node's widget observe the event.
fn notify(tree: &mut Tree, id: NodeId, kind: MouseKind, e: &MouseEvt) {
    if let Some(node) = tree.nodes.get_mut(id) {
        let info = node.info();
        if let Some(w) = node.widget.as_mut() {
            w.on_mouse(kind, e, &info);
        }
    }
}

/// Run the node's hook for a kind and phase.
fn fire(tree: &mut Tree, id: NodeId, kind: MouseKind, phase: Phase, e: &mut MouseEvt) {
    let Tree {
        nodes, deferred, ..
    } = tree;
    if let Some(node) = nodes.get_mut(id) {
        node.hooks.fire(kind, phase, e, deferred);
    }
}

/// Descend into `child` with `recurse`. Returns true if the child stopped the
/// event, in which case it is stopped for us too.
fn descend(
    tree: &mut Tree,
    child: NodeId,
    e: &mut MouseEvt,
    recurse: fn(&mut Tree, NodeId, &mut MouseEvt),
) -> bool {
    let mut ce = into_child(tree, child, e);
    recurse(tree, child, &mut ce);
    if ce.is_stopped() {
        e.stop_propagation();
    }
    ce.is_stopped()
}

/// Press.
pub(super) fn down(tree: &mut Tree, id: NodeId, e: &mut MouseEvt) {
    if let Some(i) = tree.nodes.get_mut(id).and_then(|n| n.interaction.as_mut()) {
        i.maybe_clicked = true;
        tree.pressed.push(id);
    }
    notify(tree, id, MouseKind::Down, e);
    fire(tree, id, MouseKind::Down, Phase::Capture, e);
    if e.is_stopped() {
        return;
    }
    if let Some(child) = hit(tree, id, e.local(), Order::Topmost)
        && eligible(tree, child)
        && descend(tree, child, e, down)
    {
        return;
    }
    fire(tree, id, MouseKind::Down, Phase::Bubble, e);
}

/// Release.
pub(super) fn up(tree: &mut Tree, id: NodeId, e: &mut MouseEvt) {
    notify(tree, id, MouseKind::Up, e);
    fire(tree, id, MouseKind::Up, Phase::Capture, e);
    if e.is_stopped() {
        return;
    }
    if let Some(child) = hit(tree, id, e.local(), Order::Topmost)
        && eligible(tree, child)
        && descend(tree, child, e, up)
    {
        return;
    }
    fire(tree, id, MouseKind::Up, Phase::Bubble, e);
}

/// Click. Unlike the other kinds, the bottom-most child under the pointer is
/// considered, and it must have received the press.
pub(super) fn click(tree: &mut Tree, id: NodeId, e: &mut MouseEvt) {
    notify(tree, id, MouseKind::Click, e);
    fire(tree, id, MouseKind::Click, Phase::Capture, e);
    if e.is_stopped() {
        return;
    }
    if let Some(child) = hit(tree, id, e.local(), Order::Bottommost)
        && eligible(tree, child)
        && tree.nodes.get(child).is_some_and(|n| n.maybe_clicked())
        && descend(tree, child, e, click)
    {
        return;
    }
    fire(tree, id, MouseKind::Click, Phase::Bubble, e);
}

/// Pointer entered. Does not descend: the child under the pointer is found by
/// the next move.
pub(super) fn enter(tree: &mut Tree, id: NodeId, e: &mut MouseEvt) {
    notify(tree, id, MouseKind::Enter, e);
    fire(tree, id, MouseKind::Enter, Phase::Bubble, e);
}

/// Pointer left. The hovered child is unwound first.
pub(super) fn leave(tree: &mut Tree, id: NodeId, e: &mut MouseEvt) {
    let last = tree
        .nodes
        .get_mut(id)
        .and_then(|n| n.interaction.as_mut())
        .and_then(|i| i.last_move_target.take());
    if let Some(last) = last
        && eligible(tree, last)
    {
        let mut le = into_child(tree, last, e);
        leave(tree, last, &mut le);
    }
    notify(tree, id, MouseKind::Leave, e);
    fire(tree, id, MouseKind::Leave, Phase::Bubble, e);
}

/// Record the child under the pointer.
fn set_hovered(tree: &mut Tree, id: NodeId, hovered: Option<NodeId>) {
    if let Some(i) = tree.nodes.get_mut(id).and_then(|n| n.interaction.as_mut()) {
        i.last_move_target = hovered;
    }
}

/// Move. Hover changes are synthesized before the move descends: leave on
/// the previously hovered child, then enter on the new one.
pub(super) fn motion(tree: &mut Tree, id: NodeId, e: &mut MouseEvt) {
    notify(tree, id, MouseKind::Move, e);
    fire(tree, id, MouseKind::Move, Phase::Capture, e);
    if e.is_stopped() {
        return;
    }
    let last = tree
        .nodes
        .get(id)
        .and_then(|n| n.interaction)
        .and_then(|i| i.last_move_target);
    let target = hit(tree, id, e.local(), Order::Topmost);
    if target != last
        && let Some(old) = last
        && eligible(tree, old)
    {
        let mut le = into_child(tree, old, e);
        leave(tree, old, &mut le);
    }
    set_hovered(tree, id, target);
    if let Some(child) = target
        && eligible(tree, child)
    {
        if target != last {
            let mut ee = into_child(tree, child, e);
            enter(tree, child, &mut ee);
        }
        if descend(tree, child, e, motion) {
            return;
        }
    }
    fire(tree, id, MouseKind::Move, Phase::Bubble, e);
}
