//! Per-node mouse hooks and deferred tree edits.

use std::{fmt, mem};

use crate::{
    error::Result,
    event::{MouseEvt, MouseKind, Phase},
    screen::{ScreenRequest, Transition},
    tree::Tree,
};

/// A queued tree edit.
type DeferredOp = Box<dyn FnOnce(&mut Tree) -> Result<()>>;

/// Tree edits queued from inside a dispatch or update pass.
///
/// Hooks and tween callbacks run while the tree is iterating child lists, so
/// they cannot edit the tree directly. Edits pushed here run once the pass
/// has finished, in the order they were queued. Screen switches are held
/// for whoever owns the screens, normally the [`Stage`](crate::stage::Stage).
#[derive(Default)]
pub struct Deferred {
    /// Pending edits.
    ops: Vec<DeferredOp>,
    /// Pending screen switches.
    screens: Vec<ScreenRequest>,
}

impl Deferred {
    /// Queue an edit.
    pub fn defer(&mut self, op: impl FnOnce(&mut Tree) -> Result<()> + 'static) {
        self.ops.push(Box::new(op));
    }

    /// Ask for a registered screen to be mounted.
    pub fn set_screen(&mut self, name: impl Into<String>, transition: Transition) {
        self.screens.push(ScreenRequest::Set {
            name: name.into(),
            transition,
        });
    }

    /// Ask to return to the previous screen.
    pub fn go_back(&mut self, transition: Transition) {
        self.screens.push(ScreenRequest::Back(transition));
    }

    /// Number of queued edits.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// True if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Take all queued edits.
    pub(crate) fn drain(&mut self) -> Vec<DeferredOp> {
        mem::take(&mut self.ops)
    }

    /// Take all queued screen switches.
    pub(crate) fn drain_screens(&mut self) -> Vec<ScreenRequest> {
        mem::take(&mut self.screens)
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("ops", &self.ops.len())
            .field("screens", &self.screens)
            .finish()
    }
}

/// A mouse hook.
pub type Hook = Box<dyn FnMut(&mut MouseEvt, &mut Deferred)>;

/// The optional hooks of an interactive node.
///
/// Capture hooks run before the event descends to a child, bubble hooks after
/// it returns. Enter and leave have no capture phase.
#[derive(Default)]
pub struct Hooks {
    /// Bubble-phase move.
    pub on_mouse_move: Option<Hook>,
    /// Capture-phase move.
    pub on_mouse_move_capture: Option<Hook>,
    /// Bubble-phase press.
    pub on_mouse_down: Option<Hook>,
    /// Capture-phase press.
    pub on_mouse_down_capture: Option<Hook>,
    /// Bubble-phase release.
    pub on_mouse_up: Option<Hook>,
    /// Capture-phase release.
    pub on_mouse_up_capture: Option<Hook>,
    /// Bubble-phase click.
    pub on_click: Option<Hook>,
    /// Capture-phase click.
    pub on_click_capture: Option<Hook>,
    /// Pointer entered.
    pub on_mouse_enter: Option<Hook>,
    /// Pointer left.
    pub on_mouse_leave: Option<Hook>,
}

impl Hooks {
    /// The slot for a kind and phase, or `None` if that combination does not
    /// exist.
    pub fn slot_mut(&mut self, kind: MouseKind, phase: Phase) -> Option<&mut Option<Hook>> {
        Some(match (kind, phase) {
            (MouseKind::Move, Phase::Bubble) => &mut self.on_mouse_move,
            (MouseKind::Move, Phase::Capture) => &mut self.on_mouse_move_capture,
            (MouseKind::Down, Phase::Bubble) => &mut self.on_mouse_down,
            (MouseKind::Down, Phase::Capture) => &mut self.on_mouse_down_capture,
            (MouseKind::Up, Phase::Bubble) => &mut self.on_mouse_up,
            (MouseKind::Up, Phase::Capture) => &mut self.on_mouse_up_capture,
            (MouseKind::Click, Phase::Bubble) => &mut self.on_click,
            (MouseKind::Click, Phase::Capture) => &mut self.on_click_capture,
            (MouseKind::Enter, Phase::Bubble) => &mut self.on_mouse_enter,
            (MouseKind::Leave, Phase::Bubble) => &mut self.on_mouse_leave,
            (MouseKind::Enter | MouseKind::Leave, Phase::Capture) => return None,
        })
    }

    /// Run the hook for a kind and phase, if one is installed.
    pub(crate) fn fire(
        &mut self,
        kind: MouseKind,
        phase: Phase,
        e: &mut MouseEvt,
        deferred: &mut Deferred,
    ) {
        if let Some(Some(hook)) = self.slot_mut(kind, phase) {
            hook(e, deferred);
        }
    }
}
