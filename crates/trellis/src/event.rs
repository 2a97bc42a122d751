//! Mouse events.
//!
//! Dispatch itself lives on [`Tree`](crate::tree::Tree); this module holds the
//! event value and the input it is built from.

use crate::geom::Point;

/// The kinds of mouse event routed through the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseKind {
    /// Pointer motion.
    Move,
    /// Button press.
    Down,
    /// Button release.
    Up,
    /// A press and release on the same node.
    Click,
    /// The pointer entered a node. Synthesized from moves.
    Enter,
    /// The pointer left a node. Synthesized from moves.
    Leave,
}

/// Dispatch phase. Capture runs on the way down, bubble on the way back up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Before descending into a child.
    Capture,
    /// After the child returns.
    Bubble,
}

/// Raw pointer input in device pixels, relative to the output surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawPointer {
    /// Horizontal offset in device pixels.
    pub offset_x: f64,
    /// Vertical offset in device pixels.
    pub offset_y: f64,
}

impl RawPointer {
    /// Construct from offsets relative to the output surface.
    pub fn new(offset_x: f64, offset_y: f64) -> Self {
        Self { offset_x, offset_y }
    }

    /// Construct from page coordinates and the surface's page origin, for
    /// hosts that cannot report surface-relative offsets.
    pub fn from_page(page_x: f64, page_y: f64, origin_left: f64, origin_top: f64) -> Self {
        Self {
            offset_x: page_x - origin_left,
            offset_y: page_y - origin_top,
        }
    }
}

/// A mouse event as seen by one node.
///
/// `x` and `y` are local to the node currently receiving the event. The
/// screen coordinates are root logical coordinates and survive translation
/// unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvt {
    /// Local horizontal coordinate.
    pub x: i32,
    /// Local vertical coordinate.
    pub y: i32,
    /// Horizontal coordinate at the root.
    pub screen_x: i32,
    /// Vertical coordinate at the root.
    pub screen_y: i32,
    /// Set by [`MouseEvt::stop_propagation`].
    stopped: bool,
}

impl MouseEvt {
    /// An event at root logical coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            screen_x: x,
            screen_y: y,
            stopped: false,
        }
    }

    /// Convert raw device-pixel input to logical coordinates by dividing by
    /// `pixel_scale` and flooring.
    pub fn from_raw(raw: RawPointer, pixel_scale: i32) -> Self {
        let scale = f64::from(pixel_scale.max(1));
        Self::new(
            (raw.offset_x / scale).floor() as i32,
            (raw.offset_y / scale).floor() as i32,
        )
    }

    /// A fresh event for a child whose true position is `(left, top)` in
    /// this event's space.
    pub fn translated(&self, left: i32, top: i32) -> Self {
        Self {
            x: self.x - left,
            y: self.y - top,
            screen_x: self.screen_x,
            screen_y: self.screen_y,
            stopped: false,
        }
    }

    /// Alias for `x`.
    pub fn offset_x(&self) -> i32 {
        self.x
    }

    /// Alias for `y`.
    pub fn offset_y(&self) -> i32 {
        self.y
    }

    /// Local coordinates as a point.
    pub fn local(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Stop the event from descending further or bubbling back up.
    pub fn stop_propagation(&mut self) {
        self.stopped = true;
    }

    /// Has propagation been stopped?
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}
