//! Trellis: a small retained-mode scene graph.
//!
//! Trellis keeps a tree of positioned, clipped, alignable nodes in an arena.
//! Each frame the host calls [`Tree::update`] and then [`Tree::draw`]; drawing
//! recurses through the tree, handing every child a [`DrawThroughContext`]
//! scoped to the child's rectangle so the child can paint at its own origin
//! while the pixels land, clipped, in an ancestor's backed surface.
//!
//! # Module Organization
//!
//! - [`geom`] - Geometry primitives (Rect, Point, Expanse, alignment)
//! - [`draw`] - Draw targets, backed surfaces and the clipping proxy
//! - [`tree`] - The node arena, layout and traversal
//! - [`event`] - Mouse events and dispatch through the tree
//! - [`tween`] - Time-based property animation
//! - [`widgets`] - Label, Button, Bitmap and Sprite
//! - [`screen`] - Whole-canvas screens swapped under the root
//! - [`stage`] - The frame loop tying a tree to a pair of surfaces
//! - [`soft`] - A software backend that owns real pixels

#![warn(missing_docs)]

pub mod color;
pub mod draw;
pub mod error;
pub mod event;
pub mod font;
pub mod hooks;
pub mod id;
pub mod node;
pub mod screen;
pub mod soft;
pub mod sprite;
pub mod stage;
pub mod testing;
pub mod tree;
pub mod tween;
pub mod widget;
pub mod widgets;

/// Geometry primitives, re-exported from `trellis-geom`.
pub mod geom {
    pub use trellis_geom::*;
}

pub use color::Rgba;
pub use draw::{Blit, ConcreteContext, DrawTarget, DrawThroughContext, Giftbox, SurfaceFactory};
pub use error::{Error, Result};
pub use event::{MouseEvt, MouseKind, Phase, RawPointer};
pub use hooks::Deferred;
pub use id::NodeId;
pub use node::{Node, NodeSpec};
pub use screen::{BasicScreen, Screen, ScreenManager, ScreenRequest, Transition};
pub use stage::{Stage, StageConfig};
pub use tree::Tree;
pub use tween::{Easing, TweenMode, TweenSpec, TweenValue};
pub use widget::{NodeInfo, Widget};
