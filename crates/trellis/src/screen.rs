//! Screens: whole-canvas subtrees swapped in and out under the root.

use std::collections::HashMap;

use tracing::debug;

use crate::{
    error::{Error, Result},
    geom::Expanse,
    id::NodeId,
    node::NodeSpec,
    tree::Tree,
};

/// A subtree that fills the stage and can be mounted under the root.
pub trait Screen {
    /// The subtree's top node.
    fn root(&self) -> NodeId;

    /// Called before the screen is attached.
    fn before_mount(&mut self, _tree: &mut Tree) -> Result<()> {
        Ok(())
    }

    /// Called before the screen is detached.
    fn before_unmount(&mut self, _tree: &mut Tree) -> Result<()> {
        Ok(())
    }
}

/// A screen with no behavior of its own: just an interactive container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicScreen {
    /// Container node.
    root: NodeId,
}

impl BasicScreen {
    /// Create the container node, detached.
    pub fn new(tree: &mut Tree, name: &str, size: Expanse) -> Self {
        Self {
            root: tree.add(NodeSpec::new(name).size(size.w, size.h).interactive()),
        }
    }
}

impl Screen for BasicScreen {
    fn root(&self) -> NodeId {
        self.root
    }
}

/// How one screen replaces another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transition {
    /// Swap immediately.
    #[default]
    Cut,
}

/// A screen switch queued from inside a dispatch or update pass, through
/// [`Deferred`](crate::hooks::Deferred).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenRequest {
    /// Mount a registered screen.
    Set {
        /// Registered name.
        name: String,
        /// How to swap.
        transition: Transition,
    },
    /// Return to the previous screen.
    Back(Transition),
}

/// Tracks registered screens and which one is mounted.
#[derive(Default)]
pub struct ScreenManager {
    /// Registered screens by name.
    screens: HashMap<String, Box<dyn Screen>>,
    /// Mounted screen.
    current: Option<String>,
    /// Screen mounted before the current one.
    previous: Option<String>,
}

impl ScreenManager {
    /// An empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a screen, replacing any screen of the same name.
    pub fn register(&mut self, name: impl Into<String>, screen: impl Screen + 'static) {
        self.screens.insert(name.into(), Box::new(screen));
    }

    /// Name of the mounted screen.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Name of the previously mounted screen.
    pub fn previous(&self) -> Option<&str> {
        self.previous.as_deref()
    }

    /// Root node of a registered screen.
    pub fn root_of(&self, name: &str) -> Option<NodeId> {
        self.screens.get(name).map(|s| s.root())
    }

    /// Mount a screen under the tree root, unmounting the current one. The
    /// new screen is attached before the old one is detached. Setting the
    /// mounted screen again does nothing.
    pub fn set_screen(&mut self, tree: &mut Tree, name: &str, transition: Transition) -> Result<()> {
        if !self.screens.contains_key(name) {
            return Err(Error::UnknownScreen(name.into()));
        }
        if self.current.as_deref() == Some(name) {
            return Ok(());
        }
        debug!("switching to screen {name} ({transition:?})");
        let mount = tree.root();
        match transition {
            Transition::Cut => {
                if let Some(next) = self.screens.get_mut(name) {
                    next.before_mount(tree)?;
                    tree.add_child(mount, next.root())?;
                }
                if let Some(cur) = self.current.as_deref().and_then(|c| self.screens.get_mut(c)) {
                    cur.before_unmount(tree)?;
                    tree.remove_child(mount, cur.root())?;
                }
            }
        }
        self.previous = self.current.replace(name.into());
        Ok(())
    }

    /// Carry out a queued request.
    pub fn apply(&mut self, tree: &mut Tree, request: ScreenRequest) -> Result<()> {
        match request {
            ScreenRequest::Set { name, transition } => self.set_screen(tree, &name, transition),
            ScreenRequest::Back(transition) => self.go_back(tree, transition).map(|_| ()),
        }
    }

    /// Return to the previous screen, if there is one. Returns whether a
    /// switch happened.
    pub fn go_back(&mut self, tree: &mut Tree, transition: Transition) -> Result<bool> {
        let Some(prev) = self.previous.clone() else {
            return Ok(false);
        };
        self.set_screen(tree, &prev, transition)?;
        Ok(true)
    }
}
