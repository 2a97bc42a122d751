//! The stage: a tree, its screens, and the surfaces it renders to.
//!
//! The tree is drawn at a fixed logical resolution into a backbuffer, and the
//! backbuffer is then scaled onto the output surface. Pointer positions arrive
//! in output pixels and are divided down by the pixel scale.

use std::{
    thread,
    time::{Duration, Instant},
};

use serde::Deserialize;
use tracing::{debug, error};

use crate::{
    color::Rgba,
    draw::{Blit, ConcreteContext, DrawTarget, SurfaceFactory, dims},
    error::{Error, Result},
    event::{MouseEvt, RawPointer},
    geom::{Expanse, Rect},
    screen::{Screen, ScreenManager, Transition},
    tree::Tree,
};

/// Stage configuration. Every field has a default, so a partial JSON object
/// is a valid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StageConfig {
    /// Logical canvas width.
    pub logical_width: i32,
    /// Logical canvas height.
    pub logical_height: i32,
    /// Output pixels per logical pixel.
    pub pixel_scale: i32,
    /// Target frames per second for [`Stage::run`].
    pub fps: u32,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            logical_width: 160,
            logical_height: 120,
            pixel_scale: 4,
            fps: 60,
        }
    }
}

impl StageConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the logical canvas size.
    pub fn with_logical_size(mut self, w: i32, h: i32) -> Self {
        self.logical_width = w;
        self.logical_height = h;
        self
    }

    /// Set the pixel scale.
    pub fn with_pixel_scale(mut self, scale: i32) -> Self {
        self.pixel_scale = scale;
        self
    }

    /// Set the frame rate.
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// The logical canvas size.
    pub fn logical_size(&self) -> Expanse {
        Expanse::new(self.logical_width, self.logical_height)
    }

    /// Time budget for one frame.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }

    /// Reject sizes and scales that cannot back a surface.
    fn validate(&self) -> Result<()> {
        dims(self.logical_width, self.logical_height)?;
        if self.pixel_scale <= 0 {
            return Err(Error::Invalid(format!(
                "pixel scale must be positive, got {}",
                self.pixel_scale
            )));
        }
        Ok(())
    }
}

/// A tree bound to a backbuffer and an output surface.
pub struct Stage {
    /// Active configuration.
    config: StageConfig,
    /// The scene.
    tree: Tree,
    /// Screens mounted under the tree root.
    screens: ScreenManager,
    /// Logical-resolution render target.
    backbuffer: ConcreteContext,
    /// Surface the backbuffer is scaled onto.
    output: ConcreteContext,
}

impl Stage {
    /// Build a stage drawing onto `output`. The backbuffer is created from
    /// `factory` at the logical size.
    pub fn new(
        config: StageConfig,
        factory: &dyn SurfaceFactory,
        output: ConcreteContext,
    ) -> Result<Self> {
        config.validate()?;
        let backbuffer = factory.create_concrete(config.logical_width, config.logical_height)?;
        debug!(
            "stage {}x{} at scale {}",
            config.logical_width, config.logical_height, config.pixel_scale
        );
        Ok(Self {
            tree: Tree::new(config.logical_size()),
            screens: ScreenManager::new(),
            config,
            backbuffer,
            output,
        })
    }

    /// The configuration.
    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// The scene.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// The scene, mutably.
    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    /// The screen manager.
    pub fn screens(&self) -> &ScreenManager {
        &self.screens
    }

    /// The logical render target.
    pub fn backbuffer(&self) -> &ConcreteContext {
        &self.backbuffer
    }

    /// The output surface.
    pub fn output(&self) -> &ConcreteContext {
        &self.output
    }

    /// Register a screen.
    pub fn register_screen(&mut self, name: impl Into<String>, screen: impl Screen + 'static) {
        self.screens.register(name, screen);
    }

    /// Mount a registered screen.
    pub fn set_screen(&mut self, name: &str, transition: Transition) -> Result<()> {
        self.screens.set_screen(&mut self.tree, name, transition)
    }

    /// Return to the previous screen.
    pub fn go_back(&mut self, transition: Transition) -> Result<bool> {
        self.screens.go_back(&mut self.tree, transition)
    }

    /// Carry out screen switches queued by hooks and tween callbacks. A
    /// failed switch is logged and the rest still run.
    fn apply_screen_requests(&mut self) {
        for request in self.tree.take_screen_requests() {
            if let Err(e) = self.screens.apply(&mut self.tree, request) {
                error!("screen switch failed: {e}");
            }
        }
    }

    /// Render one frame: clear, update, switch screens, draw, then present.
    pub fn tick(&mut self, dt: Duration) -> Result<()> {
        self.output.clear(Rgba::BLANK)?;
        self.backbuffer.clear(Rgba::BLANK)?;
        self.tree.update(dt)?;
        self.apply_screen_requests();
        self.tree.draw(&mut self.backbuffer)?;
        let dest = Rect::new(
            0,
            0,
            self.config.logical_width * self.config.pixel_scale,
            self.config.logical_height * self.config.pixel_scale,
        );
        self.output
            .push_draw_concrete(dest, &self.backbuffer, Blit::default())
    }

    /// Convert a raw pointer position to a logical event.
    fn event(&self, raw: RawPointer) -> MouseEvt {
        MouseEvt::from_raw(raw, self.config.pixel_scale)
    }

    /// Pointer pressed.
    pub fn pointer_down(&mut self, raw: RawPointer) -> Result<()> {
        let mut e = self.event(raw);
        self.tree.mouse_down(&mut e)?;
        self.apply_screen_requests();
        Ok(())
    }

    /// Pointer released. Dispatches the release and any resulting click.
    pub fn pointer_up(&mut self, raw: RawPointer) -> Result<()> {
        let e = self.event(raw);
        self.tree.mouse_up_gesture(e)?;
        self.apply_screen_requests();
        Ok(())
    }

    /// Pointer moved.
    pub fn pointer_move(&mut self, raw: RawPointer) -> Result<()> {
        let mut e = self.event(raw);
        self.tree.mouse_move(&mut e)?;
        self.apply_screen_requests();
        Ok(())
    }

    /// Pointer left the output surface.
    pub fn pointer_leave(&mut self, raw: RawPointer) -> Result<()> {
        let mut e = self.event(raw);
        self.tree.mouse_leave(&mut e)?;
        self.apply_screen_requests();
        Ok(())
    }

    /// Run frames at the configured rate until `keep_running` returns false.
    /// A failed frame is logged and the loop carries on.
    pub fn run(&mut self, mut keep_running: impl FnMut(&mut Self) -> bool) {
        let interval = self.config.frame_interval();
        let mut last = Instant::now();
        while keep_running(self) {
            let start = Instant::now();
            let dt = start.duration_since(last);
            last = start;
            if let Err(e) = self.tick(dt) {
                error!("frame failed: {e}");
            }
            let spent = start.elapsed();
            if spent < interval {
                thread::sleep(interval - spent);
            }
        }
    }
}
