//! Test backends and helpers.
//!
//! [`RecordingGiftbox`] stands in for a real backend and records every call it
//! receives, so draw traversals can be asserted call-for-call.

use std::{
    any::Any,
    cell::{Cell, RefCell},
    rc::Rc,
};

use image::RgbaImage;
use tracing::Level;
use tracing_subscriber::fmt;

use crate::{
    color::Rgba,
    draw::{Blit, ConcreteContext, Giftbox},
    error::{Error, Result},
    geom::{Expanse, Rect},
};

/// A single call received by a [`RecordingGiftbox`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    /// A rectangle fill.
    Fill {
        /// Destination in surface coordinates.
        dest: Rect,
        /// Fill color.
        color: Rgba,
    },
    /// A blit from another surface.
    Concrete {
        /// Destination in surface coordinates.
        dest: Rect,
        /// Blit options as received.
        blit: Blit,
    },
    /// An image upload, recorded by size.
    LoadImage(Expanse),
    /// A clear.
    Clear(Rgba),
    /// A release.
    Release,
}

/// Shared handle to the calls recorded by a [`RecordingGiftbox`].
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    /// Recorded calls, in arrival order.
    calls: Rc<RefCell<Vec<DrawCall>>>,
}

impl CallLog {
    /// Drain and return all recorded calls.
    pub fn take(&self) -> Vec<DrawCall> {
        self.calls.take()
    }

    /// A copy of all recorded calls.
    pub fn calls(&self) -> Vec<DrawCall> {
        self.calls.borrow().clone()
    }

    /// Destinations of all recorded fills of `color`.
    pub fn fills(&self, color: Rgba) -> Vec<Rect> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                DrawCall::Fill { dest, color: c } if *c == color => Some(*dest),
                _ => None,
            })
            .collect()
    }

    /// Number of recorded calls.
    pub fn len(&self) -> usize {
        self.calls.borrow().len()
    }

    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.calls.borrow().is_empty()
    }

    /// Append a call.
    fn push(&self, call: DrawCall) {
        self.calls.borrow_mut().push(call);
    }
}

/// A giftbox that records calls instead of drawing.
pub struct RecordingGiftbox {
    /// Call log shared with the test.
    log: CallLog,
    /// Set once `release` has been called.
    released: Cell<bool>,
}

impl RecordingGiftbox {
    /// Create a giftbox and the handle to its call log.
    pub fn handle() -> (CallLog, Rc<dyn Giftbox>) {
        let log = CallLog::default();
        let gb = Self {
            log: log.clone(),
            released: Cell::new(false),
        };
        (log, Rc::new(gb))
    }

    /// Create a recording surface of the given size.
    pub fn create(w: i32, h: i32) -> Result<(CallLog, ConcreteContext)> {
        let (log, gb) = Self::handle();
        Ok((log, ConcreteContext::new(gb, w, h)?))
    }

    /// Record a call, failing if the surface was released.
    fn record(&self, call: DrawCall) -> Result<()> {
        if self.released.get() {
            return Err(Error::Backend("surface released".into()));
        }
        self.log.push(call);
        Ok(())
    }
}

impl Giftbox for RecordingGiftbox {
    fn push_draw_fill_rect(&self, dest: Rect, color: Rgba) -> Result<()> {
        self.record(DrawCall::Fill { dest, color })
    }

    fn push_draw_concrete(&self, dest: Rect, _source: &ConcreteContext, blit: Blit) -> Result<()> {
        self.record(DrawCall::Concrete { dest, blit })
    }

    fn load_image(&self, image: &RgbaImage) -> Result<()> {
        let (w, h) = image.dimensions();
        self.record(DrawCall::LoadImage(Expanse::new(w as i32, h as i32)))
    }

    fn clear(&self, color: Rgba) -> Result<()> {
        self.record(DrawCall::Clear(color))
    }

    fn release(&self) -> Result<()> {
        self.record(DrawCall::Release)?;
        self.released.set(true);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Install a `tracing` subscriber that writes through the test harness.
/// Safe to call from every test.
pub fn init_tracing() {
    let format = fmt::format()
        .with_level(true)
        .with_line_number(true)
        .with_ansi(false)
        .without_time()
        .compact();
    tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(Level::TRACE)
        .event_format(format)
        .try_init()
        .ok();
}
