//! Sprite sheets and the frame registry.
//!
//! Two kinds of sheet metadata are supported. A [`SpriteRegistry`] indexes
//! frames packed onto one or more sheets by namespace and key, from "stitch"
//! metadata:
//!
//! ```json
//! { "_numSheets": 1, "ui": { "button": { "sheet": 0, "x": 0, "y": 0, "w": 16, "h": 8 } } }
//! ```
//!
//! A [`SpriteSheet`] is a single sheet with a flat frame list and named
//! animations over it, used by the [`Sprite`](crate::widgets::Sprite) widget.

use std::collections::HashMap;

use image::RgbaImage;
use serde::Deserialize;
use tracing::error;

use crate::{
    draw::{ConcreteContext, SurfaceFactory},
    error::{Error, Result},
    geom::Rect,
};

/// A frame resolved from the registry.
#[derive(Debug, Clone)]
pub struct SpriteFrame {
    /// Region on the sheet.
    pub rect: Rect,
    /// The sheet.
    pub sheet: ConcreteContext,
}

/// Placement of one frame in stitch metadata.
#[derive(Debug, Clone, Copy, Deserialize)]
struct FrameMeta {
    /// Sheet index.
    sheet: usize,
    /// Left edge.
    x: i32,
    /// Top edge.
    y: i32,
    /// Width.
    w: i32,
    /// Height.
    h: i32,
}

/// Stitch metadata as serialized.
#[derive(Debug, Deserialize)]
struct Stitch {
    /// Number of sheets the frames are spread over.
    #[serde(rename = "_numSheets")]
    num_sheets: usize,
    /// Frames by namespace, then key.
    #[serde(flatten)]
    namespaces: HashMap<String, HashMap<String, FrameMeta>>,
}

/// Frames packed onto backed sheets, looked up by namespace and key.
#[derive(Debug)]
pub struct SpriteRegistry {
    /// Sheets, by index.
    sheets: Vec<ConcreteContext>,
    /// Frame placements by namespace, then key.
    namespaces: HashMap<String, HashMap<String, FrameMeta>>,
}

impl SpriteRegistry {
    /// Build a registry over sheets that are already loaded. The number of
    /// sheets must match the metadata, and every frame must name a sheet
    /// that exists.
    pub fn from_metadata(json: &str, sheets: Vec<ConcreteContext>) -> Result<Self> {
        let stitch: Stitch = serde_json::from_str(json)?;
        if stitch.num_sheets != sheets.len() {
            return Err(Error::Metadata(format!(
                "metadata names {} sheets, {} supplied",
                stitch.num_sheets,
                sheets.len()
            )));
        }
        for (ns, frames) in &stitch.namespaces {
            for (key, f) in frames {
                if f.sheet >= sheets.len() {
                    return Err(Error::Metadata(format!(
                        "frame {ns}/{key} is on missing sheet {}",
                        f.sheet
                    )));
                }
            }
        }
        Ok(Self {
            sheets,
            namespaces: stitch.namespaces,
        })
    }

    /// Allocate a surface for each decoded sheet image, upload it, and build
    /// a registry over the result.
    pub fn load(json: &str, images: &[RgbaImage], factory: &dyn SurfaceFactory) -> Result<Self> {
        let mut sheets = Vec::with_capacity(images.len());
        for img in images {
            let (w, h) = img.dimensions();
            let sheet = factory.create_concrete(w as i32, h as i32)?;
            sheet.load_image(img)?;
            sheets.push(sheet);
        }
        Self::from_metadata(json, sheets)
    }

    /// Resolve a frame.
    pub fn frame(&self, namespace: &str, key: &str) -> Result<SpriteFrame> {
        let unknown = || Error::UnknownFrame {
            namespace: namespace.into(),
            key: key.into(),
        };
        let Some(frames) = self.namespaces.get(namespace) else {
            error!("could not find stitch namespace {namespace}");
            return Err(unknown());
        };
        let Some(f) = frames.get(key) else {
            error!("could not find frame with key {key} in namespace {namespace}");
            return Err(unknown());
        };
        let sheet = self.sheets.get(f.sheet).cloned().ok_or_else(unknown)?;
        Ok(SpriteFrame {
            rect: Rect::new(f.x, f.y, f.w, f.h),
            sheet,
        })
    }

    /// Number of sheets.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Release every sheet's backing storage.
    pub fn release(&self) -> Result<()> {
        for s in &self.sheets {
            s.release()?;
        }
        Ok(())
    }
}

/// A named frame sequence.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animation {
    /// Restart after the last frame.
    #[serde(default)]
    pub looping: bool,
    /// Time each frame is shown, in milliseconds.
    pub frame_duration: u64,
    /// Indices into the sheet's frame list.
    pub frames: Vec<usize>,
    /// Animation to play when a non-looping animation ends.
    #[serde(default)]
    pub transition: Option<String>,
}

/// Sprite sheet metadata as serialized.
#[derive(Debug, Deserialize)]
struct SheetMeta {
    /// Frame rectangles as `[x, y, w, h]`.
    frames: Vec<[i32; 4]>,
    /// Named animations.
    #[serde(default)]
    animations: HashMap<String, Animation>,
}

/// A sheet with a frame list and animations over it.
#[derive(Debug)]
pub struct SpriteSheet {
    /// Backing surface.
    sheet: ConcreteContext,
    /// Frame rectangles.
    frames: Vec<Rect>,
    /// Named animations.
    animations: HashMap<String, Animation>,
}

impl SpriteSheet {
    /// Construct a sheet. Every animation must have at least one frame and
    /// refer only to frames that exist.
    pub fn new(
        sheet: ConcreteContext,
        frames: Vec<Rect>,
        animations: HashMap<String, Animation>,
    ) -> Result<Self> {
        for (name, a) in &animations {
            if a.frames.is_empty() {
                return Err(Error::Metadata(format!("animation {name} has no frames")));
            }
            if let Some(bad) = a.frames.iter().find(|i| **i >= frames.len()) {
                return Err(Error::Metadata(format!(
                    "animation {name} refers to missing frame {bad}"
                )));
            }
        }
        Ok(Self {
            sheet,
            frames,
            animations,
        })
    }

    /// Parse `{"frames": [[x, y, w, h], ...], "animations": {...}}`.
    pub fn from_json(sheet: ConcreteContext, json: &str) -> Result<Self> {
        let meta: SheetMeta = serde_json::from_str(json)?;
        let frames = meta
            .frames
            .into_iter()
            .map(|[x, y, w, h]| Rect::new(x, y, w, h))
            .collect();
        Self::new(sheet, frames, meta.animations)
    }

    /// Backing surface.
    pub fn sheet(&self) -> &ConcreteContext {
        &self.sheet
    }

    /// A frame by index.
    pub fn frame(&self, idx: usize) -> Option<Rect> {
        self.frames.get(idx).copied()
    }

    /// An animation by name.
    pub fn animation(&self, name: &str) -> Option<&Animation> {
        self.animations.get(name)
    }
}
