//! Bitmap fonts.
//!
//! A font is a strip of glyphs on a backed surface plus a map from character
//! to the glyph's horizontal extent on that strip. All glyphs share one
//! height and start at the top of the strip. Fonts are lowercase only;
//! lookups fold case.

use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
};

use serde::Deserialize;
use tracing::error;

use crate::{
    draw::ConcreteContext,
    error::{Error, Result},
    geom::Rect,
};

/// Horizontal extent of one glyph on the font strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Glyph {
    /// Left edge.
    pub x: i32,
    /// Advance and width.
    pub w: i32,
}

/// Height of the built-in 7pt font.
pub const FAWNT_7PT_HEIGHT: i32 = 7;

/// Glyph table of the built-in 7pt font.
pub const FAWNT_7PT_MAP: &[(char, Glyph)] = &[
    ('a', Glyph { x: 0, w: 5 }),
    ('b', Glyph { x: 5, w: 5 }),
    ('c', Glyph { x: 10, w: 5 }),
    ('d', Glyph { x: 15, w: 5 }),
    ('e', Glyph { x: 20, w: 5 }),
    ('f', Glyph { x: 25, w: 5 }),
    ('g', Glyph { x: 30, w: 5 }),
    ('h', Glyph { x: 35, w: 5 }),
    ('i', Glyph { x: 40, w: 4 }),
    ('j', Glyph { x: 44, w: 5 }),
    ('k', Glyph { x: 49, w: 5 }),
    ('l', Glyph { x: 54, w: 5 }),
    ('m', Glyph { x: 59, w: 6 }),
    ('n', Glyph { x: 65, w: 6 }),
    ('o', Glyph { x: 71, w: 5 }),
    ('p', Glyph { x: 76, w: 5 }),
    ('q', Glyph { x: 81, w: 5 }),
    ('r', Glyph { x: 86, w: 5 }),
    ('s', Glyph { x: 91, w: 5 }),
    ('t', Glyph { x: 96, w: 6 }),
    ('u', Glyph { x: 102, w: 5 }),
    ('v', Glyph { x: 107, w: 6 }),
    ('w', Glyph { x: 113, w: 6 }),
    ('x', Glyph { x: 119, w: 6 }),
    ('y', Glyph { x: 125, w: 6 }),
    ('z', Glyph { x: 131, w: 5 }),
    ('0', Glyph { x: 136, w: 5 }),
    ('1', Glyph { x: 141, w: 4 }),
    ('2', Glyph { x: 145, w: 5 }),
    ('3', Glyph { x: 150, w: 5 }),
    ('4', Glyph { x: 155, w: 5 }),
    ('5', Glyph { x: 160, w: 5 }),
    ('6', Glyph { x: 165, w: 5 }),
    ('7', Glyph { x: 170, w: 5 }),
    ('8', Glyph { x: 175, w: 5 }),
    ('9', Glyph { x: 180, w: 5 }),
    ('_', Glyph { x: 185, w: 5 }),
    (',', Glyph { x: 190, w: 3 }),
    (':', Glyph { x: 193, w: 2 }),
    ('#', Glyph { x: 195, w: 6 }),
    ('(', Glyph { x: 201, w: 4 }),
    (')', Glyph { x: 205, w: 4 }),
    ('$', Glyph { x: 209, w: 6 }),
    ('!', Glyph { x: 215, w: 2 }),
    ('.', Glyph { x: 217, w: 2 }),
    ('+', Glyph { x: 219, w: 6 }),
    ('-', Glyph { x: 225, w: 5 }),
    ('%', Glyph { x: 230, w: 8 }),
    ('^', Glyph { x: 238, w: 6 }),
    ('[', Glyph { x: 244, w: 4 }),
    (']', Glyph { x: 248, w: 4 }),
    ('"', Glyph { x: 252, w: 4 }),
    ('\'', Glyph { x: 256, w: 3 }),
    ('?', Glyph { x: 259, w: 6 }),
    ('<', Glyph { x: 265, w: 4 }),
    ('>', Glyph { x: 269, w: 4 }),
    (' ', Glyph { x: 273, w: 5 }),
];

/// A bitmap font.
#[derive(Debug, Clone)]
pub struct Font {
    /// The glyph strip.
    sheet: ConcreteContext,
    /// Glyph extents by lowercase character.
    glyphs: HashMap<char, Glyph>,
    /// Glyph height.
    height: i32,
    /// Characters already reported missing.
    missing: RefCell<HashSet<char>>,
}

impl Font {
    /// Construct a font from a strip and a glyph map.
    pub fn new(
        sheet: ConcreteContext,
        glyphs: impl IntoIterator<Item = (char, Glyph)>,
        height: i32,
    ) -> Self {
        Self {
            sheet,
            glyphs: glyphs.into_iter().collect(),
            height,
            missing: RefCell::default(),
        }
    }

    /// The built-in 7pt font, drawn from `sheet`.
    pub fn fawnt_7pt(sheet: ConcreteContext) -> Self {
        Self::new(sheet, FAWNT_7PT_MAP.iter().copied(), FAWNT_7PT_HEIGHT)
    }

    /// Load a glyph map of the form `{"a": {"x": 0, "w": 5}, ...}`. Keys
    /// must be single characters.
    pub fn from_json(sheet: ConcreteContext, json: &str, height: i32) -> Result<Self> {
        let raw: HashMap<String, Glyph> = serde_json::from_str(json)?;
        let mut glyphs = HashMap::with_capacity(raw.len());
        for (key, glyph) in raw {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => {
                    glyphs.insert(c, glyph);
                }
                _ => {
                    return Err(Error::Metadata(format!(
                        "glyph key must be one character: {key:?}"
                    )));
                }
            }
        }
        Ok(Self {
            sheet,
            glyphs,
            height,
            missing: RefCell::default(),
        })
    }

    /// The glyph strip.
    pub fn sheet(&self) -> &ConcreteContext {
        &self.sheet
    }

    /// Glyph height.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Look up a glyph. A missing glyph is logged the first time it is
    /// asked for.
    pub fn glyph(&self, c: char) -> Option<Glyph> {
        let c = c.to_lowercase().next().unwrap_or(c);
        let g = self.glyphs.get(&c).copied();
        if g.is_none() && self.missing.borrow_mut().insert(c) {
            error!("font has no glyph for {c:?}");
        }
        g
    }

    /// Source rectangle of a glyph on the strip.
    pub fn frame(&self, g: Glyph) -> Rect {
        Rect::new(g.x, 0, g.w, self.height)
    }

    /// Width of `text` when drawn. Missing glyphs contribute nothing.
    pub fn measure(&self, text: &str) -> i32 {
        text.chars().filter_map(|c| self.glyph(c)).map(|g| g.w).sum()
    }
}
