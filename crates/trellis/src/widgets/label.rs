use std::{mem, rc::Rc};

use crate::{
    draw::{Blit, DrawTarget},
    error::Result,
    font::Font,
    geom::{Expanse, HAlign, Point, Rect, VAlign},
    widget::{NodeInfo, Widget},
};

/// How a label breaks text across lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wrapping {
    /// Everything on one line.
    #[default]
    None,
    /// Break between words. A word wider than the label gets a line of its
    /// own and is clipped.
    Word,
    /// Break between characters. Lines never start with a space.
    Character,
}

/// One laid-out line of a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    /// Line content.
    pub text: String,
    /// Drawn width.
    pub width: i32,
    /// Top-left of the line in the label's space.
    pub position: Point,
}

/// Text drawn with a bitmap font.
pub struct Label {
    /// Glyph source.
    font: Rc<Font>,
    /// Text as set.
    text: String,
    /// Line breaking.
    wrapping: Wrapping,
    /// Horizontal alignment of each line.
    h_align: HAlign,
    /// Vertical alignment of the block of lines.
    v_align: VAlign,
    /// Distance between line tops.
    line_height: i32,
    /// Area to lay out in.
    size: Expanse,
    /// Layout result.
    lines: Vec<TextLine>,
}

impl Label {
    /// A top-left aligned, unwrapped label with 8px lines.
    pub fn new(font: Rc<Font>, text: impl Into<String>) -> Self {
        Self {
            font,
            text: text.into(),
            wrapping: Wrapping::None,
            h_align: HAlign::Left,
            v_align: VAlign::Top,
            line_height: 8,
            size: Expanse::default(),
            lines: Vec::new(),
        }
    }

    /// Set the wrapping mode.
    pub fn with_wrapping(mut self, wrapping: Wrapping) -> Self {
        self.wrapping = wrapping;
        self
    }

    /// Set text alignment.
    pub fn with_align(mut self, h: HAlign, v: VAlign) -> Self {
        self.h_align = h;
        self.v_align = v;
        self
    }

    /// Set the line height.
    pub fn with_line_height(mut self, line_height: i32) -> Self {
        self.line_height = line_height;
        self
    }

    /// The current text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text and lay it out again.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.layout();
    }

    /// The laid-out lines.
    pub fn lines(&self) -> &[TextLine] {
        &self.lines
    }

    /// Break the text into lines and position them.
    fn layout(&mut self) {
        let width = self.size.w;
        let broken = match self.wrapping {
            Wrapping::None => vec![(self.text.clone(), self.font.measure(&self.text))],
            Wrapping::Word => wrap_words(&self.font, &self.text, width),
            Wrapping::Character => wrap_chars(&self.font, &self.text, width),
        };
        let n = broken.len() as i32;
        let fh = self.font.height();
        let block = (self.line_height - fh) * (n - 1) + fh * n;
        let top = self.v_align.resolve(self.size.h, block);
        self.lines = broken
            .into_iter()
            .enumerate()
            .map(|(i, (text, w))| TextLine {
                position: Point::new(
                    self.h_align.resolve(width, w),
                    top + i as i32 * self.line_height,
                ),
                text,
                width: w,
            })
            .collect();
    }
}

/// Greedy word wrap.
fn wrap_words(font: &Font, text: &str, width: i32) -> Vec<(String, i32)> {
    let mut lines = Vec::new();
    let mut run = String::new();
    let mut run_w = 0;
    let mut started = false;
    for word in text.split(' ') {
        let ww = font.measure(word);
        if started {
            let spaced = font.measure(" ") + ww;
            if run_w + spaced <= width {
                run.push(' ');
                run.push_str(word);
                run_w += spaced;
                continue;
            }
            lines.push((mem::take(&mut run), run_w));
        }
        run.push_str(word);
        run_w = ww;
        started = true;
    }
    if started {
        lines.push((run, run_w));
    }
    lines
}

/// Greedy character wrap. Spaces at the start of a line are dropped, and a
/// character wider than the label still gets a line.
fn wrap_chars(font: &Font, text: &str, width: i32) -> Vec<(String, i32)> {
    let mut lines = Vec::new();
    let mut run = String::new();
    let mut run_w = 0;
    for c in text.chars() {
        if run.is_empty() && c == ' ' {
            continue;
        }
        let cw = font.glyph(c).map_or(0, |g| g.w);
        if !run.is_empty() && run_w + cw > width {
            lines.push((mem::take(&mut run), run_w));
            run_w = 0;
            if c == ' ' {
                continue;
            }
        }
        run.push(c);
        run_w += cw;
    }
    if !run.is_empty() {
        lines.push((run, run_w));
    }
    lines
}

impl Widget for Label {
    fn draw(&mut self, node: &NodeInfo, target: &mut dyn DrawTarget) -> Result<()> {
        node.paint_background(target)?;
        let sheet = self.font.sheet();
        for line in &self.lines {
            let mut x = line.position.x;
            for c in line.text.chars() {
                let Some(g) = self.font.glyph(c) else {
                    continue;
                };
                let frame = self.font.frame(g);
                target.push_draw_concrete(
                    Rect::new(x, line.position.y, frame.w, frame.h),
                    sheet,
                    Blit::region(frame).with_alpha(node.opacity),
                )?;
                x += g.w;
            }
        }
        Ok(())
    }

    fn resized(&mut self, size: Expanse) {
        self.size = size;
        self.layout();
    }
}
