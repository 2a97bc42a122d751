use std::rc::Rc;

use super::Label;
use crate::{
    color::Rgba,
    draw::DrawTarget,
    error::Result,
    event::{MouseEvt, MouseKind},
    font::Font,
    geom::{Expanse, HAlign, VAlign},
    widget::{NodeInfo, Widget},
};

/// Visual state of a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    /// Idle.
    #[default]
    None,
    /// The pointer is over the button.
    Hover,
    /// The button is being pressed.
    Active,
}

impl ButtonState {
    /// Index into a button's style array.
    fn index(self) -> usize {
        match self {
            Self::None => 0,
            Self::Hover => 1,
            Self::Active => 2,
        }
    }
}

/// A filled rectangle with a centered caption that tracks hover and press.
///
/// The button's node must be interactive for it to see mouse events.
pub struct Button {
    /// Caption, laid out over the whole button.
    label: Label,
    /// Current state.
    state: ButtonState,
    /// Fill for each state, indexed by [`ButtonState`].
    styles: [Rgba; 3],
}

impl Button {
    /// A button with the default white, grey and red fills.
    pub fn new(font: Rc<Font>, text: impl Into<String>) -> Self {
        Self {
            label: Label::new(font, text).with_align(HAlign::Center, VAlign::Center),
            state: ButtonState::None,
            styles: [Rgba::WHITE, Rgba::GREY, Rgba::RED],
        }
    }

    /// Replace the fills for idle, hover and active.
    pub fn with_styles(mut self, styles: [Rgba; 3]) -> Self {
        self.styles = styles;
        self
    }

    /// The current state.
    pub fn state(&self) -> ButtonState {
        self.state
    }

    /// The caption.
    pub fn label_mut(&mut self) -> &mut Label {
        &mut self.label
    }
}

impl Widget for Button {
    fn draw(&mut self, node: &NodeInfo, target: &mut dyn DrawTarget) -> Result<()> {
        let fill = self.styles[self.state.index()].fade(node.opacity);
        target.push_draw_fill_rect(node.local_rect(), fill)?;
        let caption = NodeInfo {
            background: Rgba::BLANK,
            ..*node
        };
        self.label.draw(&caption, target)
    }

    fn on_mouse(&mut self, kind: MouseKind, _e: &MouseEvt, node: &NodeInfo) {
        self.state = match kind {
            MouseKind::Down => ButtonState::Active,
            MouseKind::Up => ButtonState::Hover,
            MouseKind::Enter if node.maybe_clicked => ButtonState::Active,
            MouseKind::Enter => ButtonState::Hover,
            MouseKind::Leave => ButtonState::None,
            MouseKind::Move | MouseKind::Click => return,
        };
    }

    fn resized(&mut self, size: Expanse) {
        self.label.resized(size);
    }
}
