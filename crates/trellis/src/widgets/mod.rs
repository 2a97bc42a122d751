//! Built-in widgets.

mod bitmap;
mod button;
mod label;
mod sprite;

pub use bitmap::Bitmap;
pub use button::{Button, ButtonState};
pub use label::{Label, TextLine, Wrapping};
pub use sprite::Sprite;
