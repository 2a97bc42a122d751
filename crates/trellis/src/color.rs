//! RGBA colors.

use serde::Deserialize;

/// An 8-bit-per-channel color with straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default, Deserialize)]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel. Zero is fully transparent.
    pub a: u8,
}

impl Rgba {
    /// Fully transparent. Fills with this color are skipped.
    pub const BLANK: Self = Self::new(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque mid grey.
    pub const GREY: Self = Self::rgb(128, 128, 128);
    /// Opaque red.
    pub const RED: Self = Self::rgb(255, 0, 0);
    /// Opaque green.
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    /// Opaque blue.
    pub const BLUE: Self = Self::rgb(0, 0, 255);

    /// Construct a color from all four channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Construct an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// True if this color has no coverage at all.
    pub fn is_blank(&self) -> bool {
        self.a == 0
    }

    /// Return this color with its alpha multiplied by `factor`, clamped to
    /// `[0, 1]`.
    pub fn fade(self, factor: f32) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        Self {
            a: (f32::from(self.a) * factor).round() as u8,
            ..self
        }
    }

    /// Channels as an array, in RGBA order.
    pub fn channels(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[u8; 4]> for Rgba {
    fn from(c: [u8; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_fade() {
        assert!(Rgba::BLANK.is_blank());
        assert!(!Rgba::RED.is_blank());
        assert_eq!(Rgba::RED.fade(0.5).a, 128);
        assert_eq!(Rgba::RED.fade(2.0).a, 255);
        assert!(Rgba::WHITE.fade(0.0).is_blank());
    }
}
