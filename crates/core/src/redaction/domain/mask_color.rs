use std::fmt;
use std::str::FromStr;

use image::Rgb;

use crate::shared::error::PrivacyError;

/// Outline colour for face regions in previews.
pub const FACE_OUTLINE: Rgb<u8> = Rgb([0, 255, 0]);
/// Outline colour for text regions in previews.
pub const TEXT_OUTLINE: Rgb<u8> = Rgb([0, 0, 255]);

/// Solid colour painted over redacted regions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaskColor(Rgb<u8>);

impl MaskColor {
    pub const BLACK: MaskColor = MaskColor(Rgb([0, 0, 0]));

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self(Rgb([r, g, b]))
    }

    pub fn rgb(&self) -> Rgb<u8> {
        self.0
    }
}

impl Default for MaskColor {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for MaskColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0 .0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

/// Accepts `r,g,b` (decimal components) or `#rrggbb`.
impl FromStr for MaskColor {
    type Err = PrivacyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || {
            PrivacyError::Configuration(format!(
                "invalid mask color '{s}', expected 'r,g,b' or '#rrggbb'"
            ))
        };

        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return Err(invalid());
            }
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
            return Ok(Self::new(channel(0)?, channel(2)?, channel(4)?));
        }

        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [r, g, b] = parts.as_slice() else {
            return Err(invalid());
        };
        let channel = |c: &str| c.parse::<u8>().map_err(|_| invalid());
        Ok(Self::new(channel(*r)?, channel(*g)?, channel(*b)?))
    }
}
