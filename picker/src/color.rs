//! RGB to `#RRGGBB` codec.
//!
//! [`HexColor`] can only be built through [`encode`] or by parsing a
//! well-formed string, so every value held by the rest of the crate is exactly
//! seven characters: `#` followed by six uppercase hex digits.

#[cfg(test)]
#[path = "color_test.rs"]
mod color_test;

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// An 8-bit RGB triple read from the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Pack into `0x00RRGGBB`.
    #[must_use]
    pub fn to_u32(self) -> u32 {
        (u32::from(self.r) << 16) | (u32::from(self.g) << 8) | u32::from(self.b)
    }

    /// Unpack from `0x00RRGGBB`; the top byte is ignored.
    #[must_use]
    pub fn from_u32(packed: u32) -> Self {
        Self { r: (packed >> 16) as u8, g: (packed >> 8) as u8, b: packed as u8 }
    }

    #[must_use]
    pub fn hex(self) -> HexColor {
        encode(self.r, self.g, self.b)
    }

    /// Opaque RGBA with this color.
    #[must_use]
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

/// A `#RRGGBB` string with uppercase digits, carried with the triple it
/// was encoded from so decoding never re-parses text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HexColor {
    text: String,
    rgb: Rgb,
}

impl HexColor {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The RGB triple this code denotes.
    #[must_use]
    pub fn rgb(&self) -> Rgb {
        self.rgb
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for HexColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

/// Error returned when parsing a [`HexColor`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a #RRGGBB color: {0:?}")]
pub struct ParseHexError(pub String);

impl FromStr for HexColor {
    type Err = ParseHexError;

    /// Accepts `#RRGGBB` in either case and normalizes to uppercase.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('#').ok_or_else(|| ParseHexError(s.to_string()))?;
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseHexError(s.to_string()));
        }
        let packed = u32::from_str_radix(digits, 16).map_err(|_| ParseHexError(s.to_string()))?;
        Ok(Rgb::from_u32(packed).hex())
    }
}

/// Encode an RGB triple as `#RRGGBB`.
#[must_use]
pub fn encode(r: u8, g: u8, b: u8) -> HexColor {
    HexColor { text: format!("#{r:02X}{g:02X}{b:02X}"), rgb: Rgb::new(r, g, b) }
}

/// Inverse of [`encode`].
#[must_use]
pub fn decode(hex: &HexColor) -> Rgb {
    hex.rgb
}
