//! Antialiased label text using the bundled DejaVu Sans face.
//!
//! The face is parsed once, on first use, and shared for the life of the
//! process. Glyphs are rasterized by `fontdue` into coverage masks that are
//! blended onto the target canvas in the requested color.

#[cfg(test)]
#[path = "font_test.rs"]
mod font_test;

use std::fmt;
use std::sync::LazyLock;

use fontdue::{Font, FontSettings};
use image::{Pixel, Rgba, RgbaImage};

use crate::error::ErrorCode;

const EMBEDDED_FONT: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");

static LABEL_FONT: LazyLock<Result<LabelFont, FontError>> = LazyLock::new(|| LabelFont::from_bytes(EMBEDDED_FONT));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FontError {
    #[error("font parse failed: {0}")]
    Parse(String),
}

impl ErrorCode for FontError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "E_FONT_PARSE",
        }
    }
}

/// The shared label face.
///
/// # Errors
///
/// Returns [`FontError::Parse`] if the embedded face could not be parsed.
pub fn label_font() -> Result<&'static LabelFont, FontError> {
    LABEL_FONT.as_ref().map_err(Clone::clone)
}

pub struct LabelFont {
    font: Font,
}

impl fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabelFont").field("units_per_em", &self.font.units_per_em()).finish()
    }
}

impl LabelFont {
    /// Parse a TrueType or OpenType face.
    ///
    /// # Errors
    ///
    /// Returns [`FontError::Parse`] if `bytes` is not a usable face.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FontError> {
        let font = Font::from_bytes(bytes, FontSettings::default()).map_err(|e| FontError::Parse(e.to_string()))?;
        Ok(Self { font })
    }

    /// Sum of the advance widths of `text` at `px`.
    #[must_use]
    pub fn text_width(&self, text: &str, px: f32) -> f32 {
        text.chars().map(|c| self.font.metrics(c, px).advance_width).sum()
    }

    /// Blend `text` onto `canvas`, pen starting at `left` on the `baseline` row.
    ///
    /// Coverage scales the alpha of `rgba`. Pixels outside the canvas are skipped.
    pub fn draw_text(&self, canvas: &mut RgbaImage, text: &str, left: f32, baseline: f32, px: f32, rgba: [u8; 4]) {
        let (w, h) = (i64::from(canvas.width()), i64::from(canvas.height()));
        let baseline = baseline.round() as i64;
        let mut pen_x = left;

        for c in text.chars() {
            let (metrics, coverage) = self.font.rasterize(c, px);
            // ymin is the glyph bottom relative to the baseline, negative for descenders.
            let origin_x = pen_x.round() as i64 + i64::from(metrics.xmin);
            let origin_y = baseline - metrics.height as i64 - i64::from(metrics.ymin);

            for (i, &cov) in coverage.iter().enumerate() {
                if cov == 0 {
                    continue;
                }
                let x = origin_x + (i % metrics.width) as i64;
                let y = origin_y + (i / metrics.width) as i64;
                if (0..w).contains(&x) && (0..h).contains(&y) {
                    let alpha = (u16::from(rgba[3]) * u16::from(cov) / 255) as u8;
                    canvas.get_pixel_mut(x as u32, y as u32).blend(&Rgba([rgba[0], rgba[1], rgba[2], alpha]));
                }
            }
            pen_x += metrics.advance_width;
        }
    }
}
