//! Magnifier overlay: a circular, ringed zoom of the surface around the sample point.
//!
//! DESIGN
//! ======
//! The overlay keeps three square layers of `ZOOM_SIZE × ZOOM_SIZE`:
//!
//! 1. zoom: a `CROP_SIZE` square of the surface, upscaled by `ZOOM_SCALE`
//! 2. grid: translucent reference lines every `GRID_STEP` pixels
//! 3. label: the hex code over a faint wash, with a drop shadow
//!
//! Each pass only reruns when its inputs change: the grid once at
//! construction, the zoom when the sample point or color changes, the label
//! when the color changes. Composition stacks zoom → grid → label, clips the
//! result to a circle and surrounds it with a ring in the sampled color.
//!
//! Hiding the overlay drops the composed frame and the pass inputs, so the
//! next show always redraws from scratch.

#[cfg(test)]
#[path = "magnifier_test.rs"]
mod magnifier_test;

use image::imageops;
use image::{Rgba, RgbaImage};
use serde::Serialize;
use tracing::warn;

use crate::color::HexColor;
use crate::consts::{
    CROP_SIZE, GRID_LINE_RGBA, GRID_STEP, LABEL_BASELINE_Y, LABEL_FONT_PX, LABEL_SHADOW_OFFSET, LABEL_SHADOW_RGBA,
    LABEL_WASH_RGBA, OVERLAY_SIZE, RING_WIDTH, ZOOM_SCALE, ZOOM_SIZE,
};
use crate::error::ErrorCode;
use crate::font;
use crate::surface::ImageSurface;
use crate::viewport::{PixelPoint, Point};

/// Everything the overlay needs to draw one frame. Derived from controller state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MagnifierState {
    /// Top-left of the overlay in client coordinates.
    pub anchor: Point,
    /// Surface pixel at the center of the zoom.
    pub sample_point: PixelPoint,
    pub hex: HexColor,
    pub visible: bool,
}

/// How many times each pass has run since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassCounts {
    pub zoom: u64,
    pub grid: u64,
    pub label: u64,
    pub compose: u64,
}

/// Owned render target for the floating magnifier.
#[derive(Debug, Clone)]
pub struct MagnifierOverlay {
    zoom: RgbaImage,
    grid: RgbaImage,
    label: RgbaImage,
    frame: Option<RgbaImage>,
    anchor: Option<Point>,
    zoom_key: Option<(PixelPoint, HexColor)>,
    label_key: Option<HexColor>,
    passes: PassCounts,
}

impl Default for MagnifierOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl MagnifierOverlay {
    /// Mount the overlay. The grid layer is drawn here and never again.
    #[must_use]
    pub fn new() -> Self {
        let passes = PassCounts { grid: 1, ..PassCounts::default() };
        Self {
            zoom: RgbaImage::new(ZOOM_SIZE, ZOOM_SIZE),
            grid: draw_grid(ZOOM_SIZE, GRID_STEP),
            label: RgbaImage::new(ZOOM_SIZE, ZOOM_SIZE),
            frame: None,
            anchor: None,
            zoom_key: None,
            label_key: None,
            passes,
        }
    }

    /// The last composed frame, or `None` while hidden.
    #[must_use]
    pub fn frame(&self) -> Option<&RgbaImage> {
        self.frame.as_ref()
    }

    /// Where the current frame is placed, in client coordinates.
    #[must_use]
    pub fn anchor(&self) -> Option<Point> {
        self.anchor
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.frame.is_some()
    }

    #[must_use]
    pub fn passes(&self) -> PassCounts {
        self.passes
    }

    /// Discard the current frame.
    pub fn hide(&mut self) {
        self.frame = None;
        self.anchor = None;
        self.zoom_key = None;
        self.label_key = None;
    }

    /// Bring the overlay in line with `state`, rerunning only the passes whose
    /// inputs changed. Returns the composed frame when visible.
    pub fn render(&mut self, state: &MagnifierState, surface: &ImageSurface) -> Option<&RgbaImage> {
        if !state.visible {
            self.hide();
            return None;
        }

        let zoom_key = (state.sample_point, state.hex.clone());
        let zoom_dirty = self.zoom_key.as_ref() != Some(&zoom_key);
        if zoom_dirty {
            self.zoom = zoom_layer(surface, state.sample_point);
            self.zoom_key = Some(zoom_key);
            self.passes.zoom += 1;
        }

        let label_dirty = self.label_key.as_ref() != Some(&state.hex);
        if label_dirty {
            self.label = label_layer(&state.hex);
            self.label_key = Some(state.hex.clone());
            self.passes.label += 1;
        }

        if zoom_dirty || label_dirty || self.frame.is_none() {
            self.frame = Some(self.compose(&state.hex));
            self.passes.compose += 1;
        }
        self.anchor = Some(state.anchor);
        self.frame.as_ref()
    }

    fn compose(&self, hex: &HexColor) -> RgbaImage {
        let mut content = self.zoom.clone();
        imageops::overlay(&mut content, &self.grid, 0, 0);
        imageops::overlay(&mut content, &self.label, 0, 0);

        let ring = Rgba(hex.rgb().to_rgba());
        let center = f64::from(OVERLAY_SIZE) / 2.0;
        let inner = f64::from(ZOOM_SIZE) / 2.0;
        let outer = inner + f64::from(RING_WIDTH);

        RgbaImage::from_fn(OVERLAY_SIZE, OVERLAY_SIZE, |x, y| {
            let dx = f64::from(x) + 0.5 - center;
            let dy = f64::from(y) + 0.5 - center;
            let r = dx.hypot(dy);
            if r < inner {
                *content.get_pixel(x - RING_WIDTH, y - RING_WIDTH)
            } else if r < outer {
                ring
            } else {
                Rgba([0, 0, 0, 0])
            }
        })
    }
}

// =============================================================
// Passes
// =============================================================

/// Crop around `center` and upscale by `ZOOM_SCALE` with nearest-neighbor sampling.
#[must_use]
pub fn zoom_layer(surface: &ImageSurface, center: PixelPoint) -> RgbaImage {
    let crop = surface.crop(center, CROP_SIZE);
    RgbaImage::from_fn(ZOOM_SIZE, ZOOM_SIZE, |x, y| *crop.get_pixel(x / ZOOM_SCALE, y / ZOOM_SCALE))
}

/// Transparent square with translucent lines every `step` pixels on both axes.
#[must_use]
pub fn draw_grid(size: u32, step: u32) -> RgbaImage {
    let step = step.max(1);
    RgbaImage::from_fn(size, size, |x, y| {
        if x % step == 0 || y % step == 0 {
            Rgba(GRID_LINE_RGBA)
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

/// Hex code centered horizontally near the bottom, in its own color, over a wash.
///
/// If the label face is unavailable the layer is just the wash.
#[must_use]
pub fn label_layer(hex: &HexColor) -> RgbaImage {
    let mut layer = RgbaImage::from_pixel(ZOOM_SIZE, ZOOM_SIZE, Rgba(LABEL_WASH_RGBA));
    let font = match font::label_font() {
        Ok(font) => font,
        Err(e) => {
            warn!(error = %e, code = e.error_code(), "label font unavailable");
            return layer;
        }
    };

    let text = hex.as_str();
    let left = (ZOOM_SIZE as f32 - font.text_width(text, LABEL_FONT_PX)) / 2.0;
    font.draw_text(
        &mut layer,
        text,
        left + LABEL_SHADOW_OFFSET,
        LABEL_BASELINE_Y + LABEL_SHADOW_OFFSET,
        LABEL_FONT_PX,
        LABEL_SHADOW_RGBA,
    );
    font.draw_text(&mut layer, text, left, LABEL_BASELINE_Y, LABEL_FONT_PX, hex.rgb().to_rgba());
    layer
}
