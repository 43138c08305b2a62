//! Image surface: the fixed-size pixel buffer the user samples from.
//!
//! DESIGN
//! ======
//! The surface is written only when an image load completes and is read by
//! the sampler and the magnifier's zoom pass. Loads are asynchronous and
//! owned by the host; the surface only hands out [`LoadTicket`]s and decides,
//! when a completion arrives, whether that ticket is still the latest one.
//! A completion for any older ticket is dropped without touching the pixels.
//!
//! Sampling reads the rendered buffer, not the source image, so letterbox
//! areas (cleared to transparent black) sample as `#000000`.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use tracing::{debug, info, warn};

use crate::color::Rgb;
use crate::consts::{VIEWPORT_HEIGHT, VIEWPORT_WIDTH};
use crate::error::ErrorCode;
use crate::viewport::{FitTransform, PixelPoint, Point, Viewport};

/// Fully transparent black, the cleared state of the surface.
const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

// =============================================================================
// ERRORS
// =============================================================================

/// An image load failed. The surface keeps its previous contents.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// The resource could not be reached.
    #[error("image fetch failed: {0}")]
    Fetch(String),

    /// The server answered with a non-success status.
    #[error("image fetch returned status {0}")]
    Status(u16),

    /// The body exceeded the configured size limit.
    #[error("image exceeds {limit} bytes")]
    TooLarge { limit: usize },

    /// The bytes are not a decodable image.
    #[error("image decode failed: {0}")]
    Decode(String),

    /// The image decoded to zero width or height.
    #[error("image has no pixels")]
    EmptyImage,
}

impl ErrorCode for LoadError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Fetch(_) => "E_IMAGE_FETCH",
            Self::Status(_) => "E_IMAGE_STATUS",
            Self::TooLarge { .. } => "E_IMAGE_TOO_LARGE",
            Self::Decode(_) => "E_IMAGE_DECODE",
            Self::EmptyImage => "E_IMAGE_EMPTY",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::Status(429 | 500..=599))
    }
}

/// A read fell outside the surface.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum SampleError {
    #[error("point ({x}, {y}) is outside the surface")]
    OutOfBounds { x: f64, y: f64 },
}

impl ErrorCode for SampleError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::OutOfBounds { .. } => "E_OUT_OF_BOUNDS",
        }
    }
}

/// Decode fetched bytes into an image.
///
/// # Errors
///
/// Returns [`LoadError::Decode`] for unrecognized or corrupt data and
/// [`LoadError::EmptyImage`] for images without pixels.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, LoadError> {
    let image = image::load_from_memory(bytes).map_err(|e| LoadError::Decode(e.to_string()))?;
    if image.width() == 0 || image.height() == 0 {
        return Err(LoadError::EmptyImage);
    }
    Ok(image)
}

// =============================================================================
// LOAD TICKETS
// =============================================================================

/// Identity of one requested load. Only the most recent ticket may draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    id: u64,
    url: String,
}

impl LoadTicket {
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// What happened when a load completion was offered to the surface.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The image was drawn.
    Applied { url: String, fit: FitTransform },
    /// The latest load failed; the surface is unchanged.
    Failed { url: String, error: LoadError },
    /// A newer load was requested after this one; the result was discarded.
    Stale { url: String },
}

// =============================================================================
// SURFACE
// =============================================================================

/// Fixed-size RGBA drawing surface holding the fitted image.
#[derive(Debug, Clone)]
pub struct ImageSurface {
    viewport: Viewport,
    pixels: RgbaImage,
    fit: Option<FitTransform>,
    url: Option<String>,
    next_ticket: u64,
    latest: Option<LoadTicket>,
}

impl Default for ImageSurface {
    fn default() -> Self {
        Self::new(Viewport::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT))
    }
}

impl ImageSurface {
    /// Create a cleared surface of the given size.
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            pixels: RgbaImage::from_pixel(viewport.width, viewport.height, CLEAR),
            fit: None,
            url: None,
            next_ticket: 0,
            latest: None,
        }
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// The rendered pixel buffer.
    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Placement of the current image, if one has been drawn.
    #[must_use]
    pub fn fit(&self) -> Option<FitTransform> {
        self.fit
    }

    /// URL of the image currently drawn.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// The load that would be applied if it completed now.
    #[must_use]
    pub fn pending(&self) -> Option<&LoadTicket> {
        self.latest.as_ref()
    }

    // --- Loading ---

    /// Register a new load for `url`, superseding any load still in flight.
    pub fn begin_load(&mut self, url: &str) -> LoadTicket {
        self.next_ticket += 1;
        let ticket = LoadTicket { id: self.next_ticket, url: url.to_string() };
        if let Some(previous) = self.latest.replace(ticket.clone()) {
            debug!(ticket = previous.id, url = %previous.url, "load superseded");
        }
        info!(ticket = ticket.id, url = %ticket.url, "image load requested");
        ticket
    }

    /// Whether `ticket` is the latest requested load.
    #[must_use]
    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        self.latest.as_ref() == Some(ticket)
    }

    /// Offer a completed load to the surface.
    ///
    /// Only the latest ticket may change anything: a successful result is
    /// drawn, a failure is reported and leaves the pixels untouched. Any
    /// older ticket is reported as [`LoadOutcome::Stale`].
    pub fn finish_load(&mut self, ticket: &LoadTicket, result: Result<DynamicImage, LoadError>) -> LoadOutcome {
        if !self.is_current(ticket) {
            debug!(ticket = ticket.id, url = %ticket.url, "discarding stale image load");
            return LoadOutcome::Stale { url: ticket.url.clone() };
        }
        self.latest = None;

        let drawn = result.and_then(|image| self.draw_image(&image));
        match drawn {
            Ok(fit) => {
                self.url = Some(ticket.url.clone());
                info!(ticket = ticket.id, url = %ticket.url, x = fit.x, y = fit.y, width = fit.width, height = fit.height, "image drawn");
                LoadOutcome::Applied { url: ticket.url.clone(), fit }
            }
            Err(error) => {
                warn!(ticket = ticket.id, url = %ticket.url, %error, "image load failed");
                LoadOutcome::Failed { url: ticket.url.clone(), error }
            }
        }
    }

    // --- Drawing ---

    /// Clear the surface and draw `image` fitted and centered.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::EmptyImage`] for a zero-sized image; the surface
    /// is not modified in that case.
    pub fn draw_image(&mut self, image: &DynamicImage) -> Result<FitTransform, LoadError> {
        let fit = FitTransform::fit(image.width(), image.height(), self.viewport).ok_or(LoadError::EmptyImage)?;
        let rect = fit.snapped();
        let width = rect.width.min(self.viewport.width);
        let height = rect.height.min(self.viewport.height);
        let scaled = image.resize_exact(width, height, FilterType::Triangle).to_rgba8();

        self.clear();
        imageops::replace(&mut self.pixels, &scaled, i64::from(rect.x), i64::from(rect.y));
        self.fit = Some(fit);
        Ok(fit)
    }

    /// Reset every pixel to transparent black.
    pub fn clear(&mut self) {
        self.pixels.pixels_mut().for_each(|p| *p = CLEAR);
    }

    /// Fill an axis-aligned rectangle with a solid RGBA color, clipped to the surface.
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, rgba: [u8; 4]) {
        let x_end = x.saturating_add(width).min(self.viewport.width);
        let y_end = y.saturating_add(height).min(self.viewport.height);
        for py in y..y_end {
            for px in x..x_end {
                self.pixels.put_pixel(px, py, Rgba(rgba));
            }
        }
    }

    // --- Reading ---

    /// Color of the rendered pixel under `point` (viewport coordinates).
    ///
    /// # Errors
    ///
    /// Returns [`SampleError::OutOfBounds`] for points outside
    /// `[0, width) × [0, height)`.
    pub fn read_pixel(&self, point: Point) -> Result<Rgb, SampleError> {
        let pixel = self.viewport.pixel_at(point).ok_or(SampleError::OutOfBounds { x: point.x, y: point.y })?;
        Ok(self.rgb_at(pixel))
    }

    fn rgb_at(&self, pixel: PixelPoint) -> Rgb {
        let Rgba([r, g, b, _]) = *self.pixels.get_pixel(pixel.x, pixel.y);
        Rgb::new(r, g, b)
    }

    /// Copy a `size × size` square centered on `center`.
    ///
    /// Cells that fall outside the surface are transparent.
    #[must_use]
    pub fn crop(&self, center: PixelPoint, size: u32) -> RgbaImage {
        let half = i64::from(size / 2);
        let origin_x = i64::from(center.x) - half;
        let origin_y = i64::from(center.y) - half;
        let (w, h) = (i64::from(self.viewport.width), i64::from(self.viewport.height));

        RgbaImage::from_fn(size, size, |cx, cy| {
            let sx = origin_x + i64::from(cx);
            let sy = origin_y + i64::from(cy);
            if (0..w).contains(&sx) && (0..h).contains(&sy) {
                *self.pixels.get_pixel(sx as u32, sy as u32)
            } else {
                CLEAR
            }
        })
    }
}
