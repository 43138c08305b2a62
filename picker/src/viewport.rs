#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use serde::Serialize;

/// A point in either client (screen) space or viewport space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An addressable pixel inside the image surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PixelPoint {
    pub x: u32,
    pub y: u32,
}

impl PixelPoint {
    #[must_use]
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Placement of the image surface on screen.
///
/// `left` / `top` are the surface's bounding-box offset in client pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenMapping {
    pub left: f64,
    pub top: f64,
}

impl ScreenMapping {
    #[must_use]
    pub fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }

    /// Convert a client-space pointer position to viewport coordinates.
    #[must_use]
    pub fn client_to_viewport(&self, client: Point) -> Point {
        Point { x: client.x - self.left, y: client.y - self.top }
    }

    /// Convert a viewport point back to client coordinates.
    #[must_use]
    pub fn viewport_to_client(&self, viewport: Point) -> Point {
        Point { x: viewport.x + self.left, y: viewport.y + self.top }
    }
}

/// Fixed dimensions of a drawable surface in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The pixel containing `point`, or `None` when it lies outside
    /// `[0, width) × [0, height)`.
    #[must_use]
    pub fn pixel_at(&self, point: Point) -> Option<PixelPoint> {
        if !point.x.is_finite() || !point.y.is_finite() || point.x < 0.0 || point.y < 0.0 {
            return None;
        }
        let x = point.x.floor();
        let y = point.y.floor();
        if x >= f64::from(self.width) || y >= f64::from(self.height) {
            return None;
        }
        Some(PixelPoint { x: x as u32, y: y as u32 })
    }

    #[must_use]
    pub fn contains(&self, pixel: PixelPoint) -> bool {
        pixel.x < self.width && pixel.y < self.height
    }
}

/// Where a loaded image is drawn inside the surface.
///
/// The drawn region keeps the source aspect ratio, is centered, and touches
/// at least one pair of opposite surface edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitTransform {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl FitTransform {
    /// Fit an `image_width × image_height` image inside `viewport`.
    ///
    /// Returns `None` for a zero-sized image.
    #[must_use]
    pub fn fit(image_width: u32, image_height: u32, viewport: Viewport) -> Option<Self> {
        if image_width == 0 || image_height == 0 {
            return None;
        }
        let (iw, ih) = (f64::from(image_width), f64::from(image_height));
        let (vw, vh) = (f64::from(viewport.width), f64::from(viewport.height));
        let scale = (vw / iw).min(vh / ih);
        let width = iw * scale;
        let height = ih * scale;
        Some(Self { x: (vw - width) / 2.0, y: (vh - height) / 2.0, width, height })
    }

    /// The transform snapped to whole pixels for rasterization.
    ///
    /// Width and height are at least one pixel.
    #[must_use]
    pub fn snapped(&self) -> SnappedRect {
        SnappedRect {
            x: self.x.round().max(0.0) as u32,
            y: self.y.round().max(0.0) as u32,
            width: (self.width.round() as u32).max(1),
            height: (self.height.round() as u32).max(1),
        }
    }
}

/// A pixel-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnappedRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}
