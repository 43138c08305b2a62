//! Shared numeric constants for the picker crate.

// ── Image surface ───────────────────────────────────────────────

/// Fixed width of the image surface in device pixels.
pub const VIEWPORT_WIDTH: u32 = 800;

/// Fixed height of the image surface in device pixels.
pub const VIEWPORT_HEIGHT: u32 = 600;

// ── Magnifier ───────────────────────────────────────────────────

/// Side length of the square zoom canvas inside the magnifier.
pub const ZOOM_SIZE: u32 = 100;

/// Upscale factor applied to the cropped region.
pub const ZOOM_SCALE: u32 = 4;

/// Side length of the region cropped from the surface (`ZOOM_SIZE / ZOOM_SCALE`).
pub const CROP_SIZE: u32 = ZOOM_SIZE / ZOOM_SCALE;

/// Spacing of the reference grid lines, in overlay pixels.
pub const GRID_STEP: u32 = 10;

/// Width of the colored ring drawn around the circular overlay.
pub const RING_WIDTH: u32 = 8;

/// Side length of the fully composed overlay, ring included.
pub const OVERLAY_SIZE: u32 = ZOOM_SIZE + 2 * RING_WIDTH;

/// Offset subtracted from the pointer position to place the overlay.
pub const ANCHOR_OFFSET: f64 = 50.0;

/// Translucent white used for the grid lines.
pub const GRID_LINE_RGBA: [u8; 4] = [255, 255, 255, 72];

/// Faint white wash behind the label text (`rgba(255, 255, 255, 0.1)`).
pub const LABEL_WASH_RGBA: [u8; 4] = [255, 255, 255, 26];

/// Drop shadow behind the label text.
pub const LABEL_SHADOW_RGBA: [u8; 4] = [0, 0, 0, 170];

/// Label font size in pixels. The widest `#RRGGBB` code stays inside the zoom canvas.
pub const LABEL_FONT_PX: f32 = 16.0;

/// Label baseline, in zoom-canvas pixels from the top. Keeps the text below
/// the sample point and inside the circular clip.
pub const LABEL_BASELINE_Y: f32 = 74.0;

/// Offset of the label drop shadow, in zoom-canvas pixels.
pub const LABEL_SHADOW_OFFSET: f32 = 1.0;
