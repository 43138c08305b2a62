use super::*;
use crate::color::encode;

// =============================================================
// Helpers
// =============================================================

const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];

fn red_surface_with_green_dot(x: u32, y: u32) -> ImageSurface {
    let mut surface = ImageSurface::default();
    surface.fill_rect(0, 0, 800, 600, RED);
    surface.fill_rect(x, y, 1, 1, GREEN);
    surface
}

fn state_at(x: u32, y: u32, hex: HexColor) -> MagnifierState {
    MagnifierState {
        anchor: Point::new(f64::from(x) - 50.0, f64::from(y) - 50.0),
        sample_point: PixelPoint::new(x, y),
        hex,
        visible: true,
    }
}

/// Frame coordinates of a zoom-content pixel.
fn frame_px(frame: &RgbaImage, x: u32, y: u32) -> [u8; 4] {
    frame.get_pixel(x + RING_WIDTH, y + RING_WIDTH).0
}

// =============================================================
// Mount
// =============================================================

#[test]
fn new_overlay_is_hidden_with_grid_drawn_once() {
    let overlay = MagnifierOverlay::new();
    assert!(overlay.frame().is_none());
    assert!(!overlay.is_visible());
    assert_eq!(overlay.passes(), PassCounts { grid: 1, ..PassCounts::default() });
}

// =============================================================
// Zoom pass
// =============================================================

#[test]
fn zoom_layer_upscales_center_pixel_to_four_by_four_block() {
    let surface = red_surface_with_green_dot(400, 300);
    let zoom = zoom_layer(&surface, PixelPoint::new(400, 300));
    assert_eq!(zoom.dimensions(), (ZOOM_SIZE, ZOOM_SIZE));
    for y in 48..52 {
        for x in 48..52 {
            assert_eq!(zoom.get_pixel(x, y).0, GREEN, "({x}, {y})");
        }
    }
    assert_eq!(zoom.get_pixel(47, 48).0, RED);
    assert_eq!(zoom.get_pixel(52, 48).0, RED);
    assert_eq!(zoom.get_pixel(48, 52).0, RED);
}

#[test]
fn zoom_layer_beyond_surface_is_transparent() {
    let surface = red_surface_with_green_dot(0, 0);
    let zoom = zoom_layer(&surface, PixelPoint::new(0, 0));
    assert_eq!(zoom.get_pixel(0, 0).0, [0, 0, 0, 0]);
    assert_eq!(zoom.get_pixel(47, 47).0, [0, 0, 0, 0]);
    assert_eq!(zoom.get_pixel(48, 48).0, GREEN);
    assert_eq!(zoom.get_pixel(99, 99).0, RED);
}

// =============================================================
// Grid pass
// =============================================================

#[test]
fn grid_has_lines_every_step() {
    let grid = draw_grid(100, 10);
    assert_eq!(grid.get_pixel(0, 5).0, GRID_LINE_RGBA);
    assert_eq!(grid.get_pixel(30, 77).0, GRID_LINE_RGBA);
    assert_eq!(grid.get_pixel(77, 90).0, GRID_LINE_RGBA);
    assert_eq!(grid.get_pixel(5, 5).0, [0, 0, 0, 0]);
    assert_eq!(grid.get_pixel(99, 99).0, [0, 0, 0, 0]);
}

#[test]
fn grid_lines_are_translucent() {
    assert!(GRID_LINE_RGBA[3] > 0 && GRID_LINE_RGBA[3] < 255);
}

// =============================================================
// Label pass
// =============================================================

/// Pixels where red text clearly dominates the wash and shadow.
fn red_text_pixels(layer: &RgbaImage) -> Vec<(u32, u32)> {
    layer
        .enumerate_pixels()
        .filter(|(_, _, p)| p[0] > 150 && p[1] < 90 && p[2] < 90 && p[3] > 150)
        .map(|(x, y, _)| (x, y))
        .collect()
}

#[test]
fn label_text_uses_sampled_color_in_lower_half() {
    let layer = label_layer(&encode(255, 0, 0));
    let text_pixels = red_text_pixels(&layer);
    assert!(!text_pixels.is_empty());
    assert!(text_pixels.iter().all(|&(_, y)| y >= ZOOM_SIZE / 2));
}

#[test]
fn label_text_is_horizontally_centered() {
    let layer = label_layer(&encode(255, 0, 0));
    let xs: Vec<u32> = red_text_pixels(&layer).into_iter().map(|(x, _)| x).collect();
    let left_margin = *xs.iter().min().unwrap();
    let right_margin = ZOOM_SIZE - 1 - *xs.iter().max().unwrap();
    assert!(left_margin.abs_diff(right_margin) <= 3, "{left_margin} vs {right_margin}");
}

#[test]
fn widest_label_is_not_cut_off() {
    let layer = label_layer(&encode(0xdd, 0xdd, 0xdd));
    let xs: Vec<u32> = layer.enumerate_pixels().filter(|(_, _, p)| p[0] > 150 && p[3] > 150).map(|(x, _, _)| x).collect();
    assert!(*xs.iter().min().unwrap() > 0);
    assert!(*xs.iter().max().unwrap() < ZOOM_SIZE - 1);
}

#[test]
fn label_has_shadow_and_wash() {
    let layer = label_layer(&encode(255, 255, 255));
    assert!(layer.pixels().any(|p| p[3] > 90 && p[0] < 100), "no dark shadow pixels");
    assert!(layer.pixels().any(|p| p[3] > 150 && p[0] > 200), "no white text pixels");
    assert_eq!(layer.get_pixel(0, 0).0, LABEL_WASH_RGBA);
}

// =============================================================
// Composition
// =============================================================

#[test]
fn render_composes_circle_with_colored_ring() {
    let surface = red_surface_with_green_dot(400, 300);
    let mut overlay = MagnifierOverlay::new();
    let frame = overlay.render(&state_at(400, 300, encode(0, 255, 0)), &surface).unwrap().clone();

    assert_eq!(frame.dimensions(), (OVERLAY_SIZE, OVERLAY_SIZE));
    // Outside the circle.
    assert_eq!(frame.get_pixel(0, 0).0, [0, 0, 0, 0]);
    // Ring at the top center.
    assert_eq!(frame.get_pixel(OVERLAY_SIZE / 2, 2).0, GREEN);
    // Zoomed sample pixel, tinted by the label wash.
    let [r, g, b, a] = frame_px(&frame, 49, 49);
    assert!(g > 200 && r < 60 && b < 60 && a == 255, "{:?}", [r, g, b, a]);
    // Zoomed neighbor stays red.
    let [r, g, _, _] = frame_px(&frame, 41, 41);
    assert!(r > 200 && g < 60);
}

#[test]
fn render_draws_grid_over_zoom() {
    let surface = red_surface_with_green_dot(400, 300);
    let mut overlay = MagnifierOverlay::new();
    let frame = overlay.render(&state_at(400, 300, encode(0, 255, 0)), &surface).unwrap().clone();
    let on_line = frame_px(&frame, 40, 35);
    let off_line = frame_px(&frame, 41, 35);
    assert_ne!(on_line, off_line);
    assert!(on_line[1] > off_line[1], "grid line should lighten the red zoom");
}

#[test]
fn render_out_of_range_crop_shows_only_wash() {
    let surface = red_surface_with_green_dot(0, 0);
    let mut overlay = MagnifierOverlay::new();
    let frame = overlay.render(&state_at(0, 0, encode(0, 255, 0)), &surface).unwrap().clone();
    let px = frame_px(&frame, 45, 45);
    for (got, want) in px.iter().zip(LABEL_WASH_RGBA) {
        assert!(got.abs_diff(want) <= 2, "{px:?} vs {LABEL_WASH_RGBA:?}");
    }
}

#[test]
fn render_sets_anchor() {
    let surface = ImageSurface::default();
    let mut overlay = MagnifierOverlay::new();
    overlay.render(&state_at(120, 80, encode(0, 0, 0)), &surface);
    assert_eq!(overlay.anchor(), Some(Point::new(70.0, 30.0)));
}

// =============================================================
// Idempotence
// =============================================================

#[test]
fn rerender_with_same_state_runs_no_passes() {
    let surface = red_surface_with_green_dot(400, 300);
    let mut overlay = MagnifierOverlay::new();
    let state = state_at(400, 300, encode(0, 255, 0));
    overlay.render(&state, &surface);
    overlay.render(&state, &surface);
    assert_eq!(overlay.passes(), PassCounts { zoom: 1, grid: 1, label: 1, compose: 1 });
}

#[test]
fn moving_with_same_color_reruns_zoom_only() {
    let surface = red_surface_with_green_dot(400, 300);
    let mut overlay = MagnifierOverlay::new();
    overlay.render(&state_at(200, 200, encode(255, 0, 0)), &surface);
    overlay.render(&state_at(201, 200, encode(255, 0, 0)), &surface);
    assert_eq!(overlay.passes(), PassCounts { zoom: 2, grid: 1, label: 1, compose: 2 });
}

#[test]
fn color_change_reruns_zoom_and_label() {
    let surface = red_surface_with_green_dot(400, 300);
    let mut overlay = MagnifierOverlay::new();
    overlay.render(&state_at(399, 300, encode(255, 0, 0)), &surface);
    overlay.render(&state_at(400, 300, encode(0, 255, 0)), &surface);
    assert_eq!(overlay.passes(), PassCounts { zoom: 2, grid: 1, label: 2, compose: 2 });
}

// =============================================================
// Visibility
// =============================================================

#[test]
fn invisible_state_discards_frame() {
    let surface = ImageSurface::default();
    let mut overlay = MagnifierOverlay::new();
    let mut state = state_at(10, 10, encode(0, 0, 0));
    overlay.render(&state, &surface);
    assert!(overlay.is_visible());

    state.visible = false;
    assert!(overlay.render(&state, &surface).is_none());
    assert!(overlay.frame().is_none());
    assert!(overlay.anchor().is_none());
}

#[test]
fn show_after_hide_redraws_from_scratch() {
    let surface = ImageSurface::default();
    let mut overlay = MagnifierOverlay::new();
    let state = state_at(10, 10, encode(0, 0, 0));
    overlay.render(&state, &surface);
    overlay.hide();
    overlay.render(&state, &surface);
    assert_eq!(overlay.passes(), PassCounts { zoom: 2, grid: 1, label: 2, compose: 2 });
}
