//! Picker controller: pick mode, pointer routing and hover/committed colors.
//!
//! [`PickerCore`] is the state machine. It holds two orthogonal flags (pick
//! mode and pointer-over-surface), the latest hover sample and the committed
//! color, and answers every input with a list of [`Action`]s for the host.
//! [`Picker`] wraps the core together with the render targets it drives: the
//! image surface and the magnifier overlay.
//!
//! Overlay redraws are coalesced: any number of pointer moves between two
//! animation frames produce a single [`Action::RenderNeeded`] and a single
//! redraw in [`Picker::render_frame`]. Colors are updated synchronously on
//! every event regardless of frames.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use image::{DynamicImage, RgbaImage};
use serde::Serialize;
use tracing::info;

use crate::color::HexColor;
use crate::consts::ANCHOR_OFFSET;
use crate::error::ErrorCode;
use crate::magnifier::{MagnifierOverlay, MagnifierState};
use crate::sampler::{self, Sample};
use crate::surface::{ImageSurface, LoadError, LoadOutcome, LoadTicket};
use crate::viewport::{FitTransform, Point, ScreenMapping};

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Action {
    /// The live hover color changed. `None` clears it.
    Current { hex: Option<HexColor> },
    /// A color was committed by a click.
    Final { hex: HexColor },
    /// The magnifier was shown or hidden.
    Overlay { visible: bool, anchor: Option<Point> },
    /// Pick mode was toggled.
    PickMode { active: bool },
    /// A new image was drawn on the surface.
    ImageLoaded { url: String, fit: FitTransform },
    /// The latest image load failed; the surface is unchanged.
    LoadFailed { url: String, code: &'static str, retryable: bool, message: String },
    /// The overlay needs a redraw on the next animation frame.
    RenderNeeded,
}

/// The latest valid hover read.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverSample {
    /// Pointer position in client coordinates.
    pub client: Point,
    pub sample: Sample,
}

/// Observable state compared before and after each input.
struct Observed {
    current: Option<HexColor>,
    visible: bool,
}

/// Core controller state: everything that does not own pixels.
///
/// Separated from `Picker` so it can be tested against any surface.
#[derive(Debug, Clone, Default)]
pub struct PickerCore {
    pub mapping: ScreenMapping,
    pick_mode_active: bool,
    pointer_over_surface: bool,
    hover: Option<HoverSample>,
    final_color: Option<HexColor>,
    frame_pending: bool,
}

impl PickerCore {
    #[must_use]
    pub fn new(mapping: ScreenMapping) -> Self {
        Self { mapping, ..Self::default() }
    }

    // --- Queries ---

    #[must_use]
    pub fn is_pick_mode_active(&self) -> bool {
        self.pick_mode_active
    }

    #[must_use]
    pub fn is_pointer_over_surface(&self) -> bool {
        self.pointer_over_surface
    }

    /// The live hover color, present only while picking over the surface.
    #[must_use]
    pub fn current_hex(&self) -> Option<&HexColor> {
        if !self.overlay_visible() {
            return None;
        }
        self.hover.as_ref().map(|h| &h.sample.hex)
    }

    /// The last committed color. Survives image loads.
    #[must_use]
    pub fn final_hex(&self) -> Option<&HexColor> {
        self.final_color.as_ref()
    }

    #[must_use]
    pub fn hover(&self) -> Option<&HoverSample> {
        self.hover.as_ref()
    }

    #[must_use]
    pub fn overlay_visible(&self) -> bool {
        self.pick_mode_active && self.pointer_over_surface && self.hover.is_some()
    }

    /// Magnifier inputs derived from the hover sample, if there is one.
    #[must_use]
    pub fn magnifier_state(&self) -> Option<MagnifierState> {
        let hover = self.hover.as_ref()?;
        Some(MagnifierState {
            anchor: overlay_anchor(hover.client),
            sample_point: hover.sample.pixel,
            hex: hover.sample.hex.clone(),
            visible: self.overlay_visible(),
        })
    }

    // --- Input events ---

    /// Flip pick mode. Turning it off hides the overlay and clears the hover
    /// color; the committed color is never touched.
    pub fn toggle_pick_mode(&mut self) -> Vec<Action> {
        let before = self.observe();
        self.pick_mode_active = !self.pick_mode_active;
        if !self.pick_mode_active {
            self.hover = None;
            self.pointer_over_surface = false;
        }
        info!(active = self.pick_mode_active, "pick mode toggled");

        let mut actions = vec![Action::PickMode { active: self.pick_mode_active }];
        actions.extend(self.diff(before));
        actions
    }

    /// Sample under the pointer. Ignored entirely while pick mode is off.
    pub fn on_pointer_move(&mut self, client: Point, surface: &ImageSurface) -> Vec<Action> {
        if !self.pick_mode_active {
            return Vec::new();
        }
        let before = self.observe();

        let point = self.mapping.client_to_viewport(client);
        match sampler::sample(point, surface) {
            Some(sample) => {
                self.hover = Some(HoverSample { client, sample });
                self.pointer_over_surface = true;
            }
            None => {
                self.hover = None;
                self.pointer_over_surface = false;
            }
        }

        let mut actions = self.diff(before);
        if self.overlay_visible() && !self.frame_pending {
            self.frame_pending = true;
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    /// The pointer left the surface.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        let before = self.observe();
        self.hover = None;
        self.pointer_over_surface = false;
        self.diff(before)
    }

    /// Commit the pixel under the click.
    ///
    /// Requires pick mode and a prior valid hover sample. The click point is
    /// re-sampled so the committed color is exactly the pixel under the
    /// cursor, even if no move event arrived for that position.
    pub fn on_click(&mut self, client: Point, surface: &ImageSurface) -> Vec<Action> {
        if !self.pick_mode_active || self.hover.is_none() {
            return Vec::new();
        }
        let point = self.mapping.client_to_viewport(client);
        let Some(sample) = sampler::sample(point, surface) else {
            return Vec::new();
        };

        info!(hex = %sample.hex, x = sample.pixel.x, y = sample.pixel.y, "color committed");
        self.final_color = Some(sample.hex.clone());
        vec![Action::Final { hex: sample.hex }]
    }

    /// The surface now shows a different image; hover state no longer applies.
    pub fn on_image_replaced(&mut self) -> Vec<Action> {
        let before = self.observe();
        self.hover = None;
        self.pointer_over_surface = false;
        self.diff(before)
    }

    /// Consume the pending frame request, if any.
    pub fn take_frame(&mut self) -> bool {
        std::mem::take(&mut self.frame_pending)
    }

    // --- Internals ---

    fn observe(&self) -> Observed {
        Observed { current: self.current_hex().cloned(), visible: self.overlay_visible() }
    }

    fn diff(&mut self, before: Observed) -> Vec<Action> {
        let mut actions = Vec::new();
        let current = self.current_hex().cloned();
        if current != before.current {
            actions.push(Action::Current { hex: current });
        }
        let visible = self.overlay_visible();
        if visible != before.visible {
            let anchor = self.hover.as_ref().filter(|_| visible).map(|h| overlay_anchor(h.client));
            actions.push(Action::Overlay { visible, anchor });
        }
        if !visible {
            self.frame_pending = false;
        }
        actions
    }
}

/// Top-left of the overlay for a pointer at `client`.
#[must_use]
pub fn overlay_anchor(client: Point) -> Point {
    Point::new(client.x - ANCHOR_OFFSET, client.y - ANCHOR_OFFSET)
}

/// The full picker. Wraps `PickerCore` and owns the surface and overlay.
#[derive(Debug, Clone, Default)]
pub struct Picker {
    pub core: PickerCore,
    surface: ImageSurface,
    overlay: MagnifierOverlay,
}

impl Picker {
    #[must_use]
    pub fn new(mapping: ScreenMapping) -> Self {
        Self { core: PickerCore::new(mapping), surface: ImageSurface::default(), overlay: MagnifierOverlay::new() }
    }

    #[must_use]
    pub fn surface(&self) -> &ImageSurface {
        &self.surface
    }

    /// Mutable surface access for hosts that paint fixtures directly.
    pub fn surface_mut(&mut self) -> &mut ImageSurface {
        &mut self.surface
    }

    #[must_use]
    pub fn overlay(&self) -> &MagnifierOverlay {
        &self.overlay
    }

    // --- Delegated input events ---

    pub fn toggle_pick_mode(&mut self) -> Vec<Action> {
        let actions = self.core.toggle_pick_mode();
        self.apply(&actions);
        actions
    }

    pub fn on_pointer_move(&mut self, client: Point) -> Vec<Action> {
        let actions = self.core.on_pointer_move(client, &self.surface);
        self.apply(&actions);
        actions
    }

    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        let actions = self.core.on_pointer_leave();
        self.apply(&actions);
        actions
    }

    pub fn on_click(&mut self, client: Point) -> Vec<Action> {
        self.core.on_click(client, &self.surface)
    }

    // --- Image loading ---

    /// Start a load for `url`; only the returned ticket's completion may draw.
    pub fn begin_load(&mut self, url: &str) -> LoadTicket {
        self.surface.begin_load(url)
    }

    /// Offer a completed load. Stale completions produce no actions.
    pub fn finish_load(&mut self, ticket: &LoadTicket, result: Result<DynamicImage, LoadError>) -> Vec<Action> {
        match self.surface.finish_load(ticket, result) {
            LoadOutcome::Applied { url, fit } => {
                let mut actions = self.core.on_image_replaced();
                self.apply(&actions);
                actions.push(Action::ImageLoaded { url, fit });
                actions
            }
            LoadOutcome::Failed { url, error } => vec![Action::LoadFailed {
                url,
                code: error.error_code(),
                retryable: error.retryable(),
                message: error.to_string(),
            }],
            LoadOutcome::Stale { .. } => Vec::new(),
        }
    }

    // --- Render ---

    /// Animation frame boundary: run the coalesced overlay redraw, if one is
    /// pending, and return the current overlay frame.
    pub fn render_frame(&mut self) -> Option<&RgbaImage> {
        if self.core.take_frame() {
            match self.core.magnifier_state() {
                Some(state) => {
                    self.overlay.render(&state, &self.surface);
                }
                None => self.overlay.hide(),
            }
        }
        self.overlay.frame()
    }

    fn apply(&mut self, actions: &[Action]) {
        if actions.iter().any(|a| matches!(a, Action::Overlay { visible: false, .. })) {
            self.overlay.hide();
        }
    }
}
