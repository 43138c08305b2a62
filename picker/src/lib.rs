//! Pixel-sampling and magnifier engine for the image color picker.
//!
//! This crate owns the whole pick pipeline: mapping pointer coordinates into
//! the fixed-size image surface, reading single pixels from the rendered
//! surface, encoding them as `#RRGGBB`, and rendering the circular magnifier
//! overlay that follows the pointer. Hosts feed it pointer events and image
//! bytes; they get back [`engine::Action`]s describing what changed.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Picker controller: testable [`engine::PickerCore`] and the owning [`engine::Picker`] |
//! | [`surface`] | Image surface pixel buffer, fit-and-center drawing, load tickets |
//! | [`sampler`] | Bounds-checked single pixel reads |
//! | [`magnifier`] | Zoom, grid and label passes composited into a circular overlay |
//! | [`color`] | RGB to hex codec |
//! | [`viewport`] | Points, pixel addressing and the fit transform |
//! | [`source`] | Image URL validation and the fetcher trait |
//! | [`font`] | Bundled label face and antialiased text drawing |
//! | [`error`] | Shared error-code trait |
//! | [`consts`] | Shared numeric constants (viewport size, zoom factor, grid step) |

pub mod color;
pub mod consts;
pub mod engine;
pub mod error;
pub mod font;
pub mod magnifier;
pub mod sampler;
pub mod source;
pub mod surface;
pub mod viewport;
