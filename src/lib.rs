//! # Simple Resize
//!
//! Resize one image to an exact size given in pixels or in centimeters at a
//! chosen DPI, optionally locked to the source aspect ratio, and export it
//! as PNG, JPEG or WebP.
//!
//! # Architecture
//!
//! ```text
//! SourceFile ──load──▶ LoadedImage ──▶ DimensionState (defaults)
//!                                         │  ▲
//!                                   Edit ─┘  │ apply (pure reducer)
//!                                         ▼
//!                                    TargetSize ──export──▶ ExportOutput ──save──▶ file
//! ```
//!
//! All mutable state lives in one [`session::Session`]. It releases the
//! previous image on every new selection and ignores async results that
//! belong to an earlier selection. Pixel work goes through the
//! [`imaging::ImageBackend`] trait, so sizing and session logic are tested
//! against a mock with no decoding at all.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`units`] | px ↔ cm conversion at a DPI |
//! | [`sizing`] | Width/height reducer, aspect lock, resolution to pixels |
//! | [`loader`] | File → decoded image + natural size |
//! | [`export`] | Scale + encode, output naming, atomic save |
//! | [`session`] | Controller owning the image, the controls and async completions |
//! | [`imaging`] | Backend trait, `image`-crate backend, pure dimension math |
//! | [`config`] | `simple-resize.toml` loading, validation and merging |
//! | [`output`] | CLI output formatting |
//! | [`error`] | Error taxonomy |
//!
//! # Design Decisions
//!
//! ## Reducer Over Callbacks
//!
//! Each control change is an [`sizing::Edit`] applied by a pure function
//! that returns the next state. The same handlers serve the CLI and tests,
//! and no handler needs a live UI to be exercised.
//!
//! ## Locking In Pixel Space
//!
//! The aspect lock always recomputes the other side in pixels and converts
//! back to the display unit. Centimeter rounding never drifts the ratio
//! of the exported file.

pub mod config;
pub mod error;
pub mod export;
pub mod imaging;
pub mod loader;
pub mod output;
pub mod session;
pub mod sizing;
pub mod units;

pub use error::ResizeError;
