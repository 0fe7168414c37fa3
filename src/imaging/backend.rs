//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two capabilities the rest of the
//! crate needs from a rendering surface: turn bytes into a drawable handle,
//! and turn a handle into encoded bytes at a given size.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Sizing and session logic only ever see this trait, so they are
//! tested against [`tests::MockBackend`] without decoding a single pixel.

use super::params::RenderParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Intrinsic pixel dimensions of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Result of a decode: dimensions plus the backend's drawable handle.
#[derive(Debug)]
pub struct Decoded<H> {
    pub dimensions: Dimensions,
    pub handle: H,
}

/// Trait for image processing backends.
///
/// Implementations must be shareable across the worker pool that runs
/// decodes and encodes off the caller's thread.
pub trait ImageBackend: Send + Sync + 'static {
    /// Decoded pixel data, drawable by [`render`](Self::render).
    type Handle: Send + Sync + 'static;

    /// Decode raw file bytes. The format is sniffed from the content.
    fn decode(&self, bytes: &[u8]) -> Result<Decoded<Self::Handle>, BackendError>;

    /// Scale `handle` to exactly `params.width`x`params.height` and encode.
    fn render(&self, handle: &Self::Handle, params: &RenderParams) -> Result<Vec<u8>, BackendError>;
}
