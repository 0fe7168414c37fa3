//! Image processing: decode, scale and encode.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (format sniffed from content) |
//! | **Resize** | `resize_exact`, Lanczos3 by default |
//! | **Encode** | PNG / JPEG via `image`, lossy WebP via `webp` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing a render
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Decoded, Dimensions, ImageBackend};
pub use calculations::{aspect_ratio, default_target, height_for_width, width_for_height};
pub use params::{Filter, OutputFormat, Quality, RenderParams};
pub use rust_backend::{RustBackend, supported_input_extensions};
