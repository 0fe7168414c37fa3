//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP, GIF) | `image::ImageReader` with content sniffing |
//! | Resize | `image::DynamicImage::resize_exact` (scales, never crops) |
//! | Encode → PNG | `image::codecs::png::PngEncoder` (lossless) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (quality 1–100) |
//! | Encode → WebP | `webp::Encoder` (libwebp, lossy) |

use super::backend::{BackendError, Decoded, Dimensions, ImageBackend};
use super::params::{OutputFormat, RenderParams};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;
use std::sync::LazyLock;

const INPUT_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
    ("gif", ImageFormat::Gif),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    INPUT_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the image file extensions that have working decoders compiled in.
///
/// Informational only: decoding sniffs the content and ignores extensions.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn encode(img: &DynamicImage, params: &RenderParams) -> Result<Vec<u8>, BackendError> {
    let mut bytes = Vec::new();
    match params.format {
        OutputFormat::Png => img
            .write_with_encoder(PngEncoder::new(&mut bytes))
            .map_err(|e| BackendError::Encode(format!("PNG encode failed: {e}")))?,
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            let encoder = JpegEncoder::new_with_quality(&mut bytes, params.quality.percent());
            rgb.write_with_encoder(encoder)
                .map_err(|e| BackendError::Encode(format!("JPEG encode failed: {e}")))?
        }
        OutputFormat::Webp => {
            let rgba = img.to_rgba8();
            let encoded = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height())
                .encode_simple(false, params.quality.percent() as f32)
                .map_err(|e| BackendError::Encode(format!("WebP encode failed: {e:?}")))?;
            bytes.extend_from_slice(&encoded);
        }
    }

    if bytes.is_empty() {
        return Err(BackendError::Encode(format!(
            "{} encoder returned no data",
            params.format
        )));
    }
    Ok(bytes)
}

impl ImageBackend for RustBackend {
    type Handle = DynamicImage;

    fn decode(&self, bytes: &[u8]) -> Result<Decoded<DynamicImage>, BackendError> {
        let img = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(BackendError::Io)?
            .decode()
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(Decoded {
            dimensions: Dimensions {
                width: img.width(),
                height: img.height(),
            },
            handle: img,
        })
    }

    fn render(
        &self,
        handle: &DynamicImage,
        params: &RenderParams,
    ) -> Result<Vec<u8>, BackendError> {
        let resized = if handle.width() == params.width && handle.height() == params.height {
            handle.clone()
        } else {
            handle.resize_exact(params.width, params.height, params.filter.filter_type())
        };
        encode(&resized, params)
    }
}
