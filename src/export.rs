//! Export pipeline: scale the loaded image to the target size and encode it.
//!
//! ```text
//! TargetSize + handle + ExportConfig
//!     → validate (≥1px each side, at most max_pixels in total; backend untouched otherwise)
//!     → backend.render (resize_exact + encode)
//!     → ExportOutput { bytes, "{base}_{w}x{h}.{ext}" }
//!     → ExportOutput::save (temp file + atomic rename)
//! ```

use crate::error::{ResizeError, Result};
use crate::imaging::{Filter, ImageBackend, OutputFormat, Quality, RenderParams};
use crate::loader::FALLBACK_BASE_NAME;
use crate::sizing::TargetSize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default cap on `width * height` of an export. At 4 bytes per pixel this
/// keeps the decoded canvas around 400 MB.
pub const DEFAULT_MAX_OUTPUT_PIXELS: u64 = 100_000_000;

/// User-chosen encoding options.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    pub format: OutputFormat,
    /// Ignored for PNG.
    pub quality: Quality,
    pub filename_base: String,
    pub filter: Filter,
    /// Largest `width * height` that will be rasterized.
    pub max_pixels: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            quality: Quality::default(),
            filename_base: FALLBACK_BASE_NAME.to_string(),
            filter: Filter::default(),
            max_pixels: DEFAULT_MAX_OUTPUT_PIXELS,
        }
    }
}

/// Encoded image plus its suggested download name.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutput {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
}

impl ExportOutput {
    /// Write the bytes into `dir` under [`filename`](Self::filename).
    ///
    /// The data goes to a temporary file in the same directory first and is
    /// renamed into place once complete, so a failed write never leaves a
    /// partial file behind. The temporary file is removed as soon as it is
    /// dropped.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let target = dir.join(&self.filename);

        let mut staging = tempfile::NamedTempFile::new_in(dir)?;
        staging.write_all(&self.bytes)?;
        staging.as_file().sync_all()?;
        staging.persist(&target).map_err(|e| ResizeError::Io(e.error))?;

        tracing::info!(path = %target.display(), bytes = self.bytes.len(), "export saved");
        Ok(target)
    }
}

/// Suggested download name: `{base}_{width}x{height}.{ext}`.
///
/// # Examples
/// ```
/// # use simple_resize::export::output_filename;
/// # use simple_resize::imaging::OutputFormat;
/// assert_eq!(output_filename("beach", 1600, 1067, OutputFormat::Jpeg), "beach_1600x1067.jpg");
/// ```
pub fn output_filename(base: &str, width: u32, height: u32, format: OutputFormat) -> String {
    let base = if base.is_empty() { FALLBACK_BASE_NAME } else { base };
    format!("{base}_{width}x{height}.{}", format.extension())
}

/// Check that `target` can be rasterized: both sides at least 1px and no
/// more than `max_pixels` in total.
pub fn check_output_size(target: TargetSize, max_pixels: u64) -> Result<()> {
    if target.width == 0 || target.height == 0 {
        return Err(ResizeError::InvalidDimensions {
            width: target.width as f64,
            height: target.height as f64,
        });
    }
    if u64::from(target.width) * u64::from(target.height) > max_pixels {
        return Err(ResizeError::OutputTooLarge {
            width: target.width,
            height: target.height,
            max_pixels,
        });
    }
    Ok(())
}

/// Render `handle` at `target` and encode it per `config`.
///
/// Fails before touching the backend when [`check_output_size`] rejects the
/// target, and with [`ResizeError::Encode`] when the encoder produces
/// nothing.
pub fn export<B: ImageBackend>(
    backend: &B,
    handle: &B::Handle,
    target: TargetSize,
    config: &ExportConfig,
) -> Result<ExportOutput> {
    check_output_size(target, config.max_pixels)?;

    let params = RenderParams {
        width: target.width,
        height: target.height,
        format: config.format,
        quality: config.quality,
        filter: config.filter,
    };
    let bytes = backend.render(handle, &params)?;
    if bytes.is_empty() {
        return Err(ResizeError::Encode(format!(
            "{} encoder returned no data",
            config.format
        )));
    }

    let filename = output_filename(&config.filename_base, target.width, target.height, config.format);
    tracing::info!(
        %filename,
        format = %config.format,
        quality = config.format.is_lossy().then_some(config.quality.value()),
        size = bytes.len(),
        "export encoded"
    );
    Ok(ExportOutput {
        bytes,
        filename,
        format: config.format,
        width: target.width,
        height: target.height,
    })
}
