//! Turning a selected file into a drawable image.
//!
//! [`load`] is the synchronous core; [`Session`](crate::session::Session)
//! runs it on a worker and discards results that arrive after a newer
//! selection.

use crate::error::{ResizeError, Result};
use crate::imaging::ImageBackend;
use crate::sizing::ImageMeta;
use std::path::Path;
use std::sync::Arc;

/// Base name used when the original file name has nothing left after
/// stripping the extension.
pub const FALLBACK_BASE_NAME: &str = "image";

/// Raw bytes of a user-selected file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { name, bytes })
    }
}

/// A decoded image ready for export.
///
/// Dropping it releases the pixel data; the session holds exactly one at a
/// time.
#[derive(Debug)]
pub struct LoadedImage<H> {
    pub meta: ImageMeta,
    pub handle: Arc<H>,
    pub file_name: String,
    pub base_name: String,
}

/// Decode `file` into a [`LoadedImage`].
///
/// `None` means the selection was emptied and yields
/// [`ResizeError::UnsupportedInput`], which callers treat as a reset.
pub fn load<B: ImageBackend>(backend: &B, file: Option<SourceFile>) -> Result<LoadedImage<B::Handle>> {
    let file = file.ok_or(ResizeError::UnsupportedInput)?;
    let decoded = backend.decode(&file.bytes).map_err(|e| {
        tracing::warn!(file = %file.name, error = %e, "decode failed");
        ResizeError::from(e)
    })?;

    let meta = ImageMeta::from(decoded.dimensions);
    tracing::info!(
        file = %file.name,
        width = meta.width_px,
        height = meta.height_px,
        "image loaded"
    );
    Ok(LoadedImage {
        meta,
        handle: Arc::new(decoded.handle),
        base_name: base_name(&file.name),
        file_name: file.name,
    })
}

/// File name without directories or its final extension.
///
/// - `"holiday.jpeg"` → `"holiday"`
/// - `"archive.tar.png"` → `"archive.tar"`
/// - `".png"` / `""` → `"image"`
pub fn base_name(file_name: &str) -> String {
    let name = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);
    let stem = match name.rfind('.') {
        Some(dot) if dot + 1 < name.len() => &name[..dot],
        _ => name,
    };
    if stem.is_empty() {
        FALLBACK_BASE_NAME.to_string()
    } else {
        stem.to_string()
    }
}
