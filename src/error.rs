//! Error taxonomy for load, sizing and export operations.
//!
//! Every variant is recoverable at the operation boundary: the session stays
//! usable and the user retries by choosing another file or fixing dimensions.
//!
//! | Variant | Raised by | Caller policy |
//! |---|---|---|
//! | [`ResizeError::UnsupportedInput`] | loader, session | treat as a reset, don't surface |
//! | [`ResizeError::Decode`] | loader | surface; session is left cleared |
//! | [`ResizeError::InvalidDimensions`] | sizing, export | surface; nothing is rasterized |
//! | [`ResizeError::OutputTooLarge`] | session, export | surface; nothing is rasterized |
//! | [`ResizeError::ExportInProgress`] | session | wait for the running export |
//! | [`ResizeError::Encode`] | export | surface; no file is written |

use crate::imaging::BackendError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResizeError {
    #[error("No image selected")]
    UnsupportedInput,
    #[error("Could not read image: {0}")]
    Decode(String),
    #[error("Invalid dimensions: {width}x{height} (both must be at least 1px)")]
    InvalidDimensions { width: f64, height: f64 },
    #[error("Output too large: {width}x{height} exceeds {max_pixels} pixels")]
    OutputTooLarge {
        width: u32,
        height: u32,
        max_pixels: u64,
    },
    #[error("An export is already running for this image")]
    ExportInProgress,
    #[error("Could not generate the image: {0}")]
    Encode(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResizeError {
    /// True for the "nothing chosen" case, which callers handle as a reset
    /// rather than reporting it.
    pub fn is_reset(&self) -> bool {
        matches!(self, Self::UnsupportedInput)
    }
}

impl From<BackendError> for ResizeError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Decode(msg) => Self::Decode(msg),
            BackendError::Encode(msg) => Self::Encode(msg),
            BackendError::Io(e) => Self::Io(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, ResizeError>;
