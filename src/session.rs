//! The single controller that owns the loaded image and the size controls.
//!
//! Decodes and encodes run on the rayon pool; their completions come back
//! over a channel and are applied by [`Session::next_event`] on the caller's
//! thread, so all state changes happen in one place, in order.
//!
//! ## Superseding
//!
//! Every file selection (or reset) bumps a generation counter and releases
//! the current image immediately. Work is tagged with the generation it was
//! started under; a completion carrying an older tag is dropped and reported
//! as [`SessionEvent::Superseded`]. A slow decode of a previous file can
//! therefore never overwrite the image or size the user is looking at, and
//! an export started before a new selection never surfaces.
//!
//! ## Worker failures
//!
//! Oversized targets are refused before any work is spawned, and a panic
//! inside a worker is caught and delivered as a failed completion, so every
//! spawned job reports back exactly once. At most one export runs per
//! image; a second request while one is pending fails with
//! [`ResizeError::ExportInProgress`].

use crate::error::{ResizeError, Result};
use crate::export::{self, DEFAULT_MAX_OUTPUT_PIXELS, ExportConfig, ExportOutput};
use crate::imaging::{Filter, ImageBackend, OutputFormat, Quality};
use crate::loader::{self, LoadedImage, SourceFile};
use crate::sizing::{DimensionState, Edit, ImageMeta, TargetSize};
use crate::units::{Dpi, Unit};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

/// Identifies the selection an async operation was started under.
pub type Ticket = u64;

/// Default width cap applied when an image is loaded.
pub const DEFAULT_MAX_WIDTH: u32 = 1600;

/// Preferences that survive across loads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionDefaults {
    pub unit: Unit,
    pub dpi: Dpi,
    pub keep_ratio: bool,
    pub max_default_width: u32,
    pub max_output_pixels: u64,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            unit: Unit::Px,
            dpi: Dpi::default(),
            keep_ratio: true,
            max_default_width: DEFAULT_MAX_WIDTH,
            max_output_pixels: DEFAULT_MAX_OUTPUT_PIXELS,
        }
    }
}

/// Outcome of one finished async operation.
#[derive(Debug)]
pub enum SessionEvent {
    Loaded(ImageMeta),
    LoadFailed(ResizeError),
    Exported(ExportOutput),
    ExportFailed(ResizeError),
    /// The operation belonged to an earlier selection; its result was dropped.
    Superseded(Ticket),
}

enum Completion<H> {
    Loaded {
        ticket: Ticket,
        result: Result<LoadedImage<H>>,
    },
    Exported {
        ticket: Ticket,
        result: Result<ExportOutput>,
    },
}

impl<H> Completion<H> {
    fn ticket(&self) -> Ticket {
        match self {
            Self::Loaded { ticket, .. } | Self::Exported { ticket, .. } => *ticket,
        }
    }
}

pub struct Session<B: ImageBackend> {
    backend: Arc<B>,
    image: Option<LoadedImage<B::Handle>>,
    dimensions: DimensionState,
    max_default_width: u32,
    max_output_pixels: u64,
    generation: Ticket,
    pending: usize,
    exporting: bool,
    tx: Sender<Completion<B::Handle>>,
    rx: Receiver<Completion<B::Handle>>,
}

impl<B: ImageBackend> Session<B> {
    pub fn new(backend: B, defaults: SessionDefaults) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            backend: Arc::new(backend),
            image: None,
            dimensions: DimensionState::new(defaults.unit, defaults.dpi, defaults.keep_ratio),
            max_default_width: defaults.max_default_width,
            max_output_pixels: defaults.max_output_pixels,
            generation: 0,
            pending: 0,
            exporting: false,
            tx,
            rx,
        }
    }

    /// Start loading `file`, replacing whatever was loaded before.
    ///
    /// The previous image is released right away. `None` resets the session
    /// and returns `None`; otherwise the decode runs in the background and
    /// the returned ticket identifies its completion.
    pub fn select_file(&mut self, file: Option<SourceFile>) -> Option<Ticket> {
        self.release();
        let file = file?;

        let ticket = self.generation;
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        tracing::debug!(ticket, file = %file.name, "decode started");
        rayon::spawn(move || {
            let result = guarded(|| loader::load(backend.as_ref(), Some(file)), ResizeError::Decode);
            // The session may be gone by now; nothing to report to.
            let _ = tx.send(Completion::Loaded { ticket, result });
        });
        self.pending += 1;
        Some(ticket)
    }

    /// Drop the loaded image and empty the size fields.
    pub fn reset(&mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(image) = self.image.take() {
            tracing::debug!(file = %image.file_name, "released image");
        }
        self.generation += 1;
        self.exporting = false;
        self.dimensions = self.dimensions.cleared();
    }

    /// Apply a user edit to the size controls.
    pub fn edit(&mut self, edit: Edit) {
        self.dimensions = self.dimensions.apply(self.meta(), edit);
    }

    /// Build an export config named after the loaded file.
    pub fn export_config(&self, format: OutputFormat, quality: Quality, filter: Filter) -> ExportConfig {
        ExportConfig {
            format,
            quality,
            filter,
            max_pixels: self.max_output_pixels,
            filename_base: self
                .image
                .as_ref()
                .map(|i| i.base_name.clone())
                .unwrap_or_else(|| loader::FALLBACK_BASE_NAME.to_string()),
        }
    }

    /// Start encoding the loaded image at the current target size.
    ///
    /// Invalid or oversized dimensions are reported here, synchronously, and
    /// nothing is rasterized.
    pub fn request_export(&mut self, config: &ExportConfig) -> Result<Ticket> {
        let image = self.image.as_ref().ok_or(ResizeError::UnsupportedInput)?;
        if self.exporting {
            return Err(ResizeError::ExportInProgress);
        }
        let target = self.dimensions.resolve()?;
        export::check_output_size(target, config.max_pixels)?;

        let ticket = self.generation;
        let backend = Arc::clone(&self.backend);
        let handle = Arc::clone(&image.handle);
        let config = config.clone();
        let tx = self.tx.clone();
        tracing::debug!(ticket, width = target.width, height = target.height, "export started");
        rayon::spawn(move || {
            let result = guarded(
                || export::export(backend.as_ref(), handle.as_ref(), target, &config),
                ResizeError::Encode,
            );
            let _ = tx.send(Completion::Exported { ticket, result });
        });
        self.pending += 1;
        self.exporting = true;
        Ok(ticket)
    }

    /// Block until the next async operation finishes and apply it.
    ///
    /// Returns `None` when nothing is in flight.
    pub fn next_event(&mut self) -> Option<SessionEvent> {
        if self.pending == 0 {
            return None;
        }
        let completion = self.rx.recv().ok()?;
        self.pending -= 1;

        let ticket = completion.ticket();
        if ticket != self.generation {
            tracing::debug!(ticket, current = self.generation, "discarding superseded result");
            return Some(SessionEvent::Superseded(ticket));
        }

        Some(match completion {
            Completion::Loaded { result: Ok(image), .. } => {
                let meta = image.meta;
                self.dimensions = self
                    .dimensions
                    .with_image_defaults(meta, self.max_default_width);
                self.image = Some(image);
                SessionEvent::Loaded(meta)
            }
            Completion::Loaded { result: Err(e), .. } => SessionEvent::LoadFailed(e),
            Completion::Exported { result, .. } => {
                self.exporting = false;
                match result {
                    Ok(output) => SessionEvent::Exported(output),
                    Err(e) => SessionEvent::ExportFailed(e),
                }
            }
        })
    }

    /// Like [`next_event`](Self::next_event), skipping superseded results.
    pub fn next_current_event(&mut self) -> Option<SessionEvent> {
        loop {
            match self.next_event()? {
                SessionEvent::Superseded(_) => continue,
                event => return Some(event),
            }
        }
    }

    pub fn meta(&self) -> Option<ImageMeta> {
        self.image.as_ref().map(|i| i.meta)
    }

    pub fn file_name(&self) -> Option<&str> {
        self.image.as_ref().map(|i| i.file_name.as_str())
    }

    pub fn dimensions(&self) -> &DimensionState {
        &self.dimensions
    }

    /// Resolved export size, `None` while no image is loaded or the fields
    /// are invalid.
    pub fn target_preview(&self) -> Option<TargetSize> {
        self.image.as_ref()?;
        self.dimensions.target_preview()
    }

    pub fn has_pending(&self) -> bool {
        self.pending > 0
    }
}

/// Run a worker job, turning a panic into `on_panic(message)` so the
/// completion is still sent.
fn guarded<T>(job: impl FnOnce() -> Result<T>, on_panic: fn(String) -> ResizeError) -> Result<T> {
    panic::catch_unwind(AssertUnwindSafe(job)).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "worker panicked".to_string());
        tracing::error!(%message, "worker panicked");
        Err(on_panic(message))
    })
}
