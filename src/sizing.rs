//! Width/height synchronization as a pure reducer.
//!
//! [`DimensionState`] holds the two numeric fields exactly as the user sees
//! them, in the active [`Unit`]. Every user action is an [`Edit`], and
//! [`DimensionState::apply`] returns the next state without touching any I/O,
//! so the whole interaction can be tested without a UI or a decoded image.
//!
//! ## Aspect lock
//!
//! With `keep_ratio` on and an image loaded, editing one side recomputes the
//! other **in pixel space** from the ratio captured at load time, then
//! converts back to the display unit:
//!
//! ```text
//! width edit (cm) → cm_to_px → height_px = round(width_px / ratio) → px_to_cm → height (cm)
//! ```
//!
//! ## Display vs. resolution
//!
//! Fields that are NaN or ≤0 are kept as 0 for display. They are only
//! rejected in [`DimensionState::resolve`], which is what export consumes.

use crate::error::ResizeError;
use crate::imaging::{Dimensions, aspect_ratio, default_target, height_for_width, width_for_height};
use crate::units::{Dpi, Unit, cm_to_px, px_to_cm, sanitize};
use serde::Serialize;

/// Natural size of the loaded image. Fixed until the next load or reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImageMeta {
    pub width_px: u32,
    pub height_px: u32,
}

impl ImageMeta {
    pub fn new(width_px: u32, height_px: u32) -> Self {
        Self {
            width_px,
            height_px,
        }
    }

    /// Width over height; 1.0 for degenerate images.
    pub fn ratio(&self) -> f64 {
        aspect_ratio(self.width_px, self.height_px)
    }
}

impl From<Dimensions> for ImageMeta {
    fn from(d: Dimensions) -> Self {
        Self::new(d.width, d.height)
    }
}

/// Which field the user touched last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Field {
    #[default]
    Width,
    Height,
}

/// A single user action on the dimension controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Edit {
    Width(f64),
    Height(f64),
    Unit(Unit),
    Dpi(f64),
    KeepRatio(bool),
}

/// Export size in whole pixels, independent of the display unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

/// The width/height/unit/DPI controls plus the aspect lock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionState {
    pub width: f64,
    pub height: f64,
    pub unit: Unit,
    pub dpi: Dpi,
    pub keep_ratio: bool,
    pub last_edited: Field,
}

impl Default for DimensionState {
    fn default() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            unit: Unit::Px,
            dpi: Dpi::default(),
            keep_ratio: true,
            last_edited: Field::Width,
        }
    }
}

impl DimensionState {
    pub fn new(unit: Unit, dpi: Dpi, keep_ratio: bool) -> Self {
        Self {
            unit,
            dpi,
            keep_ratio,
            ..Self::default()
        }
    }

    /// Fill both fields with the default target for a freshly loaded image.
    ///
    /// Unit, DPI and lock carry over from `self`.
    pub fn with_image_defaults(self, meta: ImageMeta, max_default_width: u32) -> Self {
        let (w, h) = default_target((meta.width_px, meta.height_px), max_default_width);
        Self {
            width: self.display_value(w),
            height: self.display_value(h),
            last_edited: Field::Width,
            ..self
        }
    }

    /// Empty both fields, keeping unit, DPI and lock.
    pub fn cleared(self) -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            ..self
        }
    }

    /// Apply one edit. `meta` is `None` when no image is loaded, which
    /// disables the aspect lock.
    pub fn apply(self, meta: Option<ImageMeta>, edit: Edit) -> Self {
        match edit {
            Edit::Width(value) => {
                let mut next = Self {
                    width: sanitize(value),
                    last_edited: Field::Width,
                    ..self
                };
                if let Some(ratio) = next.lock_ratio(meta) {
                    let height_px = height_for_width(next.field_px(next.width), ratio);
                    next.height = next.display_value(height_px);
                }
                next
            }
            Edit::Height(value) => {
                let mut next = Self {
                    height: sanitize(value),
                    last_edited: Field::Height,
                    ..self
                };
                if let Some(ratio) = next.lock_ratio(meta) {
                    let width_px = width_for_height(next.field_px(next.height), ratio);
                    next.width = next.display_value(width_px);
                }
                next
            }
            Edit::Unit(unit) => self.convert_to(unit),
            Edit::Dpi(value) => Self {
                dpi: Dpi::new(value),
                ..self
            },
            Edit::KeepRatio(false) => Self {
                keep_ratio: false,
                ..self
            },
            Edit::KeepRatio(true) => {
                let locked = Self {
                    keep_ratio: true,
                    ..self
                };
                match locked.last_edited {
                    Field::Width => locked.apply(meta, Edit::Width(locked.width)),
                    Field::Height => locked.apply(meta, Edit::Height(locked.height)),
                }
            }
        }
    }

    /// Resolve the fields to whole pixels for export.
    ///
    /// Fails with [`ResizeError::InvalidDimensions`] when either field is
    /// empty, zero, negative or not a number.
    pub fn resolve(&self) -> Result<TargetSize, ResizeError> {
        if !is_positive(self.width) || !is_positive(self.height) {
            return Err(ResizeError::InvalidDimensions {
                width: sanitize(self.width),
                height: sanitize(self.height),
            });
        }
        Ok(TargetSize {
            width: self.field_px(self.width),
            height: self.field_px(self.height),
        })
    }

    /// Resolved size for display, `None` while the fields are invalid.
    pub fn target_preview(&self) -> Option<TargetSize> {
        self.resolve().ok()
    }

    fn lock_ratio(&self, meta: Option<ImageMeta>) -> Option<f64> {
        meta.filter(|_| self.keep_ratio).map(|m| m.ratio())
    }

    fn convert_to(self, unit: Unit) -> Self {
        if unit == self.unit {
            return self;
        }
        let (width, height) = match unit {
            Unit::Cm => (px_to_cm(self.width, self.dpi), px_to_cm(self.height, self.dpi)),
            Unit::Px => (
                cm_to_px(self.width, self.dpi) as f64,
                cm_to_px(self.height, self.dpi) as f64,
            ),
        };
        tracing::debug!(from = %self.unit, to = %unit, width, height, "converted dimensions");
        Self {
            width,
            height,
            unit,
            ..self
        }
    }

    /// Display value → pixels in the active unit, at least 1.
    fn field_px(&self, value: f64) -> u32 {
        match self.unit {
            Unit::Px => {
                let v = sanitize(value).round();
                if v >= u32::MAX as f64 {
                    u32::MAX
                } else {
                    (v as u32).max(1)
                }
            }
            Unit::Cm => cm_to_px(value, self.dpi),
        }
    }

    /// Pixels → display value in the active unit.
    fn display_value(&self, px: u32) -> f64 {
        match self.unit {
            Unit::Px => px as f64,
            Unit::Cm => px_to_cm(px as f64, self.dpi),
        }
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
