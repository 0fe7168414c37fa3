//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Resize
//!
//! ```text
//! Original: 3000×2000 px (beach.jpg)
//! Target: 1600×1067 px (42.33×28.23 cm @ 96 DPI)
//! Saved: beach_1600x1067.jpg (1600×1067 px, jpeg q=0.92, 184.2 KB)
//!     Path: out/beach_1600x1067.jpg
//! ```
//!
//! ## Info
//!
//! ```text
//! Original: 3000×2000 px (beach.jpg)
//! Target: 1600×1067 px
//! 1 cm = 38 px @ 96 DPI
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `String` or `Vec<String>`)
//! for testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure and do no I/O.

use crate::export::ExportOutput;
use crate::sizing::{DimensionState, ImageMeta, TargetSize};
use crate::units::{Dpi, Unit, cm_to_px, px_per_cm, px_to_cm};
use serde::Serialize;
use std::path::Path;

/// Everything `info` reports, also serialized for `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct InfoReport {
    pub file: String,
    pub original: ImageMeta,
    pub default_target: Option<TargetSize>,
    pub dpi: f64,
    pub px_per_cm: u32,
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte count.
fn format_bytes(len: usize) -> String {
    const KB: f64 = 1024.0;
    let len = len as f64;
    if len < KB {
        format!("{len} B")
    } else if len < KB * KB {
        format!("{:.1} KB", len / KB)
    } else {
        format!("{:.1} MB", len / (KB * KB))
    }
}

pub fn format_original(meta: ImageMeta, file_name: &str) -> String {
    format!(
        "Original: {}×{} px ({})",
        meta.width_px, meta.height_px, file_name
    )
}

/// The resolved export size, with the centimeter view when that unit is
/// active.
pub fn format_target(state: &DimensionState) -> String {
    match state.target_preview() {
        None => "Target: invalid (width and height must be positive)".to_string(),
        Some(t) if state.unit == Unit::Cm => format!(
            "Target: {}×{} px ({}×{} cm @ {} DPI)",
            t.width, t.height, state.width, state.height, state.dpi
        ),
        Some(t) => format!("Target: {}×{} px", t.width, t.height),
    }
}

pub fn format_px_per_cm(dpi: Dpi) -> String {
    format!("1 cm = {} px @ {} DPI", px_per_cm(dpi), dpi)
}

pub fn format_export(output: &ExportOutput, path: &Path, quality: f32) -> Vec<String> {
    let encoding = if output.format.is_lossy() {
        format!("{} q={}", output.format, quality)
    } else {
        output.format.to_string()
    };
    vec![
        format!(
            "Saved: {} ({}×{} px, {}, {})",
            output.filename,
            output.width,
            output.height,
            encoding,
            format_bytes(output.bytes.len())
        ),
        format!("{}Path: {}", indent(1), path.display()),
    ]
}

pub fn format_info(report: &InfoReport) -> Vec<String> {
    let target = match report.default_target {
        Some(t) => format!("Target: {}×{} px", t.width, t.height),
        None => "Target: invalid (width and height must be positive)".to_string(),
    };
    vec![
        format_original(report.original, &report.file),
        target,
        format_px_per_cm(Dpi::new(report.dpi)),
    ]
}

/// One line for the `convert` calculator.
pub fn format_conversion(value: f64, from: Unit, dpi: Dpi) -> String {
    match from {
        Unit::Cm => format!("{} cm = {} px @ {} DPI", value, cm_to_px(value, dpi), dpi),
        Unit::Px => format!("{} px = {} cm @ {} DPI", value, px_to_cm(value, dpi), dpi),
    }
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

pub fn print_resize_plan(meta: ImageMeta, file_name: &str, state: &DimensionState) {
    println!("{}", format_original(meta, file_name));
    println!("{}", format_target(state));
}
