//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.
//! They work in pixel space only; unit handling lives in [`crate::sizing`].

/// Width-over-height ratio of the source image.
///
/// Falls back to 1.0 when either side is zero so callers never divide by
/// zero or propagate NaN.
///
/// # Examples
/// ```
/// # use simple_resize::imaging::aspect_ratio;
/// assert_eq!(aspect_ratio(3000, 2000), 1.5);
/// assert_eq!(aspect_ratio(640, 0), 1.0);
/// ```
pub fn aspect_ratio(width: u32, height: u32) -> f64 {
    if width == 0 || height == 0 {
        return 1.0;
    }
    width as f64 / height as f64
}

/// Height matching `width_px` at `ratio`, at least 1px.
pub fn height_for_width(width_px: u32, ratio: f64) -> u32 {
    to_pixels(width_px as f64 / ratio)
}

/// Width matching `height_px` at `ratio`, at least 1px.
pub fn width_for_height(height_px: u32, ratio: f64) -> u32 {
    to_pixels(height_px as f64 * ratio)
}

/// Default export size for a freshly loaded image.
///
/// The width is capped at `max_width` and the height follows the source
/// aspect ratio. Images narrower than the cap keep their natural size.
///
/// # Examples
/// ```
/// # use simple_resize::imaging::default_target;
/// assert_eq!(default_target((3000, 2000), 1600), (1600, 1067));
/// assert_eq!(default_target((800, 600), 1600), (800, 600));
/// ```
pub fn default_target(natural: (u32, u32), max_width: u32) -> (u32, u32) {
    let (w, h) = natural;
    let ratio = aspect_ratio(w, h);
    let width = w.min(max_width).max(1);
    (width, height_for_width(width, ratio))
}

/// Round to the nearest pixel, clamped to `1..=u32::MAX`.
fn to_pixels(value: f64) -> u32 {
    if !value.is_finite() || value < 1.0 {
        return 1;
    }
    let rounded = value.round();
    if rounded >= u32::MAX as f64 {
        u32::MAX
    } else {
        rounded as u32
    }
}
