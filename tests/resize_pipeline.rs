//! End-to-end tests through the real `image`-crate backend.
//!
//! Source images are generated in memory and written to a scratch
//! directory; every export is decoded again to check its actual size.

use image::{ImageFormat, Rgb, RgbImage};
use simple_resize::ResizeError;
use simple_resize::export::ExportConfig;
use simple_resize::imaging::{Filter, OutputFormat, Quality, RustBackend};
use simple_resize::loader::SourceFile;
use simple_resize::session::{Session, SessionDefaults, SessionEvent};
use simple_resize::sizing::{Edit, ImageMeta};
use simple_resize::units::{Dpi, Unit};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write a gradient image to `dir/name` in the format implied by the extension.
fn write_source(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let path = dir.join(name);
    img.save(&path).unwrap();
    path
}

fn session_with(defaults: SessionDefaults) -> Session<RustBackend> {
    Session::new(RustBackend::new(), defaults)
}

/// Select `path` and wait for the decode.
fn load(session: &mut Session<RustBackend>, path: &Path) -> ImageMeta {
    session.select_file(Some(SourceFile::read(path).unwrap()));
    match session.next_current_event() {
        Some(SessionEvent::Loaded(meta)) => meta,
        other => panic!("expected Loaded, got {:?}", other),
    }
}

fn export_and_save(
    session: &mut Session<RustBackend>,
    config: &ExportConfig,
    out_dir: &Path,
) -> PathBuf {
    session.request_export(config).unwrap();
    match session.next_current_event() {
        Some(SessionEvent::Exported(out)) => out.save(out_dir).unwrap(),
        other => panic!("expected Exported, got {:?}", other),
    }
}

fn saved_dimensions(path: &Path) -> (u32, u32) {
    image::image_dimensions(path).unwrap()
}

// =========================================================================
// Default target and lock
// =========================================================================

#[test]
fn wide_jpeg_is_capped_to_default_width() {
    let tmp = TempDir::new().unwrap();
    let source = write_source(tmp.path(), "beach.jpg", 300, 200);
    let mut session = session_with(SessionDefaults {
        max_default_width: 160,
        ..SessionDefaults::default()
    });

    let meta = load(&mut session, &source);
    assert_eq!(meta, ImageMeta::new(300, 200));

    let config = session.export_config(OutputFormat::Jpeg, Quality::new(0.8), Filter::Triangle);
    let out_dir = tmp.path().join("out");
    let saved = export_and_save(&mut session, &config, &out_dir);

    assert_eq!(saved.file_name().unwrap(), "beach_160x107.jpg");
    assert_eq!(saved_dimensions(&saved), (160, 107));
}

#[test]
fn small_image_keeps_natural_size() {
    let tmp = TempDir::new().unwrap();
    let source = write_source(tmp.path(), "icon.png", 40, 30);
    let mut session = session_with(SessionDefaults::default());
    load(&mut session, &source);

    let config = session.export_config(OutputFormat::Png, Quality::default(), Filter::Nearest);
    let saved = export_and_save(&mut session, &config, tmp.path());

    assert_eq!(saved.file_name().unwrap(), "icon_40x30.png");
    assert_eq!(saved_dimensions(&saved), (40, 30));
}

#[test]
fn width_edit_with_lock_derives_height() {
    let tmp = TempDir::new().unwrap();
    let source = write_source(tmp.path(), "photo.png", 300, 200);
    let mut session = session_with(SessionDefaults::default());
    load(&mut session, &source);

    session.edit(Edit::Width(90.0));
    let config = session.export_config(OutputFormat::Png, Quality::default(), Filter::Triangle);
    let saved = export_and_save(&mut session, &config, tmp.path());

    assert_eq!(saved_dimensions(&saved), (90, 60));
}

#[test]
fn unlocked_exact_size_distorts() {
    let tmp = TempDir::new().unwrap();
    let source = write_source(tmp.path(), "photo.png", 300, 200);
    let mut session = session_with(SessionDefaults::default());
    load(&mut session, &source);

    session.edit(Edit::KeepRatio(false));
    session.edit(Edit::Width(50.0));
    session.edit(Edit::Height(50.0));
    let config = session.export_config(OutputFormat::Png, Quality::default(), Filter::Triangle);
    let saved = export_and_save(&mut session, &config, tmp.path());

    assert_eq!(saved.file_name().unwrap(), "photo_50x50.png");
    assert_eq!(saved_dimensions(&saved), (50, 50));
}

// =========================================================================
// Centimeters
// =========================================================================

#[test]
fn centimeter_width_at_96_dpi() {
    let tmp = TempDir::new().unwrap();
    let source = write_source(tmp.path(), "scan.png", 600, 400);
    let mut session = session_with(SessionDefaults {
        unit: Unit::Cm,
        dpi: Dpi::new(96.0),
        ..SessionDefaults::default()
    });
    load(&mut session, &source);

    // 10 cm @ 96 DPI = 378 px; the lock gives 378 / 1.5 = 252 px.
    session.edit(Edit::Width(10.0));
    let preview = session.target_preview().unwrap();
    assert_eq!((preview.width, preview.height), (378, 252));

    let config = session.export_config(OutputFormat::Png, Quality::default(), Filter::Triangle);
    let saved = export_and_save(&mut session, &config, tmp.path());
    assert_eq!(saved_dimensions(&saved), (378, 252));
}

// =========================================================================
// Formats
// =========================================================================

#[test]
fn webp_export_uses_webp_container() {
    let tmp = TempDir::new().unwrap();
    let source = write_source(tmp.path(), "pic.png", 64, 48);
    let mut session = session_with(SessionDefaults::default());
    load(&mut session, &source);

    let config = session.export_config(OutputFormat::Webp, Quality::new(0.5), Filter::Triangle);
    let saved = export_and_save(&mut session, &config, tmp.path());

    assert_eq!(saved.extension().unwrap(), "webp");
    let bytes = std::fs::read(&saved).unwrap();
    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(&bytes[8..12], b"WEBP");
    assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::WebP);
}

#[test]
fn jpeg_export_is_named_jpg() {
    let tmp = TempDir::new().unwrap();
    let source = write_source(tmp.path(), "pic.png", 64, 48);
    let mut session = session_with(SessionDefaults::default());
    load(&mut session, &source);

    let config = session.export_config(OutputFormat::Jpeg, Quality::default(), Filter::Triangle);
    let saved = export_and_save(&mut session, &config, tmp.path());

    assert_eq!(saved.file_name().unwrap(), "pic_64x48.jpg");
    let bytes = std::fs::read(&saved).unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
}

// =========================================================================
// Failures
// =========================================================================

#[test]
fn zero_width_is_rejected_before_encoding() {
    let tmp = TempDir::new().unwrap();
    let source = write_source(tmp.path(), "photo.png", 300, 200);
    let mut session = session_with(SessionDefaults::default());
    load(&mut session, &source);

    session.edit(Edit::Width(0.0));
    let config = session.export_config(OutputFormat::Png, Quality::default(), Filter::Triangle);
    let result = session.request_export(&config);

    assert!(matches!(result, Err(ResizeError::InvalidDimensions { .. })));
    assert!(!session.has_pending());
}

#[test]
fn oversize_target_fails_and_session_still_exports() {
    let tmp = TempDir::new().unwrap();
    let source = write_source(tmp.path(), "tiny.png", 4, 4);
    let mut session = session_with(SessionDefaults::default());
    load(&mut session, &source);

    session.edit(Edit::KeepRatio(false));
    session.edit(Edit::Width(1e12));
    session.edit(Edit::Height(1e12));
    let config = session.export_config(OutputFormat::Png, Quality::default(), Filter::Triangle);
    let result = session.request_export(&config);

    assert!(matches!(result, Err(ResizeError::OutputTooLarge { .. })));
    assert!(!session.has_pending());
    assert_eq!(session.meta(), Some(ImageMeta::new(4, 4)));

    session.edit(Edit::Width(8.0));
    session.edit(Edit::Height(6.0));
    let saved = export_and_save(&mut session, &config, tmp.path());
    assert_eq!(saved.file_name().unwrap(), "tiny_8x6.png");
    assert_eq!(saved_dimensions(&saved), (8, 6));
}

#[test]
fn configured_output_limit_is_enforced() {
    let tmp = TempDir::new().unwrap();
    let source = write_source(tmp.path(), "photo.png", 300, 200);
    let mut session = session_with(SessionDefaults {
        max_output_pixels: 20_000,
        ..SessionDefaults::default()
    });
    load(&mut session, &source);

    // The default target is the natural 300x200 = 60000 px.
    let config = session.export_config(OutputFormat::Png, Quality::default(), Filter::Triangle);
    assert!(matches!(
        session.request_export(&config),
        Err(ResizeError::OutputTooLarge { max_pixels: 20_000, .. })
    ));

    session.edit(Edit::Width(150.0));
    let saved = export_and_save(&mut session, &config, tmp.path());
    assert_eq!(saved_dimensions(&saved), (150, 100));
}

#[test]
fn non_image_file_fails_to_load_and_session_stays_usable() {
    let tmp = TempDir::new().unwrap();
    let bogus = tmp.path().join("notes.png");
    std::fs::write(&bogus, b"definitely not an image").unwrap();
    let mut session = session_with(SessionDefaults::default());

    session.select_file(Some(SourceFile::read(&bogus).unwrap()));
    match session.next_current_event() {
        Some(SessionEvent::LoadFailed(ResizeError::Decode(_))) => {}
        other => panic!("expected decode failure, got {:?}", other),
    }
    assert!(session.meta().is_none());

    let source = write_source(tmp.path(), "good.png", 20, 10);
    assert_eq!(load(&mut session, &source), ImageMeta::new(20, 10));
}

#[test]
fn save_leaves_only_the_final_file() {
    let tmp = TempDir::new().unwrap();
    let source = write_source(tmp.path(), "photo.png", 30, 20);
    let mut session = session_with(SessionDefaults::default());
    load(&mut session, &source);

    let out_dir = tmp.path().join("nested").join("out");
    let config = session.export_config(OutputFormat::Png, Quality::default(), Filter::Triangle);
    export_and_save(&mut session, &config, &out_dir);

    let entries: Vec<_> = std::fs::read_dir(&out_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec!["photo_30x20.png"]);
}
