//! Integration tests for rendering and exporting through a session
//!
//! These tests verify:
//! - SVG and PNG files land in the target directory under the text's name
//! - The PNG is a real raster with the configured colors
//! - Edits that break encoding keep exporting the last good code

use barqr::export::{self, ExportFormat};
use barqr::{CodeOptions, Error, Format, Rendered, Session};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_export_svg() {
    let temp_dir = TempDir::new().unwrap();
    let session = Session::new(CodeOptions::default());

    let path = session
        .export(ExportFormat::Svg, &temp_dir.path().join("out"))
        .unwrap();

    assert_eq!(path, temp_dir.path().join("out").join("www.codekraft.it.svg"));
    let svg = fs::read_to_string(&path).unwrap();
    assert!(svg.starts_with("<?xml"));
    assert!(svg.contains("fill=\"#000000\""));
    assert_eq!(svg, session.preview().unwrap().svg);
}

#[test]
fn test_export_png() {
    let temp_dir = TempDir::new().unwrap();
    let mut session = Session::new(CodeOptions::default());
    session.set_field("background", "#00ff00").unwrap();
    session.set_field("size", "200").unwrap();
    session.set_field("margin", "4").unwrap();

    let path = session.export(ExportFormat::Png, temp_dir.path()).unwrap();

    assert_eq!(path.extension().unwrap(), "png");
    let img = image::open(&path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (200, 200));
    // Version 2 with a 4 module quiet zone: 33 modules at 6 px, symbol starts at 25 px
    assert_eq!(img.get_pixel(0, 0).0, [0, 255, 0, 255]);
    assert_eq!(img.get_pixel(24, 24).0, [0, 255, 0, 255]);
    assert_eq!(img.get_pixel(25, 25).0, [0, 0, 0, 255]);
}

#[test]
fn test_export_png_fills_edge_without_margin() {
    let temp_dir = TempDir::new().unwrap();
    let mut session = Session::new(CodeOptions::default());
    session.set_field("size", "200").unwrap();

    let path = session.export(ExportFormat::Png, temp_dir.path()).unwrap();

    // 25 modules scale by 8 to exactly 200 px, so the corner is a finder module
    let img = image::open(&path).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
}

#[test]
fn test_export_barcode_uses_sanitized_name() {
    let temp_dir = TempDir::new().unwrap();
    let options = CodeOptions {
        text: "A/B:C".into(),
        format: Format::Code128,
        ..CodeOptions::default()
    };
    let rendered = Rendered::new(&options).unwrap();

    let path = export::export(&rendered, ExportFormat::Svg, temp_dir.path()).unwrap();

    assert_eq!(path.file_name().unwrap(), "A_B_C.svg");
    assert!(fs::read_to_string(&path).unwrap().contains(">A/B:C</text>"));
}

#[test]
fn test_data_matrix_exports() {
    let temp_dir = TempDir::new().unwrap();
    let mut session = Session::new(CodeOptions::default());
    session.set_field("format", "DATA_MATRIX").unwrap();
    assert!(session.last_error().is_none());

    let path = session.export(ExportFormat::Png, temp_dir.path()).unwrap();

    let img = image::open(&path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (300, 300));
}

#[test]
fn test_failed_edit_exports_previous_code() {
    let temp_dir = TempDir::new().unwrap();
    let mut session = Session::new(CodeOptions::default());
    session.set_field("format", "UPC").unwrap();
    assert!(session.last_error().is_some());

    let path = session.export(ExportFormat::Svg, temp_dir.path()).unwrap();

    assert_eq!(path.file_name().unwrap(), "www.codekraft.it.svg");
    assert_eq!(session.preview().unwrap().options.format, Format::QrCode);
}

#[test]
fn test_nothing_to_export() {
    let temp_dir = TempDir::new().unwrap();
    let session = Session::new(CodeOptions {
        text: "abc".into(),
        format: Format::Ean13,
        ..CodeOptions::default()
    });

    let err = session.export(ExportFormat::Svg, temp_dir.path()).unwrap_err();

    assert!(matches!(err, Error::NothingToExport));
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_barcode_png_matches_svg() {
    let temp_dir = TempDir::new().unwrap();
    let mut session = Session::new(CodeOptions::default());
    session.set_field("format", "EAN13").unwrap();
    session.set_field("text", "4006381333931").unwrap();

    let svg_path = session.export(ExportFormat::Svg, temp_dir.path()).unwrap();
    let png_path = session.export(ExportFormat::Png, temp_dir.path()).unwrap();

    let svg = fs::read_to_string(&svg_path).unwrap();
    let from_svg = barqr::helper::rasterize_svg(&svg).unwrap();
    let png = image::open(&png_path).unwrap().to_rgba8();
    assert_eq!(png, from_svg);

    if barqr::helper::fonts_available() {
        let caption_dark = (31..png.height())
            .flat_map(|y| (0..png.width()).map(move |x| (x, y)))
            .any(|(x, y)| png.get_pixel(x, y).0[0] < 128);
        assert!(caption_dark, "caption missing under the bars");
    }
}
