//! Integration tests for whiteboard export (sketch-renderer).
//!
//! Tests the full path from drawn strokes to PNG data URLs, including
//! export scale, device pixel ratio and snapshot isolation.

use std::sync::Arc;

use sketch_core::{Point, Scene, StrokeId, Whiteboard, WhiteboardOptions};
use sketch_renderer::{ExportFormat, SnapshotExporter};

use base64::Engine;

/// Create a whiteboard wired to the real exporter.
fn board(options: WhiteboardOptions, scene: Scene) -> Whiteboard {
    let mut board = Whiteboard::new(options).with_rasterizer(Arc::new(SnapshotExporter::new()));
    board.attach(scene).expect("attach");
    board
}

/// Draw one stroke through the given points.
fn draw(board: &mut Whiteboard, points: &[(f64, f64)]) -> StrokeId {
    board.begin_stroke(Point::from(points[0])).expect("begin");
    for &p in &points[1..] {
        board.extend_stroke(Point::from(p)).expect("extend");
    }
    board.finish_stroke().expect("finish")
}

/// Decode a PNG data URL into an image.
fn decode(url: &str) -> image::DynamicImage {
    let payload = url
        .strip_prefix("data:image/png;base64,")
        .expect("png data url");
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .expect("base64");
    image::load_from_memory(&bytes).expect("png")
}

// ==========================================================================
// Whiteboard save
// ==========================================================================

#[tokio::test]
async fn test_save_produces_png_of_surface_size() {
    let mut board = board(WhiteboardOptions::default(), Scene::new(120.0, 80.0));
    draw(&mut board, &[(10.0, 10.0), (60.0, 40.0), (110.0, 70.0)]);

    let url = board.save().expect("export").await.expect("png");
    let image = decode(&url);
    assert_eq!((image.width(), image.height()), (120, 80));
}

#[tokio::test]
async fn test_save_uses_device_pixel_ratio() {
    let scene = Scene::new(100.0, 50.0).with_pixel_ratio(2.0);
    let mut board = board(WhiteboardOptions::default(), scene);
    draw(&mut board, &[(0.0, 0.0), (100.0, 50.0)]);

    let image = decode(&board.save().expect("export").await.expect("png"));
    assert_eq!((image.width(), image.height()), (200, 100));
}

#[tokio::test]
async fn test_export_scale_overrides_pixel_ratio() {
    let scene = Scene::new(100.0, 50.0).with_pixel_ratio(2.0);
    let mut board = board(WhiteboardOptions::new().with_export_scale(1.5), scene);
    draw(&mut board, &[(0.0, 0.0), (100.0, 50.0)]);

    let image = decode(&board.save().expect("export").await.expect("png"));
    assert_eq!((image.width(), image.height()), (150, 75));
}

#[tokio::test]
async fn test_export_scale_below_one_is_clamped() {
    let mut board = board(
        WhiteboardOptions::new().with_export_scale(0.25),
        Scene::new(64.0, 32.0),
    );
    draw(&mut board, &[(0.0, 0.0), (64.0, 32.0)]);

    let image = decode(&board.save().expect("export").await.expect("png"));
    assert_eq!((image.width(), image.height()), (64, 32));
}

#[tokio::test]
async fn test_save_on_empty_history_returns_none() {
    let board = board(WhiteboardOptions::default(), Scene::default());
    assert!(board.save().is_none());
}

#[tokio::test]
async fn test_drawing_during_export_does_not_change_it() {
    let mut board = board(
        WhiteboardOptions::new().with_background("#ffffff"),
        Scene::new(40.0, 40.0),
    );
    draw(&mut board, &[(0.0, 5.0), (40.0, 5.0)]);
    let pending = board.save().expect("export");

    // A horizontal stroke across the middle, drawn after the snapshot.
    draw(&mut board, &[(0.0, 20.0), (40.0, 20.0)]);
    let image = decode(&pending.await.expect("png")).to_rgba8();

    assert_eq!(image.get_pixel(20, 20).0, [255, 255, 255, 255]);
    assert!(image.get_pixel(20, 5).0[0] < 128);
}

#[tokio::test]
async fn test_undone_strokes_are_not_exported() {
    let mut board = board(WhiteboardOptions::default(), Scene::new(40.0, 40.0));
    draw(&mut board, &[(0.0, 5.0), (40.0, 5.0)]);
    draw(&mut board, &[(0.0, 30.0), (40.0, 30.0)]);
    board.undo();

    let image = decode(&board.save().expect("export").await.expect("png")).to_rgba8();
    assert!(image.get_pixel(20, 5).0[0] < 128);
    assert_eq!(image.get_pixel(20, 30).0, [255, 255, 255, 255]);
}

// ==========================================================================
// Styling
// ==========================================================================

#[tokio::test]
async fn test_brush_color_reaches_pixels() {
    let mut board = board(
        WhiteboardOptions::new().with_color("#ff0000").with_size("8px"),
        Scene::new(40.0, 40.0),
    );
    draw(&mut board, &[(0.0, 20.0), (40.0, 20.0)]);

    let image = decode(&board.save().expect("export").await.expect("png")).to_rgba8();
    let [r, g, b, _] = image.get_pixel(20, 20).0;
    assert!(r > 200 && g < 60 && b < 60, "expected red, got {r},{g},{b}");
}

#[tokio::test]
async fn test_custom_background() {
    let mut board = board(
        WhiteboardOptions::new().with_background("#000000"),
        Scene::new(20.0, 20.0),
    );
    draw(&mut board, &[(0.0, 0.0), (1.0, 1.0)]);

    let image = decode(&board.save().expect("export").await.expect("png")).to_rgba8();
    assert_eq!(image.get_pixel(15, 15).0, [0, 0, 0, 255]);
}

// ==========================================================================
// Direct exporter use
// ==========================================================================

#[test]
fn test_svg_format_matches_snapshot_markup() {
    let mut board = board(WhiteboardOptions::default(), Scene::new(30.0, 30.0));
    draw(&mut board, &[(0.0, 0.0), (30.0, 30.0)]);
    let snapshot = board.snapshot().expect("snapshot");

    let svg = SnapshotExporter::new()
        .export(&snapshot, ExportFormat::Svg, 1.0)
        .expect("svg");
    assert_eq!(String::from_utf8(svg).expect("utf8"), snapshot.to_svg());
}

#[test]
fn test_many_strokes_export() {
    let mut board = board(WhiteboardOptions::default(), Scene::new(400.0, 400.0));
    for i in 0..100 {
        let y = f64::from(i) * 4.0;
        draw(&mut board, &[(0.0, y), (200.0, y + 2.0), (400.0, y)]);
    }
    let snapshot = board.snapshot().expect("snapshot");
    let png = SnapshotExporter::new()
        .export(&snapshot, ExportFormat::Png, 1.0)
        .expect("png");
    assert_eq!(&png[0..4], &[137, 80, 78, 71]);
}
