mod common;

use common::synthetic_image::{opaque_pixels, SheetBuilder, CLEAR, WHITE};
use sprite_splitter::detector::Strategy;
use sprite_splitter::prelude::*;
use sprite_splitter::SpriteType;

const SQUARE_COLORS: [[u8; 4]; 4] = [
    [200, 40, 40, 255],
    [40, 160, 60, 255],
    [40, 60, 200, 255],
    [180, 140, 20, 255],
];
const BLOB: [u8; 4] = [120, 40, 160, 255];

fn five_sprite_sheet(background: [u8; 4]) -> RasterImage {
    let mut sheet = SheetBuilder::new(400, 100, background);
    for (i, &color) in SQUARE_COLORS.iter().enumerate() {
        sheet = sheet.rect(70 * i as u32, 20, 60, 60, color);
    }
    sheet.rect(280, 10, 100, 80, BLOB).build()
}

#[test]
fn five_sprite_sheet_is_split_into_five_layers() {
    let _ = env_logger::builder().is_test(true).try_init();
    let image = five_sprite_sheet(CLEAR);
    let outcome = SheetSplitter::default().split(&image).unwrap();

    let detection = match &outcome.report.outcome {
        DetectionOutcome::Detected(d) => d,
        other => panic!("expected sprites, got {other:?}"),
    };
    assert_eq!(detection.strategy, Strategy::Baseline);
    assert_eq!(detection.sprites.len(), 5);
    assert_eq!(outcome.layers.len(), 5);
    assert!(outcome.failures.is_empty());

    // The blob dominates the squares and is listed first.
    let blob = &outcome.layers[0];
    assert_eq!(blob.sprite_type, SpriteType::Symbol);
    assert!(blob.refined_pixels.contains(280, 10) && blob.refined_pixels.contains(379, 89));
    for layer in &outcome.layers[1..] {
        assert_eq!(layer.sprite_type, SpriteType::Letter);
    }

    // Squares come out left to right.
    let xs: Vec<u32> = outcome.layers[1..]
        .iter()
        .map(|l| l.refined_pixels.x)
        .collect();
    assert!(xs.windows(2).all(|w| w[0] < w[1]), "{xs:?}");

    let truths = [8000usize, 3600, 3600, 3600, 3600];
    for (layer, &truth) in outcome.layers.iter().zip(&truths) {
        let covered = opaque_pixels(&layer.image, 128);
        let error = (covered as f64 - truth as f64).abs() / truth as f64;
        assert!(error <= 0.03, "{}: {covered} vs {truth}", layer.id);
    }
}

#[test]
fn white_background_is_not_foreground() {
    let image = five_sprite_sheet(WHITE);
    let detector = SpriteDetector::new(DetectorParams::default());
    let report = detector.detect(&image, &Deadline::none()).unwrap();
    assert_eq!(report.sprite_count(), 5);
    assert_eq!(report.trace.foreground_pixels, 4 * 3600 + 8000);
}

#[test]
fn blank_sheet_reports_no_sprites() {
    let image = SheetBuilder::new(200, 100, WHITE).build();
    let outcome = SheetSplitter::default().split(&image).unwrap();
    assert!(matches!(
        outcome.report.outcome,
        DetectionOutcome::NoSprites { attempts: 3 }
    ));
    assert!(outcome.layers.is_empty());
}

#[test]
fn fewer_expected_sprites_merge_neighbours() {
    let image = five_sprite_sheet(CLEAR);
    let params = DetectorParams {
        expected_count: 3,
        ..Default::default()
    };
    let report = SpriteDetector::new(params)
        .detect(&image, &Deadline::none())
        .unwrap();
    assert_eq!(report.sprite_count(), 3);
    let stats = report.trace.reconciliation.expect("reconciliation ran");
    assert_eq!(stats.input, 5);
    assert_eq!(stats.output, 3);
    assert!(stats.iterations <= stats.input);
}

#[test]
fn legacy_strategy_reports_exact_extents() {
    let image = five_sprite_sheet(CLEAR);
    let params = DetectorParams {
        strategies: vec![Strategy::Legacy],
        ..Default::default()
    };
    let report = SpriteDetector::new(params)
        .detect(&image, &Deadline::none())
        .unwrap();
    let detection = match &report.outcome {
        DetectionOutcome::Detected(d) => d,
        other => panic!("expected sprites, got {other:?}"),
    };
    assert_eq!(detection.strategy, Strategy::Legacy);
    assert_eq!(detection.sprites.len(), 5);

    let blob = &detection.sprites[0];
    assert_eq!(blob.sprite_type, SpriteType::Symbol);
    assert_eq!(blob.bounds.x, 280);
    assert_eq!((blob.bounds.y, blob.bounds.width, blob.bounds.height), (10, 100, 80));
    let mut squares: Vec<_> = detection.sprites[1..].iter().map(|s| s.bounds).collect();
    squares.sort_by_key(|r| r.x);
    for (i, bounds) in squares.iter().enumerate() {
        assert_eq!((bounds.x, bounds.y), (70 * i as u32, 20));
        assert_eq!((bounds.width, bounds.height), (60, 60));
    }
}
