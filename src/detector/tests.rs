use super::*;
use crate::collaborators::{ColorSegmentOptions, ColorSegmentation, ColorSegmenter};
use crate::deadline::Deadline;
use crate::error::{Result, SpriteError};
use crate::fusion::RegionFusionEngine;
use crate::image::RasterImage;
use crate::types::{Rect, SpriteType};
use std::sync::Arc;
use std::time::Duration;

fn canvas(w: u32, h: u32, boxes: &[(u32, u32, u32, u32)]) -> RasterImage {
    let mut data = vec![0u8; (w * h * 4) as usize];
    for &(bx, by, bw, bh) in boxes {
        for y in by..by + bh {
            for x in bx..bx + bw {
                let i = ((y * w + x) * 4) as usize;
                data[i..i + 4].copy_from_slice(&[30, 90, 200, 255]);
            }
        }
    }
    RasterImage::from_rgba(w, h, data).unwrap()
}

fn detected(report: &crate::diagnostics::DetectionReport) -> &Detection {
    match &report.outcome {
        DetectionOutcome::Detected(d) => d,
        other => panic!("expected sprites, got {other:?}"),
    }
}

struct FailingSegmenter;

impl ColorSegmenter for FailingSegmenter {
    fn segment(
        &self,
        _: &RasterImage,
        _: &ColorSegmentOptions,
        _: &Deadline,
    ) -> Result<ColorSegmentation> {
        Err(SpriteError::collaborator("color", "timeout"))
    }
}

#[test]
fn single_isolated_shape_gives_its_exact_extents() {
    let _ = env_logger::builder().is_test(true).try_init();
    let img = canvas(100, 100, &[(20, 30, 30, 40)]);
    let report = SpriteDetector::default()
        .detect(&img, &Deadline::none())
        .unwrap();
    let detection = detected(&report);
    assert_eq!(detection.strategy, Strategy::Baseline);
    assert_eq!(detection.sprites.len(), 1);
    let sprite = &detection.sprites[0];
    assert_eq!(sprite.bounds, Rect::new(20, 30, 30, 40).unwrap());
    assert_eq!(sprite.pixel_count, 1200);
    assert!((sprite.bounds_percent.x - 20.0).abs() < 1e-9);
    assert!((sprite.bounds_percent.height - 40.0).abs() < 1e-9);
    assert_eq!(report.trace.attempts.len(), 1);
    assert_eq!(report.trace.foreground_pixels, 1200);
}

#[test]
fn gap_controls_split_versus_merge() {
    let detector = SpriteDetector::default();
    let merge_gap = detector.params().baseline.merge_gap;

    let apart = canvas(120, 60, &[(10, 10, 30, 30), (50, 10, 30, 30)]);
    let report = detector.detect(&apart, &Deadline::none()).unwrap();
    assert_eq!(report.sprite_count(), 2);

    let close = canvas(120, 60, &[(10, 10, 30, 30), (40 + merge_gap, 10, 30, 30)]);
    let report = detector.detect(&close, &Deadline::none()).unwrap();
    assert_eq!(report.sprite_count(), 1);
    let sprite = &detected(&report).sprites[0];
    assert_eq!(sprite.bounds, Rect::new(10, 10, 60 + merge_gap, 30).unwrap());
}

#[test]
fn empty_canvas_reports_no_sprites_after_every_strategy() {
    let img = RasterImage::transparent(64, 48).unwrap();
    let report = SpriteDetector::default()
        .detect(&img, &Deadline::none())
        .unwrap();
    assert_eq!(report.outcome, DetectionOutcome::NoSprites { attempts: 3 });
    assert!(report.outcome.sprites().is_empty());
    let tried: Vec<Strategy> = report.trace.attempts.iter().map(|a| a.strategy).collect();
    assert_eq!(
        tried,
        vec![Strategy::Baseline, Strategy::Fusion, Strategy::Legacy]
    );
    assert!(report.trace.fusion.is_some());
}

#[test]
fn fusion_strategy_detects_on_its_own() {
    let img = canvas(120, 60, &[(10, 10, 30, 30), (70, 10, 30, 30)]);
    let params = DetectorParams {
        strategies: vec![Strategy::Fusion],
        ..Default::default()
    };
    let report = SpriteDetector::new(params)
        .detect(&img, &Deadline::none())
        .unwrap();
    let detection = detected(&report);
    assert_eq!(detection.strategy, Strategy::Fusion);
    assert_eq!(detection.sprites.len(), 2);
    let fusion = report.trace.fusion.as_ref().unwrap();
    assert!(!fusion.failed);
}

#[test]
fn failed_fusion_falls_back_to_legacy() {
    let img = canvas(100, 100, &[(20, 30, 30, 40)]);
    let params = DetectorParams {
        strategies: vec![Strategy::Fusion, Strategy::Legacy],
        ..Default::default()
    };
    let engine = RegionFusionEngine::new().with_color_segmenter(Arc::new(FailingSegmenter));
    let report = SpriteDetector::new(params)
        .with_fusion_engine(engine)
        .detect(&img, &Deadline::none())
        .unwrap();
    assert_eq!(report.trace.attempts.len(), 2);
    assert!(report.trace.attempts[0].failure.is_some());
    assert_eq!(report.trace.attempts[0].regions, 0);
    let detection = detected(&report);
    assert_eq!(detection.strategy, Strategy::Legacy);
    assert_eq!(detection.sprites.len(), 1);
    assert_eq!(detection.sprites[0].bounds, Rect::new(20, 30, 30, 40).unwrap());
}

#[test]
fn dominant_region_is_promoted_to_symbol() {
    let img = canvas(
        200,
        80,
        &[
            (5, 5, 20, 20),
            (35, 5, 20, 20),
            (65, 5, 20, 20),
            (95, 5, 20, 20),
            (140, 20, 40, 40),
        ],
    );
    let report = SpriteDetector::default()
        .detect(&img, &Deadline::none())
        .unwrap();
    let sprites = &detected(&report).sprites;
    assert_eq!(sprites.len(), 5);
    assert_eq!(sprites[0].sprite_type, SpriteType::Symbol);
    assert_eq!(sprites[0].bounds, Rect::new(140, 20, 40, 40).unwrap());
    assert!(sprites[1..]
        .iter()
        .all(|s| s.sprite_type == SpriteType::Decoration));
    let ids: Vec<usize> = sprites.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);
}

#[test]
fn surplus_regions_are_reconciled_to_expected_count() {
    let img = canvas(
        300,
        100,
        &[(10, 10, 30, 30), (110, 10, 30, 30), (210, 10, 30, 30)],
    );
    let params = DetectorParams {
        expected_count: 2,
        ..Default::default()
    };
    let report = SpriteDetector::new(params)
        .detect(&img, &Deadline::none())
        .unwrap();
    assert_eq!(report.sprite_count(), 2);
    let stats = report.trace.reconciliation.as_ref().unwrap();
    assert_eq!(stats.input, 3);
    assert_eq!(stats.output, 2);
}

#[test]
fn expired_deadline_is_returned_not_swallowed() {
    let img = canvas(100, 100, &[(20, 30, 30, 40)]);
    let err = SpriteDetector::default()
        .detect(&img, &Deadline::after(Duration::ZERO))
        .unwrap_err();
    assert!(err.is_interrupt());
}
