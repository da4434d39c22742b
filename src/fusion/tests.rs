use super::*;
use crate::collaborators::{
    ColorSegmentOptions, ColorSegmentation, ColorSegmenter, ModelRefiner, RefinementAdvice,
    RefinementRequest, ConfidenceAdjustment,
};
use crate::deadline::{CancelToken, Deadline};
use crate::error::{Result, SpriteError};
use crate::image::RasterImage;
use crate::types::{Rect, SourceAlgorithm, SpriteType};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn canvas_with_squares(w: u32, h: u32, squares: &[(u32, u32, u32)]) -> RasterImage {
    let mut data = vec![0u8; (w * h * 4) as usize];
    for &(sx, sy, side) in squares {
        for y in sy..sy + side {
            for x in sx..sx + side {
                let i = ((y * w + x) * 4) as usize;
                data[i..i + 4].copy_from_slice(&[200, 30, 30, 255]);
            }
        }
    }
    RasterImage::from_rgba(w, h, data).unwrap()
}

struct FailingSegmenter;

impl ColorSegmenter for FailingSegmenter {
    fn segment(
        &self,
        _: &RasterImage,
        _: &ColorSegmentOptions,
        _: &Deadline,
    ) -> Result<ColorSegmentation> {
        Err(SpriteError::collaborator("color", "service unavailable"))
    }
}

/// Cancels the request midway through its own work.
struct CancellingSegmenter {
    token: CancelToken,
}

impl ColorSegmenter for CancellingSegmenter {
    fn segment(
        &self,
        _: &RasterImage,
        _: &ColorSegmentOptions,
        deadline: &Deadline,
    ) -> Result<ColorSegmentation> {
        self.token.cancel();
        deadline.check("segment.loop")?;
        Ok(ColorSegmentation::default())
    }
}

struct FixedAdvice {
    calls: AtomicUsize,
}

impl ModelRefiner for FixedAdvice {
    fn refine(&self, _: &RasterImage, request: &RefinementRequest) -> Result<RefinementAdvice> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(RefinementAdvice {
            adjustments: request
                .sprites
                .iter()
                .map(|s| ConfidenceAdjustment {
                    id: s.id,
                    confidence: 1.0,
                })
                .collect(),
        })
    }
}

fn close(a: u32, b: u32, tol: u32) -> bool {
    a.abs_diff(b) <= tol
}

#[test]
fn two_separated_squares_fuse_into_two_sprites() {
    let _ = env_logger::builder().is_test(true).try_init();
    let img = canvas_with_squares(100, 50, &[(10, 10, 30), (60, 10, 30)]);
    let result = RegionFusionEngine::new()
        .fuse(&img, &FusionOptions::default(), &Deadline::none())
        .unwrap();
    assert!(!result.failed);
    assert_eq!(result.sprites.len(), 2);
    let mut sprites = result.sprites.clone();
    sprites.sort_by_key(|s| s.bounds.x);
    for (sprite, x) in sprites.iter().zip([10u32, 60]) {
        assert!(close(sprite.bounds.x, x, 2), "{:?}", sprite.bounds);
        assert!(close(sprite.bounds.y, 10, 2), "{:?}", sprite.bounds);
        assert!(close(sprite.bounds.width, 30, 3), "{:?}", sprite.bounds);
        assert!(close(sprite.bounds.height, 30, 3), "{:?}", sprite.bounds);
        assert!(sprite.sources.contains(&SourceAlgorithm::Color));
        assert!(sprite.sources.contains(&SourceAlgorithm::Morphology));
        assert!((0.0..=1.0).contains(&sprite.confidence));
    }
    assert!((0.0..=1.0).contains(&result.quality.overall));
    assert!(result.quality.expected_count_match < 1.0);
    assert!(!result.model_refined);
}

#[test]
fn count_match_is_one_when_expected_count_matches() {
    let img = canvas_with_squares(100, 50, &[(10, 10, 30), (60, 10, 30)]);
    let options = FusionOptions {
        expected_count: 2,
        ..Default::default()
    };
    let result = RegionFusionEngine::new()
        .fuse(&img, &options, &Deadline::none())
        .unwrap();
    assert_eq!(result.sprites.len(), 2);
    assert_eq!(result.quality.expected_count_match, 1.0);
}

#[test]
fn failing_collaborator_aborts_the_attempt() {
    let img = canvas_with_squares(60, 60, &[(10, 10, 30)]);
    let engine = RegionFusionEngine::new().with_color_segmenter(Arc::new(FailingSegmenter));
    let result = engine
        .fuse(&img, &FusionOptions::default(), &Deadline::none())
        .unwrap();
    assert!(result.failed);
    assert!(result.sprites.is_empty());
    assert!(result
        .failure
        .as_deref()
        .is_some_and(|r| r.contains("service unavailable")));
}

#[test]
fn expired_deadline_is_an_error_not_a_failure_flag() {
    let img = canvas_with_squares(60, 60, &[(10, 10, 30)]);
    let err = RegionFusionEngine::new()
        .fuse(
            &img,
            &FusionOptions::default(),
            &Deadline::after(Duration::ZERO),
        )
        .unwrap_err();
    assert!(err.is_interrupt());
}

#[test]
fn collaborators_see_the_request_deadline() {
    let img = canvas_with_squares(60, 60, &[(10, 10, 30)]);
    let token = CancelToken::new();
    let engine = RegionFusionEngine::new().with_color_segmenter(Arc::new(CancellingSegmenter {
        token: token.clone(),
    }));
    let err = engine
        .fuse(
            &img,
            &FusionOptions::default(),
            &Deadline::none().with_token(token),
        )
        .unwrap_err();
    assert!(matches!(err, SpriteError::Cancelled { .. }));
}

#[test]
fn model_refiner_only_rescores_when_quality_is_low() {
    let img = canvas_with_squares(100, 50, &[(10, 10, 30), (60, 10, 30)]);
    let refiner = Arc::new(FixedAdvice {
        calls: AtomicUsize::new(0),
    });
    let engine = RegionFusionEngine::new().with_model_refiner(refiner.clone());

    let strict = FusionOptions {
        quality_threshold: 1.1,
        ..Default::default()
    };
    let refined = engine.fuse(&img, &strict, &Deadline::none()).unwrap();
    assert_eq!(refiner.calls.load(Ordering::SeqCst), 1);
    assert!(refined.model_refined);
    assert_eq!(refined.sprites.len(), 2);
    for sprite in &refined.sprites {
        assert!(sprite.sources.contains(&SourceAlgorithm::Model));
    }

    let disabled = FusionOptions {
        quality_threshold: 1.1,
        allow_model_refine: false,
        ..Default::default()
    };
    let plain = engine.fuse(&img, &disabled, &Deadline::none()).unwrap();
    assert_eq!(refiner.calls.load(Ordering::SeqCst), 1);
    assert!(!plain.model_refined);
    for (a, b) in plain.sprites.iter().zip(&refined.sprites) {
        assert_eq!(a.bounds, b.bounds);
    }
}

#[test]
fn validation_orders_by_type_then_area_and_truncates() {
    let sprite = |id, w, h, conf| FusedSprite {
        id,
        bounds: Rect::new(0, 0, w, h).unwrap(),
        sprite_type: classify((w * h) as f32, w as f32 / h as f32),
        confidence: conf,
        sources: vec![SourceAlgorithm::Color],
        fusion_method: FusionMethod::Single,
        extracted: None,
    };
    let sprites = vec![
        sprite(0, 40, 40, 0.9),
        sprite(1, 200, 200, 0.8),
        sprite(2, 60, 60, 0.2),
        sprite(3, 80, 80, 0.7),
        sprite(4, 5, 5, 0.9),
    ];
    let options = FusionOptions {
        expected_count: 1,
        count_buffer: 1,
        ..Default::default()
    };
    let kept = validate(sprites, &options);
    assert_eq!(kept.len(), 2);
    assert_eq!(kept[0].sprite_type, SpriteType::Symbol);
    assert_eq!(kept[0].bounds.width, 200);
    assert_eq!(kept[1].bounds.width, 80);
    assert_eq!(kept[0].id, 0);
    assert_eq!(kept[1].id, 1);
}
