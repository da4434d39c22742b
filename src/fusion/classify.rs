//! Coarse geometric sprite labels.
use crate::types::SpriteType;

pub const SYMBOL_MIN_AREA: f32 = 20_000.0;
pub const OBJECT_MIN_AREA: f32 = 10_000.0;
pub const LETTER_MIN_AREA: f32 = 5_000.0;
pub const DECORATION_MAX_AREA: f32 = 2_000.0;

/// Label a box from its area (px²) and width/height ratio.
///
/// Pure: identical inputs always produce the same label.
pub fn classify(area: f32, aspect_ratio: f32) -> SpriteType {
    let extreme = aspect_ratio > 3.0 || aspect_ratio < 1.0 / 3.0;
    if area > SYMBOL_MIN_AREA {
        SpriteType::Symbol
    } else if area >= OBJECT_MIN_AREA {
        if extreme {
            SpriteType::Object
        } else {
            SpriteType::Symbol
        }
    } else if area >= LETTER_MIN_AREA {
        SpriteType::Letter
    } else if area >= DECORATION_MAX_AREA && (0.2..=4.0).contains(&aspect_ratio) {
        SpriteType::Letter
    } else {
        SpriteType::Decoration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_map_to_labels() {
        assert_eq!(classify(25_000.0, 1.0), SpriteType::Symbol);
        assert_eq!(classify(15_000.0, 1.0), SpriteType::Symbol);
        assert_eq!(classify(15_000.0, 5.0), SpriteType::Object);
        assert_eq!(classify(15_000.0, 0.2), SpriteType::Object);
        assert_eq!(classify(8_000.0, 9.0), SpriteType::Letter);
        assert_eq!(classify(3_600.0, 1.0), SpriteType::Letter);
        assert_eq!(classify(3_600.0, 6.0), SpriteType::Decoration);
        assert_eq!(classify(1_999.0, 1.0), SpriteType::Decoration);
    }

    #[test]
    fn identical_inputs_give_identical_labels() {
        for &(area, aspect) in &[(0.0, 1.0), (2_000.0, 0.2), (10_000.0, 3.0), (1e9, 0.01)] {
            assert_eq!(classify(area, aspect), classify(area, aspect));
        }
    }
}
