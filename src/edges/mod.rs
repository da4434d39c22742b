//! Edge processing: Gaussian blur, Sobel gradients, non-maximum
//! suppression, hysteresis and contour analysis.
//!
//! Design goals
//! - Favor clarity and cache-friendly row access over micro-optimizations.
//! - Handle borders by clamping indices (replicate).
//! - Every call allocates its own buffers; nothing is shared between calls.

pub mod analyzer;
pub mod blur;
pub mod contour;
pub mod grad;
pub mod hysteresis;
pub mod nms;

pub use analyzer::{canny, to_luma, CannyOutput, EdgeAnalyzer, EdgeDetection, EdgeOptions};
pub use blur::{
    gaussian_blur, separable_blur, GaussianKernel, SeparableFilter, StaticSeparableFilter,
    BINOMIAL_3TAP,
};
pub use contour::{
    contour_metrics, douglas_peucker, douglas_peucker_closed, trace_contours, Contour,
    ContourMetrics, MAX_CONTOUR_POINTS,
};
pub use grad::{sobel_gradients, Grad};
pub use hysteresis::hysteresis;
pub use nms::non_max_suppression;
