//! Owned pixel buffers: the RGBA input raster, f32 working planes and
//! binary masks, plus file I/O.
pub mod f32;
pub mod io;
pub mod mask;
pub mod raster;
pub mod traits;

pub use self::f32::ImageF32;
pub use self::mask::Mask;
pub use self::raster::{is_foreground_rgba, luma_over_white, ForegroundParams, RasterImage};
pub use self::traits::{Plane, PlaneMut};
