//! Row access shared by the crate's single-channel planes ([`ImageF32`]
//! and [`Mask`]).
//!
//! Both store rows back to back (`stride == width`), so a row is always a
//! contiguous slice.
//!
//! [`ImageF32`]: super::ImageF32
//! [`Mask`]: super::Mask
pub trait Plane {
    type Sample: Copy;

    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn row(&self, y: usize) -> &[Self::Sample];

    #[inline]
    fn at(&self, x: usize, y: usize) -> Self::Sample {
        self.row(y)[x]
    }

    /// Signed coordinates inside the plane.
    #[inline]
    fn contains(&self, x: isize, y: isize) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width() && (y as usize) < self.height()
    }

    /// Replicate-border sample.
    #[inline]
    fn clamped(&self, x: isize, y: isize) -> Self::Sample {
        let xc = x.clamp(0, self.width() as isize - 1) as usize;
        let yc = y.clamp(0, self.height() as isize - 1) as usize;
        self.row(yc)[xc]
    }
}

pub trait PlaneMut: Plane {
    fn row_mut(&mut self, y: usize) -> &mut [Self::Sample];
}
