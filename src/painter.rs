use image::{Rgba, RgbaImage};

use crate::field::ScalarField;

pub trait Painter {
    fn paint(&self, field: &ScalarField) -> RgbaImage;
}

/// Colors a field by rank rather than by value: break-points are taken at
/// evenly spaced quantiles of the field, so every palette entry covers
/// roughly the same number of pixels whatever the view.
pub struct QuantilePainter<'p> {
    palette: &'p [Rgba<u8>],
}

impl<'p> QuantilePainter<'p> {
    pub fn new(palette: &'p [Rgba<u8>]) -> Self {
        assert!(!palette.is_empty(), "palette must have at least one color");
        Self { palette }
    }

    /// `palette.len() - 1` ascending break-points over the values of `field`.
    pub fn boundaries(&self, field: &ScalarField) -> Vec<f64> {
        let mut sorted: Vec<f64> = field.iter().copied().collect();
        sorted.sort_unstable_by(f64::total_cmp);

        let n = sorted.len();
        let p = self.palette.len();
        let mut boundaries: Vec<f64> = (0..p - 1)
            .map(|i| sorted[(i + 1) * n / p])
            .collect();
        boundaries.sort_unstable_by(f64::total_cmp);
        boundaries
    }

    /// Number of boundaries at or below `value`, i.e. the index of the first
    /// boundary strictly above it.
    pub fn palette_index(boundaries: &[f64], value: f64) -> usize {
        boundaries.partition_point(|b| *b <= value)
    }
}

impl<'p> Painter for QuantilePainter<'p> {
    fn paint(&self, field: &ScalarField) -> RgbaImage {
        let width: u32 = field.width().try_into().unwrap();
        let height: u32 = field.height().try_into().unwrap();
        let boundaries = self.boundaries(field);

        let mut img = RgbaImage::new(width, height);
        for (pixel, value) in img.pixels_mut().zip(field.iter()) {
            *pixel = self.palette[Self::palette_index(&boundaries, *value)];
        }
        img
    }
}
