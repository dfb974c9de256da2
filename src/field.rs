use ndarray::Array2;

use crate::coord::Viewport;
use crate::escape::evaluate;
use crate::threads::{fan_out, RowBand};

/// One smoothed escape value per pixel, stored row-major with shape
/// `(height, width)`.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalarField {
    values: Array2<f64>,
}

impl ScalarField {
    pub fn from_array(values: Array2<f64>) -> Self {
        Self { values }
    }

    /// Builds a field from row-major values. Panics if `values.len()` is
    /// not `width * height`.
    pub fn from_vec(width: usize, height: usize, values: Vec<f64>) -> Self {
        let values = Array2::from_shape_vec((height, width), values)
            .expect("field length must be width * height");
        Self { values }
    }

    pub fn width(&self) -> usize {
        self.values.ncols()
    }

    pub fn height(&self) -> usize {
        self.values.nrows()
    }

    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.values[[y, x]]
    }

    /// Values in pixel order, index `i` being pixel `(i % width, i / width)`.
    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.values.iter()
    }
}

/// Evaluates every pixel of `viewport`, spreading row bands over
/// `threads` workers.
pub fn render_field(
    viewport: &Viewport,
    max_iter: u32,
    invert: bool,
    threads: usize,
) -> ScalarField {
    let mut values = Array2::<f64>::zeros((viewport.height, viewport.width));
    let bands = threads.min(viewport.height).max(1);

    fan_out(RowBand::new(values.view_mut()), bands, |band| {
        let first_row = band.first_row;
        let mut rows = band.rows;
        for (dy, mut row) in rows.outer_iter_mut().enumerate() {
            let py = first_row + dy;
            for (px, value) in row.iter_mut().enumerate() {
                let escape = evaluate(viewport.pixel_to_point(px, py), max_iter);
                *value = escape.field_value(max_iter, invert);
            }
        }
    });

    ScalarField::from_array(values)
}
