//! Escape-time evaluation of the Mandelbrot iteration `z <- z^2 + c`.

use crate::complex::C;

const BAILOUT: f64 = 4.0;

/// Where an orbit stopped: the step at which it escaped (or `max_iter` if it
/// never did) and the squared modulus of `z` at that point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Escape {
    pub step: u32,
    pub norm_sqr: f64,
}

impl Escape {
    /// Continuous escape value, `(max_iter - step) + ln(norm_sqr)`.
    ///
    /// A zero modulus is clamped to the smallest positive f64 so the result
    /// stays finite for orbits pinned at the origin.
    pub fn smooth(&self, max_iter: u32) -> f64 {
        (max_iter - self.step) as f64 + self.norm_sqr.max(f64::MIN_POSITIVE).ln()
    }

    /// Value stored in the scalar field. Inverting flips the sign, which
    /// reverses the palette order after quantile mapping.
    pub fn field_value(&self, max_iter: u32, invert: bool) -> f64 {
        let smooth = self.smooth(max_iter);
        if invert {
            smooth
        } else {
            -smooth
        }
    }
}

#[inline]
pub fn evaluate(c: C<f64>, max_iter: u32) -> Escape {
    let (mut re, mut im) = (0.0_f64, 0.0_f64);
    for step in 0..max_iter {
        let a_sq = re * re;
        let b_sq = im * im;
        if a_sq + b_sq > BAILOUT {
            return Escape {
                step,
                norm_sqr: a_sq + b_sq,
            };
        }
        im = 2.0 * re * im + c.im;
        re = a_sq - b_sq + c.re;
    }
    Escape {
        step: max_iter,
        norm_sqr: re * re + im * im,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::complex::c;

    #[test]
    fn test_origin_never_escapes() {
        for max_iter in [1, 2, 17, 512, 4096] {
            let e = evaluate(c(0.0, 0.0), max_iter);
            assert_eq!(e, Escape { step: max_iter, norm_sqr: 0.0 });
        }
    }

    #[test]
    fn test_outside_radius_two_escapes() {
        let points = [
            c(2.1, 0.0),
            c(-2.01, 0.0),
            c(0.0, 3.0),
            c(1.5, 1.5),
            c(-100.0, 42.0),
            c(1e6, -1e6),
        ];
        for p in points {
            let e = evaluate(p, 1000);
            assert!(e.step < 1000, "{:?} did not escape", p);
            assert!(e.norm_sqr > 4.0);
        }
    }

    #[test]
    fn test_first_step_reports_bailout_value() {
        // z1 = c, so bailout happens at step 1 with |c|^2
        let e = evaluate(c(3.0, 4.0), 10);
        assert_eq!(e.step, 1);
        assert_eq!(e.norm_sqr, 25.0);
    }

    #[test]
    fn test_main_cardioid_is_bounded() {
        let e = evaluate(c(-0.1, 0.1), 2000);
        assert_eq!(e.step, 2000);
        assert!(e.norm_sqr <= 4.0);
    }

    #[test]
    fn test_field_value_sign() {
        let e = Escape {
            step: 10,
            norm_sqr: std::f64::consts::E,
        };
        assert!((e.smooth(20) - 11.0).abs() < 1e-12);
        assert!((e.field_value(20, false) + 11.0).abs() < 1e-12);
        assert!((e.field_value(20, true) - 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_field_value_is_finite_at_origin() {
        let e = evaluate(c(0.0, 0.0), 64);
        assert!(e.field_value(64, false).is_finite());
        assert!(e.field_value(64, true).is_finite());
    }
}
