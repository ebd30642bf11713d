// ─────────────────────────────────────────────────────────────────────
// Speckle PnP — Inversion Operator
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Per-pixel inversion step of the ADMM splitting.
//!
//! Each pixel minimizes
//! `ln(r + σw²) [+ |x|²/(r + σw²)] + (r - r̃)² / (2σλ²)`
//! by taking the roots of the cubic stationarity condition. The bracketed
//! term is only present for [`LikelihoodTerm::Full`].

use ndarray::{Array2, Zip};
use num_complex::Complex64;
use speckle_math::roots::cubic_roots;
use speckle_types::config::{LikelihoodTerm, ReconstructorConfig};
use speckle_types::constants::{ROOT_IMAG_TOLERANCE, ROOT_TIE_TOLERANCE};
use speckle_types::error::{SpeckleError, SpeckleResult};
use tracing::warn;

/// Closed-form ML estimate `|x|² - σw²`. Not clamped.
pub fn ml_estimate(field: &Array2<Complex64>, sigma_w: f64) -> Array2<f64> {
    let noise_var = sigma_w * sigma_w;
    field.mapv(|x| x.norm_sqr() - noise_var)
}

/// Selected root for one pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelSolution {
    pub value: f64,
    /// |Im| of the selected root.
    pub imag: f64,
}

#[derive(Debug, Clone)]
pub struct InversionOutput {
    pub reflectance: Array2<f64>,
    pub max_imag: f64,
    /// Pixels whose selected root exceeded `ROOT_IMAG_TOLERANCE`.
    pub flagged: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InversionOperator {
    sigma_w: f64,
    sigma_lambda: f64,
    likelihood: LikelihoodTerm,
}

impl InversionOperator {
    pub fn new(sigma_w: f64, sigma_lambda: f64, likelihood: LikelihoodTerm) -> SpeckleResult<Self> {
        for (field, value) in [("sigma_w", sigma_w), ("sigma_lambda", sigma_lambda)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SpeckleError::config(
                    field,
                    format!("must be finite and > 0, got {value}"),
                ));
            }
        }
        Ok(InversionOperator {
            sigma_w,
            sigma_lambda,
            likelihood,
        })
    }

    pub fn from_config(config: &ReconstructorConfig) -> Self {
        InversionOperator {
            sigma_w: config.sigma_w(),
            sigma_lambda: config.sigma_lambda(),
            likelihood: config.likelihood(),
        }
    }

    /// Cubic coefficients `[a1, a2, a3, a4]`, highest power first.
    pub fn coefficients(&self, rtilde: f64, intensity: f64) -> [f64; 4] {
        let s = self.sigma_w * self.sigma_w;
        let l = self.sigma_lambda * self.sigma_lambda;
        let mut a4 = l * s - rtilde * s * s;
        if self.likelihood == LikelihoodTerm::Full {
            a4 -= l * intensity;
        }
        [1.0, -rtilde + 2.0 * s, -2.0 * rtilde * s + s * s + l, a4]
    }

    /// Per-pixel objective; `+inf` outside `r + σw² > 0`.
    pub fn objective(&self, r: f64, rtilde: f64, intensity: f64) -> f64 {
        let k = r + self.sigma_w * self.sigma_w;
        if k <= 0.0 {
            return f64::INFINITY;
        }
        let l = self.sigma_lambda * self.sigma_lambda;
        let data = match self.likelihood {
            LikelihoodTerm::LogVariance => k.ln(),
            LikelihoodTerm::Full => k.ln() + intensity / k,
        };
        data + (r - rtilde) * (r - rtilde) / (2.0 * l)
    }

    fn curvature(&self, r: f64, intensity: f64) -> f64 {
        let k = r + self.sigma_w * self.sigma_w;
        let l = self.sigma_lambda * self.sigma_lambda;
        let data = match self.likelihood {
            LikelihoodTerm::LogVariance => -1.0 / (k * k),
            LikelihoodTerm::Full => -1.0 / (k * k) + 2.0 * intensity / (k * k * k),
        };
        data + 1.0 / l
    }

    /// Solve one pixel.
    ///
    /// The root with the smallest |Im| wins. Ties (within `ROOT_TIE_TOLERANCE`)
    /// go to the feasible local minimum with the lowest objective; without one,
    /// the first most-real root is kept.
    pub fn solve_pixel(&self, rtilde: f64, intensity: f64) -> PixelSolution {
        let roots = cubic_roots(self.coefficients(rtilde, intensity));
        let min_imag = roots
            .iter()
            .map(|z| z.im.abs())
            .fold(f64::INFINITY, f64::min);

        let most_real = roots
            .iter()
            .filter(|z| z.im.abs() <= min_imag + ROOT_TIE_TOLERANCE);
        let preferred = most_real
            .clone()
            .filter(|z| {
                z.re + self.sigma_w * self.sigma_w > 0.0 && self.curvature(z.re, intensity) > 0.0
            })
            .min_by(|a, b| {
                self.objective(a.re, rtilde, intensity)
                    .total_cmp(&self.objective(b.re, rtilde, intensity))
            });

        match preferred.or_else(|| most_real.clone().next()) {
            Some(z) => PixelSolution {
                value: z.re,
                imag: z.im.abs(),
            },
            None => PixelSolution {
                value: f64::NAN,
                imag: f64::NAN,
            },
        }
    }

    /// Apply to a whole image, pixels in parallel.
    pub fn apply(
        &self,
        rtilde: &Array2<f64>,
        intensity: &Array2<f64>,
    ) -> SpeckleResult<InversionOutput> {
        if rtilde.dim() != intensity.dim() {
            return Err(SpeckleError::ShapeMismatch {
                context: "inversion intensity",
                expected: rtilde.dim(),
                actual: intensity.len(),
            });
        }

        let solutions = Zip::from(rtilde)
            .and(intensity)
            .par_map_collect(|&rt, &i| self.solve_pixel(rt, i));

        let max_imag = solutions.iter().map(|s| s.imag).fold(0.0, f64::max);
        let flagged = solutions
            .iter()
            .filter(|s| s.imag.is_nan() || s.imag > ROOT_IMAG_TOLERANCE)
            .count();
        if flagged > 0 {
            warn!(
                flagged,
                max_imag, "selected cubic roots carry non-negligible imaginary parts"
            );
        }

        Ok(InversionOutput {
            reflectance: solutions.mapv(|s| s.value),
            max_imag,
            flagged,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speckle_math::roots::horner;

    fn reference_op(sigma_w: f64, sigma_lambda: f64) -> InversionOperator {
        InversionOperator::new(sigma_w, sigma_lambda, LikelihoodTerm::LogVariance).unwrap()
    }

    #[test]
    fn test_ml_estimate_literal() {
        let field = Array2::from_elem((2, 3), Complex64::new(2.0, 0.0));
        let r = ml_estimate(&field, 0.1);
        assert_eq!(r.dim(), (2, 3));
        for &v in r.iter() {
            assert!((v - 3.99).abs() < 1e-12, "{v}");
        }
        let phased = Array2::from_elem((1, 1), Complex64::new(0.0, -2.0));
        assert!((ml_estimate(&phased, 0.1)[[0, 0]] - 3.99).abs() < 1e-12);
    }

    #[test]
    fn test_documented_coefficients() {
        let op = reference_op(0.1, 0.5);
        let c = op.coefficients(1.0, 123.0);
        let expected = [1.0, -0.98, 0.2301, 0.0024];
        for (got, want) in c.iter().zip(expected) {
            assert!((got - want).abs() < 1e-14, "{c:?}");
        }
    }

    #[test]
    fn test_full_likelihood_adds_intensity_term() {
        let full = InversionOperator::new(0.1, 0.5, LikelihoodTerm::Full).unwrap();
        let reference = reference_op(0.1, 0.5);
        let cf = full.coefficients(1.0, 2.0);
        let cr = reference.coefficients(1.0, 2.0);
        assert_eq!(&cf[..3], &cr[..3]);
        assert!((cr[3] - cf[3] - 0.25 * 2.0).abs() < 1e-14);
    }

    #[test]
    fn test_root_selection_is_real_root_of_cubic() {
        let op = reference_op(0.1, 0.5);
        let sol = op.solve_pixel(1.0, 0.0);
        assert!(sol.value.is_finite());
        assert!(sol.imag < 1e-10);
        let (residual, _) = horner(&op.coefficients(1.0, 0.0), Complex64::new(sol.value, 0.0));
        assert!(residual.norm() < 1e-6, "residual {residual}");
        // Local minimum of ln(r + 0.01) + 2(r - 1)^2.
        assert!((sol.value - 0.565887234393789).abs() < 1e-9, "{}", sol.value);
    }

    #[test]
    fn test_reference_cubic_falls_back_to_minus_noise_variance() {
        // σλ large: the non-trivial pair is complex, the only real root is -σw².
        let op = reference_op(0.1, 10.0);
        let sol = op.solve_pixel(1.0, 0.0);
        assert!((sol.value + 0.01).abs() < 1e-9, "{}", sol.value);
    }

    #[test]
    fn test_small_sigma_lambda_tracks_rtilde() {
        for likelihood in [LikelihoodTerm::LogVariance, LikelihoodTerm::Full] {
            let op = InversionOperator::new(0.1, 1e-3, likelihood).unwrap();
            for rtilde in [0.2, 0.7, 1.5] {
                let sol = op.solve_pixel(rtilde, 0.8);
                assert!(
                    (sol.value - rtilde).abs() < 1e-4,
                    "{likelihood}: rtilde {rtilde} -> {}",
                    sol.value
                );
            }
        }
    }

    #[test]
    fn test_full_likelihood_large_sigma_lambda_is_ml() {
        let op = InversionOperator::new(0.1, 1e4, LikelihoodTerm::Full).unwrap();
        let sol = op.solve_pixel(0.5, 2.0);
        assert!((sol.value - 1.99).abs() < 1e-5, "{}", sol.value);
    }

    #[test]
    fn test_apply_matches_pixelwise() {
        let op = reference_op(0.1, 0.3);
        let rtilde = Array2::from_shape_fn((4, 5), |(i, j)| 0.1 + 0.2 * (i + j) as f64);
        let intensity = Array2::zeros((4, 5));
        let out = op.apply(&rtilde, &intensity).unwrap();
        assert_eq!(out.reflectance.dim(), (4, 5));
        assert_eq!(out.flagged, 0);
        for ((i, j), &v) in out.reflectance.indexed_iter() {
            assert_eq!(v, op.solve_pixel(rtilde[[i, j]], 0.0).value);
        }
    }

    #[test]
    fn test_apply_shape_mismatch() {
        let op = reference_op(0.1, 0.3);
        let err = op
            .apply(&Array2::zeros((4, 4)), &Array2::zeros((4, 5)))
            .unwrap_err();
        assert!(matches!(err, SpeckleError::ShapeMismatch { actual: 20, .. }));
    }

    #[test]
    fn test_non_finite_pixel_is_flagged() {
        let op = reference_op(0.1, 0.3);
        let mut rtilde = Array2::from_elem((2, 3), 0.8);
        rtilde[[1, 2]] = f64::NAN;
        let out = op.apply(&rtilde, &Array2::from_elem((2, 3), 0.5)).unwrap();
        assert_eq!(out.flagged, 1);
        assert!(out.reflectance[[1, 2]].is_nan());
        let finite = out.reflectance.iter().filter(|v| v.is_finite()).count();
        assert_eq!(finite, 5);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        assert!(InversionOperator::new(0.0, 0.1, LikelihoodTerm::LogVariance).is_err());
        assert!(InversionOperator::new(0.1, -1.0, LikelihoodTerm::Full).is_err());
    }
}
