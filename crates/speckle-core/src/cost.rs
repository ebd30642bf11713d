// ─────────────────────────────────────────────────────────────────────
// Speckle PnP — Cost Evaluator
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Diagnostic objective for monitoring ADMM progress.

use ndarray::{Array2, Zip};
use speckle_math::metrics;
use speckle_types::config::ReconstructorConfig;
use speckle_types::constants::VARIANCE_FLOOR;
use speckle_types::error::{SpeckleError, SpeckleResult};

/// Evaluates `Σ [ln K + |x|²/K] + Σ (r - r_ref)² / (2σλ²)` with
/// `K = max(r + σw², VARIANCE_FLOOR)`: the Gaussian negative log-likelihood
/// of the back-projected field plus the proximal penalty to a reference.
///
/// Always uses the full likelihood, whatever term the inversion solves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostEvaluator {
    sigma_w: f64,
    sigma_lambda: f64,
}

impl CostEvaluator {
    pub fn new(sigma_w: f64, sigma_lambda: f64) -> Self {
        CostEvaluator {
            sigma_w,
            sigma_lambda,
        }
    }

    pub fn from_config(config: &ReconstructorConfig) -> Self {
        Self::new(config.sigma_w(), config.sigma_lambda())
    }

    fn check(
        context: &'static str,
        expected: &Array2<f64>,
        other: &Array2<f64>,
    ) -> SpeckleResult<()> {
        if expected.dim() != other.dim() {
            return Err(SpeckleError::ShapeMismatch {
                context,
                expected: expected.dim(),
                actual: other.len(),
            });
        }
        Ok(())
    }

    /// Negative log-likelihood of `intensity` given reflectance `r`.
    pub fn data_term(&self, intensity: &Array2<f64>, r: &Array2<f64>) -> SpeckleResult<f64> {
        Self::check("cost reflectance", intensity, r)?;
        let noise_var = self.sigma_w * self.sigma_w;
        Ok(Zip::from(intensity).and(r).fold(0.0, |acc, &i, &r| {
            let k = (r + noise_var).max(VARIANCE_FLOOR);
            acc + k.ln() + i / k
        }))
    }

    pub fn penalty(&self, r: &Array2<f64>, reference: &Array2<f64>) -> SpeckleResult<f64> {
        Self::check("cost reference", r, reference)?;
        let weight = 1.0 / (2.0 * self.sigma_lambda * self.sigma_lambda);
        Ok(Zip::from(r)
            .and(reference)
            .fold(0.0, |acc, &a, &b| acc + (a - b) * (a - b))
            * weight)
    }

    pub fn evaluate(
        &self,
        intensity: &Array2<f64>,
        r: &Array2<f64>,
        reference: &Array2<f64>,
    ) -> SpeckleResult<f64> {
        Ok(self.data_term(intensity, r)? + self.penalty(r, reference)?)
    }

    /// PSNR of `r` against a ground truth, see [`metrics::psnr`].
    pub fn psnr(&self, r: &Array2<f64>, ground_truth: &Array2<f64>) -> Option<f64> {
        if r.dim() != ground_truth.dim() {
            return None;
        }
        metrics::psnr(r, ground_truth)
    }
}
