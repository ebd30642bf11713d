// ─────────────────────────────────────────────────────────────────────
// Speckle PnP — Forward Model
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Coherent speckle forward model `y = F g + w`.
//!
//! The complex field `g ~ CN(0, r)` is drawn per pixel from the
//! reflectance `r`; `F` is the unitary 2-D DFT. All randomness comes from
//! an explicit seed.

use ndarray::{Array2, Zip};
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal, Poisson};
use speckle_math::fft::{fft2, FftNorm};
use speckle_types::config::{NoiseModel, ReconstructorConfig};
use speckle_types::error::{SpeckleError, SpeckleResult};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct SimulatedMeasurement {
    /// Noisy Fourier-domain measurement.
    pub y: Array2<Complex64>,
    /// Speckle field in the object domain.
    pub g: Array2<Complex64>,
    /// Additive noise realization, `y - F g`.
    pub w: Array2<Complex64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeckleSimulator {
    sigma_w: f64,
    noise: NoiseModel,
    seed: u64,
}

impl SpeckleSimulator {
    pub fn new(sigma_w: f64, noise: NoiseModel, seed: u64) -> SpeckleResult<Self> {
        if !sigma_w.is_finite() || sigma_w <= 0.0 {
            return Err(SpeckleError::config("sigma_w", "must be finite and > 0"));
        }
        Ok(SpeckleSimulator {
            sigma_w,
            noise,
            seed,
        })
    }

    /// Simulator matching a reconstructor's noise settings.
    pub fn from_config(config: &ReconstructorConfig, seed: u64) -> Self {
        SpeckleSimulator {
            sigma_w: config.sigma_w(),
            noise: config.noise_model(),
            seed,
        }
    }

    pub fn simulate(&self, reflectance: &Array2<f64>) -> SpeckleResult<SimulatedMeasurement> {
        if reflectance.iter().any(|&r| !r.is_finite() || r < 0.0) {
            return Err(SpeckleError::config(
                "reflectance",
                "must be finite and non-negative",
            ));
        }
        let mut rng = StdRng::seed_from_u64(self.seed);
        // Circular complex Gaussian: each quadrature carries half the variance.
        let unit = Normal::new(0.0, std::f64::consts::FRAC_1_SQRT_2)
            .map_err(|e| SpeckleError::config("sigma_w", e.to_string()))?;

        let g = reflectance.mapv(|r| {
            let amp = r.sqrt();
            Complex64::new(amp * unit.sample(&mut rng), amp * unit.sample(&mut rng))
        });
        let clean = fft2(&g, FftNorm::Ortho);

        let y = match self.noise {
            NoiseModel::Gaussian => clean.mapv(|z| {
                z + Complex64::new(
                    self.sigma_w * unit.sample(&mut rng),
                    self.sigma_w * unit.sample(&mut rng),
                )
            }),
            NoiseModel::Poisson => {
                let quantum = self.sigma_w * self.sigma_w;
                let mut y = Array2::zeros(clean.dim());
                for (out, z) in y.iter_mut().zip(clean.iter()) {
                    let rate = z.norm_sqr() / quantum;
                    let counts = match Poisson::new(rate) {
                        Ok(dist) => dist.sample(&mut rng),
                        Err(_) => 0.0,
                    };
                    *out = Complex64::from_polar((counts * quantum).sqrt(), z.arg());
                }
                y
            }
        };

        let w = Zip::from(&y).and(&clean).map_collect(|&a, &b| a - b);
        debug!(
            rows = y.nrows(),
            cols = y.ncols(),
            noise = %self.noise,
            seed = self.seed,
            "simulated speckle measurement"
        );
        Ok(SimulatedMeasurement { y, g, w })
    }
}
