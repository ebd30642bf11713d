// ─────────────────────────────────────────────────────────────────────
// Speckle PnP — Denoisers
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Denoising operators plugged into the ADMM prior step.
//!
//! The reconstructor treats a denoiser as a deterministic black box that
//! maps a noisy image and a strength to an image of the same shape.

use ndarray::Array2;
use speckle_math::spectral::gaussian_lowpass;
use speckle_math::tv::tv_denoise;
use speckle_types::config::{DenoiserKind, ReconstructorConfig};
use std::sync::Arc;

pub trait Denoiser: Send + Sync {
    /// Denoise `noisy` with regularization `strength`. With `real_only`
    /// the output is projected onto real values.
    fn denoise(&self, noisy: &Array2<f64>, strength: f64, real_only: bool) -> Array2<f64>;

    fn label(&self) -> &str {
        "custom"
    }
}

impl<F> Denoiser for F
where
    F: Fn(&Array2<f64>, f64, bool) -> Array2<f64> + Send + Sync,
{
    fn denoise(&self, noisy: &Array2<f64>, strength: f64, real_only: bool) -> Array2<f64> {
        self(noisy, strength, real_only)
    }
}

/// Isotropic TV proximal operator (Chambolle); `strength` is the TV weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotalVariationDenoiser {
    pub iterations: usize,
}

impl Denoiser for TotalVariationDenoiser {
    fn denoise(&self, noisy: &Array2<f64>, strength: f64, _real_only: bool) -> Array2<f64> {
        tv_denoise(noisy, strength, self.iterations)
    }

    fn label(&self) -> &str {
        "TV"
    }
}

/// Gaussian spectral smoothing; `strength` is the kernel width in pixels.
/// `real_only` keeps the real part of the filtered field, otherwise its modulus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LowPassDenoiser;

impl Denoiser for LowPassDenoiser {
    fn denoise(&self, noisy: &Array2<f64>, strength: f64, real_only: bool) -> Array2<f64> {
        let filtered = gaussian_lowpass(noisy, strength);
        if real_only {
            filtered.mapv(|c| c.re)
        } else {
            filtered.mapv(|c| c.norm())
        }
    }

    fn label(&self) -> &str {
        "LowPass"
    }
}

/// Returns its input; reduces ADMM to pure inversion alternation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IdentityDenoiser;

impl Denoiser for IdentityDenoiser {
    fn denoise(&self, noisy: &Array2<f64>, _strength: f64, _real_only: bool) -> Array2<f64> {
        noisy.clone()
    }

    fn label(&self) -> &str {
        "identity"
    }
}

/// Built-in denoiser for the configured family.
pub fn denoiser_for(config: &ReconstructorConfig) -> Arc<dyn Denoiser> {
    match config.denoiser() {
        DenoiserKind::TotalVariation => Arc::new(TotalVariationDenoiser {
            iterations: config.tv_iterations(),
        }),
        DenoiserKind::LowPass => Arc::new(LowPassDenoiser),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bumpy(n: usize) -> Array2<f64> {
        Array2::from_shape_fn((n, n), |(i, j)| 1.0 + if (i + j) % 2 == 0 { 0.2 } else { -0.2 })
    }

    #[test]
    fn test_denoisers_preserve_shape() {
        let input = Array2::from_shape_fn((6, 9), |(i, j)| (i * 9 + j) as f64 * 0.01);
        let denoisers: Vec<Arc<dyn Denoiser>> = vec![
            Arc::new(TotalVariationDenoiser { iterations: 20 }),
            Arc::new(LowPassDenoiser),
            Arc::new(IdentityDenoiser),
        ];
        for d in denoisers {
            for real_only in [true, false] {
                assert_eq!(d.denoise(&input, 0.3, real_only).dim(), (6, 9), "{}", d.label());
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let input = bumpy(8);
        let tv = TotalVariationDenoiser { iterations: 30 };
        assert_eq!(tv.denoise(&input, 0.1, true), tv.denoise(&input, 0.1, true));
    }

    #[test]
    fn test_tv_smooths() {
        let input = bumpy(8);
        let out = TotalVariationDenoiser { iterations: 50 }.denoise(&input, 0.1, true);
        let spread = |a: &Array2<f64>| {
            a.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
                - a.iter().cloned().fold(f64::INFINITY, f64::min)
        };
        assert!(spread(&out) < spread(&input));
    }

    #[test]
    fn test_low_pass_modulus_non_negative() {
        let input = Array2::from_shape_fn((8, 8), |(i, _)| if i < 4 { -1.0 } else { 1.0 });
        let out = LowPassDenoiser.denoise(&input, 1.0, false);
        assert!(out.iter().all(|&v| v >= 0.0));
        let real = LowPassDenoiser.denoise(&input, 1.0, true);
        assert!(real.iter().any(|&v| v < 0.0));
    }

    #[test]
    fn test_closure_denoiser() {
        let halve = |x: &Array2<f64>, _s: f64, _r: bool| x * 0.5;
        let d: Arc<dyn Denoiser> = Arc::new(halve);
        let out = d.denoise(&Array2::from_elem((2, 2), 4.0), 0.1, true);
        assert_eq!(out, Array2::from_elem((2, 2), 2.0));
        assert_eq!(d.label(), "custom");
    }

    #[test]
    fn test_denoiser_for_config() {
        let cfg = ReconstructorConfig::builder([4, 4], 0.1)
            .denoiser(DenoiserKind::LowPass)
            .build()
            .unwrap();
        assert_eq!(denoiser_for(&cfg).label(), "LowPass");
        let cfg = ReconstructorConfig::builder([4, 4], 0.1).build().unwrap();
        assert_eq!(denoiser_for(&cfg).label(), "TV");
    }
}
