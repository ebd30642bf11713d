// ─────────────────────────────────────────────────────────────────────
// Speckle PnP — Property-Based Tests (proptest) for speckle-math
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for speckle-math using proptest.
//!
//! Covers: cubic root residuals and Vieta relations, FFT unitarity,
//! TV denoising mean preservation and contraction, PSNR monotonicity.

use ndarray::Array2;
use num_complex::Complex64;
use proptest::prelude::*;
use speckle_math::fft::{fft2, ifft2, FftNorm};
use speckle_math::metrics::{diff_norm, psnr};
use speckle_math::roots::{cubic_roots, horner};
use speckle_math::tv::{total_variation, tv_denoise};

// ── Cubic Roots ──────────────────────────────────────────────────────

proptest! {
    /// Cubics built from three known real roots are solved to high accuracy.
    #[test]
    fn cubic_recovers_real_roots(
        r1 in -5.0f64..5.0,
        r2 in -5.0f64..5.0,
        r3 in -5.0f64..5.0,
    ) {
        let b = -(r1 + r2 + r3);
        let c = r1 * r2 + r1 * r3 + r2 * r3;
        let d = -(r1 * r2 * r3);
        let coeffs = [1.0, b, c, d];
        let roots = cubic_roots(coeffs);
        prop_assert_eq!(roots.len(), 3);
        for z in &roots {
            let (value, _) = horner(&coeffs, *z);
            prop_assert!(value.norm() < 1e-8, "residual {} at {}", value.norm(), z);
        }
    }

    /// Vieta: sum of roots equals -b/a.
    #[test]
    fn cubic_vieta_sum(
        a in 0.5f64..3.0,
        b in -4.0f64..4.0,
        c in -4.0f64..4.0,
        d in -4.0f64..4.0,
    ) {
        let roots = cubic_roots([a, b, c, d]);
        let sum: Complex64 = roots.iter().sum();
        prop_assert!((sum.re + b / a).abs() < 1e-6, "sum {} vs {}", sum, -b / a);
        prop_assert!(sum.im.abs() < 1e-6);
    }

    /// A real cubic always has at least one root with negligible imaginary part.
    #[test]
    fn cubic_has_real_root(
        b in -4.0f64..4.0,
        c in -4.0f64..4.0,
        d in -4.0f64..4.0,
    ) {
        let roots = cubic_roots([1.0, b, c, d]);
        let min_imag = roots.iter().map(|z| z.im.abs()).fold(f64::INFINITY, f64::min);
        prop_assert!(min_imag < 1e-6, "min |im| = {}", min_imag);
    }
}

// ── FFT ──────────────────────────────────────────────────────────────

proptest! {
    /// Orthonormal forward/inverse is the identity.
    #[test]
    fn fft_ortho_roundtrip(nr in 1usize..12, nc in 1usize..12, seed in 0u32..1000) {
        let input = Array2::from_shape_fn((nr, nc), |(i, j)| {
            let t = (i * 31 + j * 17 + seed as usize) as f64;
            Complex64::new(t.sin(), (0.5 * t).cos())
        });
        let back = ifft2(&fft2(&input, FftNorm::Ortho), FftNorm::Ortho);
        for (a, b) in input.iter().zip(back.iter()) {
            prop_assert!((a - b).norm() < 1e-10);
        }
    }
}

// ── TV Denoising ─────────────────────────────────────────────────────

proptest! {
    /// TV denoising preserves the mean and never increases total variation.
    #[test]
    fn tv_preserves_mean_and_reduces_tv(
        n in 3usize..12,
        weight in 0.01f64..1.0,
        seed in 0u32..1000,
    ) {
        let f = Array2::from_shape_fn((n, n), |(i, j)| {
            ((i * 13 + j * 7 + seed as usize) as f64).sin()
        });
        let out = tv_denoise(&f, weight, 60);
        prop_assert_eq!(out.dim(), f.dim());
        prop_assert!((out.mean().unwrap() - f.mean().unwrap()).abs() < 1e-10);
        prop_assert!(total_variation(&out) <= total_variation(&f) + 1e-9);
        for &v in out.iter() {
            prop_assert!(v.is_finite());
        }
    }
}

// ── Metrics ──────────────────────────────────────────────────────────

proptest! {
    /// A smaller error never yields a lower PSNR.
    #[test]
    fn psnr_monotone_in_error(offset in 0.001f64..0.5, factor in 1.1f64..4.0) {
        let reference = Array2::from_shape_fn((6, 6), |(i, j)| 1.0 + (i + j) as f64 * 0.1);
        let close = &reference + offset;
        let far = &reference + offset * factor;
        let p_close = psnr(&close, &reference).unwrap();
        let p_far = psnr(&far, &reference).unwrap();
        prop_assert!(p_close > p_far);
        prop_assert!(diff_norm(&close, &reference) < diff_norm(&far, &reference));
    }
}
