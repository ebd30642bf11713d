//! Fourier-domain smoothing.

use crate::fft::{fft2_real, fftfreq, ifft2, FftNorm};
use ndarray::Array2;
use num_complex::Complex64;
use std::f64::consts::PI;

/// Gaussian low-pass with spatial standard deviation `sigma_px` (pixels),
/// applied as `exp(-2π²σ²(fx² + fy²))` on the periodic spectrum.
///
/// Returns the complex filtered field; for real input it is real up to
/// rounding. `sigma_px <= 0` passes the field through.
pub fn gaussian_lowpass(input: &Array2<f64>, sigma_px: f64) -> Array2<Complex64> {
    if !sigma_px.is_finite() || sigma_px <= 0.0 || input.is_empty() {
        return input.mapv(|v| Complex64::new(v, 0.0));
    }
    let (nrows, ncols) = input.dim();
    let fx = fftfreq(nrows);
    let fy = fftfreq(ncols);
    let decay = 2.0 * PI * PI * sigma_px * sigma_px;

    let mut spectrum = fft2_real(input, FftNorm::Backward);
    for ((i, j), c) in spectrum.indexed_iter_mut() {
        *c *= (-decay * (fx[i] * fx[i] + fy[j] * fy[j])).exp();
    }
    ifft2(&spectrum, FftNorm::Backward)
}
