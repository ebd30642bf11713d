//! 2D FFT wrappers around rustfft.
//!
//! Normalization conventions:
//! - `FftNorm::Backward` matches numpy: forward unnormalized, inverse by 1/(nr*nc).
//! - `FftNorm::Ortho` scales both directions by 1/sqrt(nr*nc) (unitary).

use ndarray::{Array2, Axis};
use num_complex::Complex64;
use rustfft::{FftDirection, FftPlanner};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FftNorm {
    #[default]
    Backward,
    Ortho,
}

impl FftNorm {
    fn scale(self, direction: FftDirection, n: usize) -> f64 {
        match (self, direction) {
            (FftNorm::Backward, FftDirection::Forward) => 1.0,
            (FftNorm::Backward, FftDirection::Inverse) => 1.0 / n as f64,
            (FftNorm::Ortho, _) => 1.0 / (n as f64).sqrt(),
        }
    }
}

/// In-place 1D transforms along both axes, then normalization.
fn transform2(data: &mut Array2<Complex64>, direction: FftDirection, norm: FftNorm) {
    let (nrows, ncols) = data.dim();
    if nrows == 0 || ncols == 0 {
        return;
    }
    let mut planner = FftPlanner::new();

    // Lanes are copied through a scratch buffer so non-contiguous columns
    // need no transpose.
    for (axis, len) in [(Axis(1), ncols), (Axis(0), nrows)] {
        let fft = planner.plan_fft(len, direction);
        let mut buffer = vec![Complex64::new(0.0, 0.0); len];
        for mut lane in data.lanes_mut(axis) {
            for (slot, &value) in buffer.iter_mut().zip(lane.iter()) {
                *slot = value;
            }
            fft.process(&mut buffer);
            for (value, &slot) in lane.iter_mut().zip(buffer.iter()) {
                *value = slot;
            }
        }
    }

    let scale = norm.scale(direction, nrows * ncols);
    if scale != 1.0 {
        data.mapv_inplace(|c| c * scale);
    }
}

/// Forward 2D FFT. With `FftNorm::Backward` matches `numpy.fft.fft2()`.
pub fn fft2(input: &Array2<Complex64>, norm: FftNorm) -> Array2<Complex64> {
    let mut data = input.clone();
    transform2(&mut data, FftDirection::Forward, norm);
    data
}

/// Inverse 2D FFT. With `FftNorm::Backward` matches `numpy.fft.ifft2()`.
pub fn ifft2(input: &Array2<Complex64>, norm: FftNorm) -> Array2<Complex64> {
    let mut data = input.clone();
    transform2(&mut data, FftDirection::Inverse, norm);
    data
}

/// Forward 2D FFT of a real field.
pub fn fft2_real(input: &Array2<f64>, norm: FftNorm) -> Array2<Complex64> {
    let mut data = input.mapv(|v| Complex64::new(v, 0.0));
    transform2(&mut data, FftDirection::Forward, norm);
    data
}

/// Sample frequencies in cycles per sample. Matches `numpy.fft.fftfreq(n)`.
pub fn fftfreq(n: usize) -> Vec<f64> {
    let half = n.div_ceil(2);
    (0..n)
        .map(|k| {
            let signed = if k < half { k as f64 } else { k as f64 - n as f64 };
            signed / n as f64
        })
        .collect()
}
