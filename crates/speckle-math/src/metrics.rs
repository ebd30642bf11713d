//! Norms and image-quality metrics on 2D fields.

use ndarray::{Array2, Zip};

/// ‖a - b‖ (Frobenius). Shapes must match.
pub fn diff_norm(a: &Array2<f64>, b: &Array2<f64>) -> f64 {
    Zip::from(a)
        .and(b)
        .fold(0.0, |acc, &x, &y| acc + (x - y) * (x - y))
        .sqrt()
}

/// Mean squared error. Shapes must match; empty arrays give 0.
pub fn mse(estimate: &Array2<f64>, reference: &Array2<f64>) -> f64 {
    let n = reference.len();
    if n == 0 {
        return 0.0;
    }
    let d = diff_norm(estimate, reference);
    d * d / n as f64
}

/// Peak signal-to-noise ratio in dB, with the reference maximum as peak.
///
/// `None` when the reference has no positive peak; infinite for an exact match.
pub fn psnr(estimate: &Array2<f64>, reference: &Array2<f64>) -> Option<f64> {
    let peak = reference.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !peak.is_finite() || peak <= 0.0 {
        return None;
    }
    let err = mse(estimate, reference);
    if err == 0.0 {
        return Some(f64::INFINITY);
    }
    Some(10.0 * (peak * peak / err).log10())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_norm_symmetric() {
        let a = Array2::from_shape_fn((3, 4), |(i, j)| (i + j) as f64);
        let b = Array2::from_elem((3, 4), 1.0);
        assert!((diff_norm(&a, &b) - diff_norm(&b, &a)).abs() < 1e-14);
        assert_eq!(diff_norm(&a, &a), 0.0);
    }

    #[test]
    fn test_psnr_known_value() {
        // peak 1, mse 0.01 -> 20 dB
        let reference = Array2::from_elem((4, 4), 1.0);
        let estimate = Array2::from_elem((4, 4), 0.9);
        let value = psnr(&estimate, &reference).unwrap();
        assert!((value - 20.0).abs() < 1e-9, "psnr = {value}");
    }

    #[test]
    fn test_psnr_edge_cases() {
        let zeros = Array2::zeros((2, 2));
        assert!(psnr(&zeros, &zeros).is_none());
        let ones = Array2::ones((2, 2));
        assert_eq!(psnr(&ones, &ones), Some(f64::INFINITY));
    }
}
