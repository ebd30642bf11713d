//! Polynomial roots for low-degree real polynomials.
//!
//! Coefficients are ordered from the highest power down, the same as
//! `numpy.roots`. Cubics are solved in closed form (Cardano, complex
//! arithmetic) and then polished with Newton steps on the original
//! polynomial, so real roots come back with imaginary parts at rounding level.

use num_complex::Complex64;

/// Newton polishing steps applied to each closed-form root.
const POLISH_STEPS: usize = 4;

/// Leading coefficients below this magnitude drop the polynomial degree.
const DEGENERATE_LEADING: f64 = 1e-300;

/// Evaluate a polynomial and its derivative at `z` (Horner).
pub fn horner(coeffs: &[f64], z: Complex64) -> (Complex64, Complex64) {
    let mut value = Complex64::new(0.0, 0.0);
    let mut deriv = Complex64::new(0.0, 0.0);
    for &c in coeffs {
        deriv = deriv * z + value;
        value = value * z + c;
    }
    (value, deriv)
}

/// Refine a root estimate with Newton's method. Stops early on a flat
/// derivative or a non-finite update.
pub fn polish_root(coeffs: &[f64], mut z: Complex64, steps: usize) -> Complex64 {
    for _ in 0..steps {
        let (value, deriv) = horner(coeffs, z);
        if value.norm() == 0.0 || deriv.norm() < f64::EPSILON * (1.0 + z.norm()) {
            break;
        }
        let next = z - value / deriv;
        if !(next.re.is_finite() && next.im.is_finite()) {
            break;
        }
        z = next;
    }
    z
}

/// Roots of `a x + b = 0` and `a x^2 + b x + c = 0`, degree dropping as needed.
pub fn quadratic_roots(coeffs: [f64; 3]) -> Vec<Complex64> {
    let [a, b, c] = coeffs;
    if a.abs() < DEGENERATE_LEADING {
        if b.abs() < DEGENERATE_LEADING {
            return Vec::new();
        }
        return vec![Complex64::new(-c / b, 0.0)];
    }
    let disc = Complex64::new(b * b - 4.0 * a * c, 0.0).sqrt();
    // Pick the sign that avoids cancellation, then use Vieta for the other.
    let q = if b >= 0.0 {
        -(Complex64::new(b, 0.0) + disc) / 2.0
    } else {
        -(Complex64::new(b, 0.0) - disc) / 2.0
    };
    if q.norm() == 0.0 {
        return vec![Complex64::new(0.0, 0.0); 2];
    }
    vec![q / a, Complex64::new(c, 0.0) / q]
}

/// All roots of `a3 x^3 + a2 x^2 + a1 x + a0 = 0`, given as `[a3, a2, a1, a0]`.
///
/// Returns three roots for a genuine cubic, fewer when the leading
/// coefficient vanishes.
pub fn cubic_roots(coeffs: [f64; 4]) -> Vec<Complex64> {
    let [a, b0, c0, d0] = coeffs;
    if a.abs() < DEGENERATE_LEADING {
        return quadratic_roots([b0, c0, d0]);
    }
    let (b, c, d) = (b0 / a, c0 / a, d0 / a);

    // Depressed cubic t^3 + p t + q with x = t - b/3.
    let shift = b / 3.0;
    let p = c - b * b / 3.0;
    let q = 2.0 * b * b * b / 27.0 - b * c / 3.0 + d;

    let disc = Complex64::new(q * q / 4.0 + p * p * p / 27.0, 0.0).sqrt();
    let half_q = Complex64::new(-q / 2.0, 0.0);
    let plus = half_q + disc;
    let minus = half_q - disc;
    let big = if plus.norm() >= minus.norm() { plus } else { minus };

    let monic = [1.0, b, c, d];
    if big.norm() == 0.0 {
        // p = q = 0: triple root at the shift.
        return vec![Complex64::new(-shift, 0.0); 3];
    }

    let u = big.powf(1.0 / 3.0);
    let omega = Complex64::new(-0.5, 3.0_f64.sqrt() / 2.0);
    let mut rotation = Complex64::new(1.0, 0.0);
    let mut roots = Vec::with_capacity(3);
    for _ in 0..3 {
        let uk = u * rotation;
        let t = uk - p / (3.0 * uk);
        roots.push(polish_root(&monic, t - shift, POLISH_STEPS));
        rotation *= omega;
    }
    roots
}
