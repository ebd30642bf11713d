// ─────────────────────────────────────────────────────────────────────
// Speckle PnP — Phantoms
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use ndarray::Array2;

/// Checkerboard of `block`-pixel squares alternating `low`/`high`.
pub fn blocks(rows: usize, cols: usize, block: usize, low: f64, high: f64) -> Array2<f64> {
    let block = block.max(1);
    Array2::from_shape_fn((rows, cols), |(i, j)| {
        if (i / block + j / block) % 2 == 0 {
            high
        } else {
            low
        }
    })
}

/// Centered disk of radius `radius_frac * min(rows, cols) / 2`.
pub fn disk(rows: usize, cols: usize, radius_frac: f64, inside: f64, outside: f64) -> Array2<f64> {
    let ci = (rows as f64 - 1.0) / 2.0;
    let cj = (cols as f64 - 1.0) / 2.0;
    let radius = radius_frac * rows.min(cols) as f64 / 2.0;
    Array2::from_shape_fn((rows, cols), |(i, j)| {
        let di = i as f64 - ci;
        let dj = j as f64 - cj;
        if di * di + dj * dj <= radius * radius {
            inside
        } else {
            outside
        }
    })
}

/// Linear ramp along columns from `min` to `max`.
pub fn gradient(rows: usize, cols: usize, min: f64, max: f64) -> Array2<f64> {
    let denom = (cols.max(2) - 1) as f64;
    Array2::from_shape_fn((rows, cols), |(_, j)| min + (max - min) * j as f64 / denom)
}
